//! Render Device Seam
//!
//! The pipeline engine never talks to a graphics API directly. Render-target
//! buffers are allocated, destroyed and read back through the [`RenderDevice`]
//! trait, which the host renderer implements over its backend.

use std::num::NonZeroU32;

use crate::target::TextureFormat;

/// Opaque identifier of a device render buffer.
///
/// Ids are issued by the device; `0` is never a valid id, so the back buffer
/// is addressed as `Option::<RenderBufferId>::None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderBufferId(NonZeroU32);

impl RenderBufferId {
    /// Wraps a raw device id; `None` for 0.
    #[must_use]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw device id.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Parameters for one render-buffer allocation.
#[derive(Clone, Copy, Debug)]
pub struct RenderBufferDesc<'a> {
    /// Debug label, the owning render target's id.
    pub label: &'a str,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Color attachment format.
    pub format: TextureFormat,
    /// Whether a depth attachment is present.
    pub depth: bool,
    /// Number of color attachments (may be 0 for depth-only targets).
    pub num_col_bufs: u32,
    /// MSAA sample count; 0 or 1 means no multisampling.
    pub samples: u32,
}

/// Result geometry of a render-buffer readback.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReadbackInfo {
    /// Pixel width of the read surface.
    pub width: u32,
    /// Pixel height of the read surface.
    pub height: u32,
    /// Components per pixel written to the destination.
    pub components: u32,
}

/// Graphics-device collaborator owning the actual GPU buffers.
pub trait RenderDevice {
    /// Allocates a render buffer, or `None` when the device cannot satisfy
    /// the request. Allocation failure is fatal for the owning load/resize.
    fn create_render_buffer(&mut self, desc: &RenderBufferDesc) -> Option<RenderBufferId>;

    /// Destroys a previously created render buffer.
    fn destroy_render_buffer(&mut self, id: RenderBufferId);

    /// Reads back pixel data of one attachment into `dest`.
    ///
    /// `id` of `None` addresses the back buffer; `buf_index` selects the
    /// color attachment (depth readback is device-defined). Returns the
    /// surface geometry, or `None` when the read is not possible.
    fn read_render_buffer(
        &mut self,
        id: Option<RenderBufferId>,
        buf_index: u32,
        dest: &mut [u8],
    ) -> Option<ReadbackInfo>;
}
