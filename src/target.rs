//! Render Target Descriptors
//!
//! A render target is a named off-screen buffer declared in the `Setup`
//! section of a pipeline definition. Descriptors live in a generation-checked
//! [`TargetSet`]; commands hold [`TargetKey`]s into it instead of raw device
//! handles, so a key held across a resize or release cycle can never dangle.

use slotmap::SlotMap;

use crate::device::RenderBufferId;

slotmap::new_key_type! {
    /// Generation-checked handle to a [`RenderTarget`] within one pipeline.
    pub struct TargetKey;
}

/// Color attachment format of a render target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TextureFormat {
    /// 8-bit BGRA, the default. Declared as `RGBA8` in definition files.
    #[default]
    Bgra8,
    /// 16-bit float RGBA.
    Rgba16F,
    /// 32-bit float RGBA.
    Rgba32F,
}

impl TextureFormat {
    /// Parses a definition-file format token (case-insensitive).
    ///
    /// `RGBA8` maps to [`TextureFormat::Bgra8`] storage.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("RGBA8") {
            Some(Self::Bgra8)
        } else if token.eq_ignore_ascii_case("RGBA16F") {
            Some(Self::Rgba16F)
        } else if token.eq_ignore_ascii_case("RGBA32F") {
            Some(Self::Rgba32F)
        } else {
            None
        }
    }
}

/// Declaration of one off-screen render target.
#[derive(Clone, Debug)]
pub struct RenderTarget {
    /// Unique id within the pipeline. `""` is reserved for the back buffer
    /// and never appears here.
    pub id: String,
    /// Whether the target carries a depth attachment.
    pub has_depth_buf: bool,
    /// Number of color attachments.
    pub num_col_bufs: u32,
    /// Color attachment format.
    pub format: TextureFormat,
    /// Effective MSAA sample count (already clamped to the global maximum).
    pub samples: u32,
    /// Explicit pixel width; 0 derives the width from the base resolution.
    pub width: u32,
    /// Explicit pixel height; 0 derives the height from the base resolution.
    pub height: u32,
    /// Scale applied to the explicit size, or to the base resolution when
    /// width/height are 0.
    pub scale: f32,
    pub(crate) buffer: Option<RenderBufferId>,
}

impl RenderTarget {
    /// The device buffer currently backing this target, if allocated.
    #[must_use]
    pub fn buffer(&self) -> Option<RenderBufferId> {
        self.buffer
    }

    /// Pixel dimensions the target resolves to against a base resolution.
    #[must_use]
    pub(crate) fn effective_size(&self, base_width: u32, base_height: u32) -> (u32, u32) {
        let round = |v: f32| (v + 0.5) as u32;
        let mut w = round(self.width as f32 * self.scale);
        let mut h = round(self.height as f32 * self.scale);
        if w == 0 {
            w = round(base_width as f32 * self.scale);
        }
        if h == 0 {
            h = round(base_height as f32 * self.scale);
        }
        (w, h)
    }
}

/// The render targets of one pipeline, in declaration order.
#[derive(Default, Debug)]
pub struct TargetSet {
    targets: SlotMap<TargetKey, RenderTarget>,
    order: Vec<TargetKey>,
}

impl TargetSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no target is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Appends a target, returning its key. Keys of removed sets are never
    /// reused with the same generation.
    pub fn insert(&mut self, target: RenderTarget) -> TargetKey {
        let key = self.targets.insert(target);
        self.order.push(key);
        key
    }

    /// Looks up a target by key.
    #[must_use]
    pub fn get(&self, key: TargetKey) -> Option<&RenderTarget> {
        self.targets.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: TargetKey) -> Option<&mut RenderTarget> {
        self.targets.get_mut(key)
    }

    /// Resolves a target id to its key; first declaration wins.
    ///
    /// The empty id addresses the back buffer and never resolves.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<TargetKey> {
        if id.is_empty() {
            return None;
        }
        self.order
            .iter()
            .copied()
            .find(|&key| self.targets[key].id == id)
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = TargetKey> + '_ {
        self.order.iter().copied()
    }

    /// Targets with their keys, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetKey, &RenderTarget)> {
        self.order.iter().map(|&key| (key, &self.targets[key]))
    }

    /// Removes every target. Outstanding keys become invalid and resolve to
    /// `None` from then on.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, width: u32, height: u32, scale: f32) -> RenderTarget {
        RenderTarget {
            id: id.to_owned(),
            has_depth_buf: false,
            num_col_bufs: 1,
            format: TextureFormat::default(),
            samples: 0,
            width,
            height,
            scale,
            buffer: None,
        }
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(TextureFormat::parse("RGBA8"), Some(TextureFormat::Bgra8));
        assert_eq!(TextureFormat::parse("rgba16f"), Some(TextureFormat::Rgba16F));
        assert_eq!(TextureFormat::parse("RGBA32F"), Some(TextureFormat::Rgba32F));
        assert_eq!(TextureFormat::parse("R11G11B10"), None);
    }

    #[test]
    fn test_effective_size_from_base() {
        let rt = target("RT", 0, 0, 0.5);
        assert_eq!(rt.effective_size(640, 480), (320, 240));
    }

    #[test]
    fn test_effective_size_explicit_ignores_base() {
        let rt = target("RT", 256, 128, 1.0);
        assert_eq!(rt.effective_size(640, 480), (256, 128));
        assert_eq!(rt.effective_size(1920, 1080), (256, 128));
    }

    #[test]
    fn test_effective_size_scaled_explicit() {
        let rt = target("RT", 100, 50, 1.5);
        assert_eq!(rt.effective_size(640, 480), (150, 75));
    }

    #[test]
    fn test_find_is_first_match_and_empty_is_back_buffer() {
        let mut set = TargetSet::new();
        let first = set.insert(target("A", 0, 0, 1.0));
        let _ = set.insert(target("B", 0, 0, 1.0));

        assert_eq!(set.find("A"), Some(first));
        assert_eq!(set.find(""), None);
        assert_eq!(set.find("C"), None);
    }

    #[test]
    fn test_clear_invalidates_keys() {
        let mut set = TargetSet::new();
        let key = set.insert(target("A", 0, 0, 1.0));
        set.clear();
        assert!(set.get(key).is_none());
        assert!(set.is_empty());
    }
}
