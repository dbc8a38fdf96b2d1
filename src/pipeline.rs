//! Pipeline Definition Resource
//!
//! A [`PipelineDefinition`] owns the render targets and command stages of one
//! rendering pipeline, populated from an XML definition document:
//!
//! ```xml
//! <Pipeline>
//!     <Setup>
//!         <RenderTarget id="HDRBUF" depthBuf="true" numColBufs="1" format="RGBA16F" scale="1.0"/>
//!     </Setup>
//!     <CommandQueue>
//!         <Stage id="Geometry">
//!             <SwitchTarget target="HDRBUF"/>
//!             <ClearTarget depthBuf="true" colBuf0="true"/>
//!             <DrawGeometry context="AMBIENT" class="~Translucent"/>
//!         </Stage>
//!     </CommandQueue>
//! </Pipeline>
//! ```
//!
//! Loading parses the `Setup` section into render-target descriptors, the
//! `CommandQueue` section into stages and commands, and only then allocates
//! the device buffers, sized against the pipeline's base resolution. Any
//! failure resets the definition to its empty default state, so the resource
//! is always either fully loaded or fully reset.
//!
//! Execution is out of scope here: a renderer walks the stages in order each
//! frame and interprets the commands against the live scene and device. The
//! whole model is single-threaded; parsing, allocation and execution run on
//! the thread owning the device context.

use crate::command::{ClearFlags, PipelineCommand, RenderOrder};
use crate::device::{ReadbackInfo, RenderBufferDesc, RenderDevice};
use crate::errors::{PipelineError, Result};
use crate::interner::MaterialClasses;
use crate::material::{MaterialHandle, MaterialProvider};
use crate::registry::CommandRegistry;
use crate::target::{RenderTarget, TargetKey, TargetSet, TextureFormat};
use crate::xml::ElementView;

/// Default base width of a freshly constructed pipeline.
pub const DEFAULT_BASE_WIDTH: u32 = 320;
/// Default base height of a freshly constructed pipeline.
pub const DEFAULT_BASE_HEIGHT: u32 = 240;

/// Collaborators a pipeline load draws on.
pub struct LoadContext<'a> {
    /// Device that allocates the render-target buffers.
    pub device: &'a mut dyn RenderDevice,
    /// Resource manager resolving material names to handles.
    pub materials: &'a mut dyn MaterialProvider,
    /// Registered external command kinds.
    pub registry: &'a CommandRegistry,
    /// Material class interning table shared with the renderer.
    pub classes: &'a mut MaterialClasses,
    /// Global sample-count cap from the engine configuration.
    pub max_samples: u32,
}

/// A named, independently toggleable group of commands.
#[derive(Clone, Debug)]
pub struct PipelineStage {
    id: String,
    enabled: bool,
    material_link: Option<MaterialHandle>,
    commands: Vec<PipelineCommand>,
}

impl PipelineStage {
    /// The stage's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the renderer executes this stage.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Material linked for stage-wide shader overrides.
    #[must_use]
    pub fn material_link(&self) -> Option<&MaterialHandle> {
        self.material_link.as_ref()
    }

    /// The stage's commands, in definition order.
    #[must_use]
    pub fn commands(&self) -> &[PipelineCommand] {
        &self.commands
    }
}

/// The pipeline resource: render targets plus ordered command stages.
pub struct PipelineDefinition {
    name: String,
    base_width: u32,
    base_height: u32,
    targets: TargetSet,
    stages: Vec<PipelineStage>,
}

impl PipelineDefinition {
    /// Creates an empty definition with the default base resolution.
    ///
    /// `name` identifies the resource in diagnostics.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_width: DEFAULT_BASE_WIDTH,
            base_height: DEFAULT_BASE_HEIGHT,
            targets: TargetSet::new(),
            stages: Vec::new(),
        }
    }

    /// The resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base resolution scale-relative targets are sized against.
    #[must_use]
    pub fn base_size(&self) -> (u32, u32) {
        (self.base_width, self.base_height)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Populates the definition from document bytes.
    ///
    /// A repeated load fully replaces the previous content. On any failure
    /// the error is logged, the definition is reset to its empty default
    /// state and the error is returned.
    pub fn load(&mut self, data: &[u8], ctx: &mut LoadContext) -> Result<()> {
        self.reset(ctx.device);

        if let Err(e) = self.load_inner(data, ctx) {
            self.reset(ctx.device);
            log::error!("Pipeline resource '{}': {e}", self.name);
            return Err(e);
        }
        Ok(())
    }

    fn load_inner(&mut self, data: &[u8], ctx: &mut LoadContext) -> Result<()> {
        let text = std::str::from_utf8(data)?;
        let doc = roxmltree::Document::parse(text)?;

        let root = ElementView::new(doc.root_element());
        if root.tag() != "Pipeline" {
            return Err(PipelineError::NotAPipeline);
        }

        if let Some(setup) = root.child("Setup") {
            self.parse_setup(&setup, ctx)?;
        }

        if let Some(queue) = root.child("CommandQueue") {
            self.stages.reserve(queue.child_count());
            for el in queue.children().filter(|el| el.tag() == "Stage") {
                let stage = self.parse_stage(&el, ctx)?;
                self.stages.push(stage);
            }
        }

        // Buffers are allocated only once the whole document parsed.
        self.create_render_targets(ctx.device)
    }

    fn parse_setup(&mut self, setup: &ElementView, ctx: &mut LoadContext) -> Result<()> {
        for el in setup.children().filter(|el| el.tag() == "RenderTarget") {
            self.parse_render_target(&el, ctx)
                .map_err(|e| e.at_line(el.line()))?;
        }
        Ok(())
    }

    fn parse_render_target(&mut self, el: &ElementView, ctx: &mut LoadContext) -> Result<()> {
        let id = el.require("RenderTarget", "id")?;
        if self.targets.find(id).is_some() {
            return Err(PipelineError::DuplicateTarget(id.to_owned()));
        }

        let has_depth_buf = el
            .require("RenderTarget", "depthBuf")?
            .eq_ignore_ascii_case("true");

        let num_col_bufs: u32 = el
            .require("RenderTarget", "numColBufs")?
            .trim()
            .parse()
            .unwrap_or(0);

        let format = match el.attr("format") {
            None => TextureFormat::default(),
            Some(token) => TextureFormat::parse(token)
                .ok_or_else(|| PipelineError::UnknownFormat(token.to_owned()))?,
        };

        let samples = el.attr_u32("maxSamples").min(ctx.max_samples);

        self.targets.insert(RenderTarget {
            id: id.to_owned(),
            has_depth_buf,
            num_col_bufs,
            format,
            samples,
            width: el.attr_u32("width"),
            height: el.attr_u32("height"),
            scale: el.attr_f32("scale", 1.0),
            buffer: None,
        });
        Ok(())
    }

    fn parse_stage(&self, el: &ElementView, ctx: &mut LoadContext) -> Result<PipelineStage> {
        let id = el.attr_or("id", "").to_owned();
        let enabled = el.flag("enabled", true);

        let link = el.attr_or("link", "");
        let material_link = if link.is_empty() {
            None
        } else {
            Some(ctx.materials.request(link))
        };

        let mut commands = Vec::with_capacity(el.child_count());
        for child in el.children() {
            match self.parse_command(&child, ctx) {
                Ok(Some(command)) => commands.push(command),
                Ok(None) => {} // unknown tag without a registered extension
                Err(e) => {
                    return Err(PipelineError::Stage {
                        stage: id,
                        source: Box::new(e.at_line(child.line())),
                    });
                }
            }
        }

        Ok(PipelineStage {
            id,
            enabled,
            material_link,
            commands,
        })
    }

    fn parse_command(
        &self,
        el: &ElementView,
        ctx: &mut LoadContext,
    ) -> Result<Option<PipelineCommand>> {
        let command = match el.tag() {
            "SwitchTarget" => {
                let id = el.require("SwitchTarget", "target")?;
                let target = if id.is_empty() {
                    None
                } else {
                    Some(self.resolve_target(id, "SwitchTarget")?)
                };
                PipelineCommand::SwitchTarget { target }
            }
            "BindBuffer" => {
                let sampler = el.require("BindBuffer", "sampler")?;
                let source_id = el.require("BindBuffer", "sourceRT")?;
                let buf_index = el.require("BindBuffer", "bufIndex")?;
                PipelineCommand::BindBuffer {
                    source: self.resolve_target(source_id, "BindBuffer")?,
                    sampler: sampler.to_owned(),
                    buf_index: buf_index.trim().parse().unwrap_or(0),
                }
            }
            "UnbindBuffers" => PipelineCommand::UnbindBuffers,
            "ClearTarget" => {
                let mut flags = ClearFlags::empty();
                if el.flag("depthBuf", false) {
                    flags |= ClearFlags::DEPTH;
                }
                for i in 0..4 {
                    if el.flag(&format!("colBuf{i}"), false) {
                        flags |= ClearFlags::color(i);
                    }
                }
                PipelineCommand::ClearTarget {
                    flags,
                    color: [
                        el.attr_f32("col_R", 0.0),
                        el.attr_f32("col_G", 0.0),
                        el.attr_f32("col_B", 0.0),
                        el.attr_f32("col_A", 0.0),
                    ],
                }
            }
            "DrawGeometry" => PipelineCommand::DrawGeometry {
                context: el.require("DrawGeometry", "context")?.to_owned(),
                class: ctx.classes.intern(el.attr_or("class", "")),
                order: RenderOrder::parse(el.attr_or("order", "")),
            },
            "DrawQuad" => PipelineCommand::DrawQuad {
                material: ctx.materials.request(el.require("DrawQuad", "material")?),
                context: el.require("DrawQuad", "context")?.to_owned(),
            },
            "DoForwardLightLoop" => PipelineCommand::DoForwardLightLoop {
                context: el.attr_or("context", "").to_owned(),
                class: ctx.classes.intern(el.attr_or("class", "")),
                no_shadows: el.attr_or("noShadows", "false").eq_ignore_ascii_case("true"),
                order: RenderOrder::parse(el.attr_or("order", "")),
            },
            "DoDeferredLightLoop" => PipelineCommand::DoDeferredLightLoop {
                context: el.attr_or("context", "").to_owned(),
                no_shadows: el.attr_or("noShadows", "false").eq_ignore_ascii_case("true"),
            },
            "SetUniform" => PipelineCommand::SetUniform {
                material: ctx.materials.request(el.require("SetUniform", "material")?),
                uniform: el.require("SetUniform", "uniform")?.to_owned(),
                value: [
                    el.attr_f32("a", 0.0),
                    el.attr_f32("b", 0.0),
                    el.attr_f32("c", 0.0),
                    el.attr_f32("d", 0.0),
                ],
            },
            tag => {
                return match ctx.registry.parse(tag, el) {
                    None => Ok(None),
                    Some(Ok(command)) => Ok(Some(command)),
                    Some(Err(msg)) => Err(PipelineError::Extension(msg)),
                };
            }
        };
        Ok(Some(command))
    }

    fn resolve_target(&self, id: &str, command: &'static str) -> Result<TargetKey> {
        self.targets
            .find(id)
            .ok_or(PipelineError::UnresolvedTarget { command })
    }

    // ========================================================================
    // Render Target Lifecycle
    // ========================================================================

    fn create_render_targets(&mut self, device: &mut dyn RenderDevice) -> Result<()> {
        let (base_width, base_height) = (self.base_width, self.base_height);
        let keys: Vec<TargetKey> = self.targets.keys().collect();
        for key in keys {
            let Some(rt) = self.targets.get(key) else {
                continue;
            };
            let (width, height) = rt.effective_size(base_width, base_height);
            let desc = RenderBufferDesc {
                label: &rt.id,
                width,
                height,
                format: rt.format,
                depth: rt.has_depth_buf,
                num_col_bufs: rt.num_col_bufs,
                samples: rt.samples,
            };
            let Some(buffer) = device.create_render_buffer(&desc) else {
                return Err(PipelineError::DeviceAllocation(rt.id.clone()));
            };
            if let Some(rt) = self.targets.get_mut(key) {
                rt.buffer = Some(buffer);
            }
        }
        Ok(())
    }

    fn release_render_targets(&mut self, device: &mut dyn RenderDevice) {
        let keys: Vec<TargetKey> = self.targets.keys().collect();
        for key in keys {
            if let Some(rt) = self.targets.get_mut(key) {
                if let Some(buffer) = rt.buffer.take() {
                    device.destroy_render_buffer(buffer);
                }
            }
        }
    }

    /// Changes the base resolution and recreates every render target with
    /// dimensions derived from it. Descriptor identity, formats and stage
    /// content are untouched by a successful resize; a failed one resets the
    /// definition like a failed load.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, width: u32, height: u32) -> Result<()> {
        self.base_width = width;
        self.base_height = height;

        self.release_render_targets(device);
        if let Err(e) = self.create_render_targets(device) {
            self.reset(device);
            log::error!("Pipeline resource '{}': {e}", self.name);
            return Err(e);
        }
        Ok(())
    }

    /// Releases all device buffers and clears render targets and stages.
    ///
    /// Idempotent; the base resolution is kept.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        self.release_render_targets(device);
        self.targets.clear();
        self.stages.clear();
    }

    fn reset(&mut self, device: &mut dyn RenderDevice) {
        self.release(device);
        self.base_width = DEFAULT_BASE_WIDTH;
        self.base_height = DEFAULT_BASE_HEIGHT;
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// A stage by index.
    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&PipelineStage> {
        self.stages.get(index)
    }

    /// The stages, in execution order.
    #[must_use]
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Index of the stage with the given id.
    #[must_use]
    pub fn find_stage(&self, id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == id)
    }

    /// A stage's enabled flag.
    #[must_use]
    pub fn stage_enabled(&self, index: usize) -> Option<bool> {
        self.stages.get(index).map(|s| s.enabled)
    }

    /// Toggles a stage without reparsing; its command list is untouched.
    /// Returns `false` when the index is out of range.
    pub fn set_stage_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.stages.get_mut(index) {
            Some(stage) => {
                stage.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// A stage's id.
    #[must_use]
    pub fn stage_name(&self, index: usize) -> Option<&str> {
        self.stages.get(index).map(|s| s.id.as_str())
    }

    /// Number of declared render targets.
    #[must_use]
    pub fn render_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Resolves a render-target id; first declaration wins.
    #[must_use]
    pub fn find_render_target(&self, id: &str) -> Option<TargetKey> {
        self.targets.find(id)
    }

    /// A render target by key.
    #[must_use]
    pub fn render_target(&self, key: TargetKey) -> Option<&RenderTarget> {
        self.targets.get(key)
    }

    /// The render targets with their keys, in declaration order.
    pub fn render_targets(&self) -> impl Iterator<Item = (TargetKey, &RenderTarget)> {
        self.targets.iter()
    }

    // ========================================================================
    // Readback
    // ========================================================================

    /// Reads back pixel data of a named render target's attachment.
    ///
    /// The empty name addresses the back buffer. Returns `None` when the name
    /// resolves to no declared target, the target has no live buffer, or the
    /// device rejects the read.
    pub fn read_render_target_data(
        &self,
        device: &mut dyn RenderDevice,
        target: &str,
        buf_index: u32,
        dest: &mut [u8],
    ) -> Option<ReadbackInfo> {
        let buffer = if target.is_empty() {
            None
        } else {
            let rt = self.targets.get(self.targets.find(target)?)?;
            Some(rt.buffer()?)
        };
        device.read_render_buffer(buffer, buf_index, dest)
    }
}
