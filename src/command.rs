//! Pipeline Commands
//!
//! One [`PipelineCommand`] is a single operation of a pipeline stage. Built-in
//! commands carry their arguments as typed fields, so a command can only ever
//! be constructed with the arity and types its kind requires. Externally
//! registered commands carry an ordered list of [`CmdParam`] values produced
//! by their extension's parser.

use bitflags::bitflags;

use crate::interner::ClassId;
use crate::material::MaterialHandle;
use crate::target::TargetKey;

/// Tagged argument value of an external pipeline command.
#[derive(Clone, Debug)]
pub enum CmdParam {
    /// Render-target handle; `None` addresses the back buffer.
    Target(Option<TargetKey>),
    /// Integer value.
    Int(i32),
    /// Float value.
    Float(f32),
    /// Boolean value.
    Bool(bool),
    /// Text value.
    Text(String),
    /// Reference-counted material resource.
    Resource(MaterialHandle),
}

impl CmdParam {
    /// The integer value, if this parameter holds one.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The float value, if this parameter holds one.
    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean value, if this parameter holds one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The text value, if this parameter holds one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The render-target handle, if this parameter holds one.
    #[must_use]
    pub fn as_target(&self) -> Option<Option<TargetKey>> {
        match self {
            Self::Target(v) => Some(*v),
            _ => None,
        }
    }

    /// The material reference, if this parameter holds one.
    #[must_use]
    pub fn as_resource(&self) -> Option<&MaterialHandle> {
        match self {
            Self::Resource(v) => Some(v),
            _ => None,
        }
    }
}

/// Geometry submission order for draw commands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum RenderOrder {
    /// Sort to minimize render-state changes. The default when the `order`
    /// attribute is absent or unrecognized.
    #[default]
    StateChanges,
    /// Near-to-far sort.
    FrontToBack,
    /// Far-to-near sort.
    BackToFront,
    /// Submission order of the scene.
    None,
}

impl RenderOrder {
    /// Parses an `order` attribute token (case-insensitive).
    #[must_use]
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("FRONT_TO_BACK") {
            Self::FrontToBack
        } else if token.eq_ignore_ascii_case("BACK_TO_FRONT") {
            Self::BackToFront
        } else if token.eq_ignore_ascii_case("NONE") {
            Self::None
        } else {
            Self::StateChanges
        }
    }
}

bitflags! {
    /// Attachment selection mask of a `ClearTarget` command.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ClearFlags: u8 {
        /// Clear the depth attachment.
        const DEPTH = 1 << 0;
        /// Clear color attachment 0.
        const COLOR0 = 1 << 1;
        /// Clear color attachment 1.
        const COLOR1 = 1 << 2;
        /// Clear color attachment 2.
        const COLOR2 = 1 << 3;
        /// Clear color attachment 3.
        const COLOR3 = 1 << 4;
    }
}

impl ClearFlags {
    /// The flag selecting color attachment `index` (0..=3).
    #[must_use]
    pub fn color(index: u32) -> Self {
        match index {
            0 => Self::COLOR0,
            1 => Self::COLOR1,
            2 => Self::COLOR2,
            3 => Self::COLOR3,
            _ => Self::empty(),
        }
    }
}

/// One operation of a pipeline stage.
#[derive(Clone, Debug)]
pub enum PipelineCommand {
    /// Makes a render target (or the back buffer) the active output.
    SwitchTarget {
        /// Output target; `None` is the back buffer.
        target: Option<TargetKey>,
    },
    /// Binds one attachment of a render target as a texture input.
    BindBuffer {
        /// Source render target.
        source: TargetKey,
        /// Sampler name the attachment is bound to.
        sampler: String,
        /// Attachment index within the source target.
        buf_index: u32,
    },
    /// Unbinds all buffers bound by previous `BindBuffer` commands.
    UnbindBuffers,
    /// Clears attachments of the active target.
    ClearTarget {
        /// Which attachments to clear.
        flags: ClearFlags,
        /// RGBA clear color.
        color: [f32; 4],
    },
    /// Draws scene geometry with a shader context.
    DrawGeometry {
        /// Shader context name.
        context: String,
        /// Material class filter.
        class: ClassId,
        /// Submission order.
        order: RenderOrder,
    },
    /// Draws a full-screen quad with a material.
    DrawQuad {
        /// Material to draw with.
        material: MaterialHandle,
        /// Shader context name.
        context: String,
    },
    /// Runs the forward lighting loop over the scene's light sources.
    DoForwardLightLoop {
        /// Shader context name; empty selects the light's own context.
        context: String,
        /// Material class filter.
        class: ClassId,
        /// Skips shadow rendering when set.
        no_shadows: bool,
        /// Submission order.
        order: RenderOrder,
    },
    /// Runs the deferred lighting loop over the scene's light sources.
    DoDeferredLightLoop {
        /// Shader context name; empty selects the light's own context.
        context: String,
        /// Skips shadow rendering when set.
        no_shadows: bool,
    },
    /// Overrides a four-component material uniform.
    SetUniform {
        /// Material owning the uniform.
        material: MaterialHandle,
        /// Uniform name.
        uniform: String,
        /// New value.
        value: [f32; 4],
    },
    /// A command supplied by a registered extension.
    External {
        /// Index of the owning registry entry, used for execute dispatch.
        index: usize,
        /// Parameters produced by the extension's parser.
        params: Vec<CmdParam>,
    },
}

impl PipelineCommand {
    /// The command's definition-file tag name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwitchTarget { .. } => "SwitchTarget",
            Self::BindBuffer { .. } => "BindBuffer",
            Self::UnbindBuffers => "UnbindBuffers",
            Self::ClearTarget { .. } => "ClearTarget",
            Self::DrawGeometry { .. } => "DrawGeometry",
            Self::DrawQuad { .. } => "DrawQuad",
            Self::DoForwardLightLoop { .. } => "DoForwardLightLoop",
            Self::DoDeferredLightLoop { .. } => "DoDeferredLightLoop",
            Self::SetUniform { .. } => "SetUniform",
            Self::External { .. } => "External",
        }
    }

    /// The registry index of an external command, `None` for built-ins.
    #[must_use]
    pub fn external_index(&self) -> Option<usize> {
        match self {
            Self::External { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_tokens() {
        assert_eq!(RenderOrder::parse("FRONT_TO_BACK"), RenderOrder::FrontToBack);
        assert_eq!(RenderOrder::parse("back_to_front"), RenderOrder::BackToFront);
        assert_eq!(RenderOrder::parse("NONE"), RenderOrder::None);
        assert_eq!(RenderOrder::parse(""), RenderOrder::StateChanges);
        assert_eq!(RenderOrder::parse("SIDEWAYS"), RenderOrder::StateChanges);
    }

    #[test]
    fn test_clear_flag_indices() {
        assert_eq!(ClearFlags::color(0), ClearFlags::COLOR0);
        assert_eq!(ClearFlags::color(3), ClearFlags::COLOR3);
        assert_eq!(ClearFlags::color(4), ClearFlags::empty());
    }

    #[test]
    fn test_param_accessors_reject_other_tags() {
        let p = CmdParam::Int(7);
        assert_eq!(p.as_int(), Some(7));
        assert_eq!(p.as_float(), None);
        assert_eq!(p.as_text(), None);

        let t = CmdParam::Text("COPY".to_owned());
        assert_eq!(t.as_text(), Some("COPY"));
        assert_eq!(t.as_bool(), None);
    }
}
