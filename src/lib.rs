#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Veil — a data-driven render pipeline engine.
//!
//! A pipeline definition describes, in a declarative XML format, the
//! off-screen render targets and the ordered command stages a 3D renderer
//! executes each frame. This crate parses such definitions, manages the
//! lifecycle of the declared render targets against a scalable base
//! resolution, and lets extensions register new command kinds without
//! touching the core parser.
//!
//! The scene graph, material system and graphics backend stay outside: they
//! plug in through the [`MaterialProvider`] and [`RenderDevice`] seams.

pub mod command;
pub mod device;
pub mod errors;
pub mod interner;
pub mod material;
pub mod pipeline;
pub mod registry;
pub mod target;
pub mod xml;

pub use command::{ClearFlags, CmdParam, PipelineCommand, RenderOrder};
pub use device::{ReadbackInfo, RenderBufferDesc, RenderBufferId, RenderDevice};
pub use errors::{PipelineError, Result};
pub use interner::{ClassId, MaterialClasses};
pub use material::{MaterialCache, MaterialHandle, MaterialProvider};
pub use pipeline::{LoadContext, PipelineDefinition, PipelineStage};
pub use registry::{CommandExtension, CommandRegistry, ExecContext};
pub use target::{RenderTarget, TargetKey, TargetSet, TextureFormat};
pub use xml::ElementView;
