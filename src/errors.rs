//! Error Types
//!
//! This module defines the error types used throughout the pipeline engine.
//!
//! # Overview
//!
//! The main error type [`PipelineError`] covers all failure modes of loading
//! and resizing a pipeline definition:
//! - malformed definition documents (missing attributes, unknown enum tokens)
//! - references to undefined render targets
//! - device render-buffer allocation failures
//! - extension parser failures (passed through verbatim)
//!
//! All failures are fatal for the current `load`/`resize` call; the pipeline
//! is reset to its default empty state before the error is returned.

use thiserror::Error;

/// The main error type for pipeline definition loading.
#[derive(Error, Debug)]
pub enum PipelineError {
    // ========================================================================
    // Document-Level Errors
    // ========================================================================
    /// The definition bytes are not valid UTF-8.
    #[error("Pipeline definition is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The XML reader rejected the document.
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The root element is not `Pipeline`.
    #[error("Not a pipeline resource file")]
    NotAPipeline,

    // ========================================================================
    // Definition Errors
    // ========================================================================
    /// A required attribute is absent from an element.
    #[error("Missing {element} attribute '{attr}'")]
    MissingAttribute {
        /// The element (command or `RenderTarget`) that lacks the attribute
        element: &'static str,
        /// The absent attribute name
        attr: &'static str,
    },

    /// A `format` attribute does not name a supported texture format.
    #[error("Unknown RenderTarget format '{0}'")]
    UnknownFormat(String),

    /// Two render targets in the same pipeline share an id.
    #[error("Duplicate render target id '{0}'")]
    DuplicateTarget(String),

    /// A command references a render target id that was never declared.
    #[error("Reference to undefined render target in {command}")]
    UnresolvedTarget {
        /// The command holding the dangling reference
        command: &'static str,
    },

    /// A registered extension parser rejected its element.
    #[error("{0}")]
    Extension(String),

    // ========================================================================
    // Context Wrappers
    // ========================================================================
    /// An error attributed to the stage whose commands were being parsed.
    #[error("Error in stage '{stage}': {source}")]
    Stage {
        /// The owning stage's id
        stage: String,
        /// The underlying parse error
        source: Box<PipelineError>,
    },

    /// An error with a source-line attribution.
    #[error("{source} (line {line})")]
    AtLine {
        /// 1-based line in the definition document
        line: u32,
        /// The underlying error
        source: Box<PipelineError>,
    },

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// The device failed to allocate a render target's buffer.
    #[error("Failed to create render target '{0}'")]
    DeviceAllocation(String),
}

impl PipelineError {
    /// Wraps the error with a source-line attribution.
    ///
    /// Already-attributed errors keep their original (innermost) line.
    #[must_use]
    pub fn at_line(self, line: u32) -> Self {
        match self {
            e @ PipelineError::AtLine { .. } => e,
            e => PipelineError::AtLine {
                line,
                source: Box::new(e),
            },
        }
    }
}

/// Alias for `Result<T, PipelineError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;
