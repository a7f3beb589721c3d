//! All error types for the docfill crate.
//!
//! Malformed scan data never produces an error: it degrades to a raw payload.
//! These are returned for caller mistakes and for failures of the external
//! collaborators (template reading, rendering) that the core cannot recover from.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot parse empty input")]
    EmptyInput,

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no template loaded")]
    NoTemplateLoaded,

    #[error("{message}")]
    Render { message: String },

    #[error("invalid slot `{0}`")]
    InvalidSlot(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a render error carrying the engine's message verbatim.
    pub fn render_error(message: impl Into<String>) -> Self {
        Error::Render {
            message: message.into(),
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
