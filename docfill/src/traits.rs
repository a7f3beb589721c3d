//! Traits at the seams of the core: loading template sources and handing
//! merged data to the external rendering engine.

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
};

use thiserror::Error;

use crate::{error::Error, types::Record};

/// A type that can be loaded from a file, a reader, a string or bytes.
///
/// # Example
///
/// ```rust,no_run
/// use docfill::traits::Loader;
/// let template = docfill::Template::read_from("word/document.xml")?;
/// println!("{:?}", template.placeholders());
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Loader {
    /// Load from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Load from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Load from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}

/// Failure reported by a rendering engine. The message is shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        RenderError {
            message: message.into(),
        }
    }
}

impl From<RenderError> for Error {
    fn from(value: RenderError) -> Self {
        Error::Render {
            message: value.message,
        }
    }
}

/// The seam to the document engine that substitutes placeholder values into a template.
///
/// Implementations must treat `template` as read-only; the output is a new document.
pub trait Renderer {
    fn render(&self, template: &[u8], data: &Record) -> Result<Vec<u8>, RenderError>;
}
