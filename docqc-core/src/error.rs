//! Errors raised while loading a document package.
//!
//! Everything past the load boundary works with `anyhow::Result`; a rule
//! that fails is reported inside the QC report rather than propagated.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a readable zip container.
    #[error("Not a valid .docx container: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required part is missing from the container.
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// A part exists but its markup is not well-formed.
    #[error("Malformed markup in {part}: {message}")]
    Xml { part: String, message: String },
}

impl LoadError {
    pub fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        LoadError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::MissingPart("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Missing required part: word/document.xml");

        let err = LoadError::xml("word/document.xml", "unexpected end of file");
        assert_eq!(
            err.to_string(),
            "Malformed markup in word/document.xml: unexpected end of file"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: LoadError = io_err.into();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
