//! Error types shared by the bubble and layout modules.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid geometry: width={width}, height={height} (both must be positive)")]
    InvalidGeometry { width: f32, height: f32 },

    #[error("document: missing field `{field}`")]
    MissingDocumentField { field: &'static str },

    #[error("bubble {index}: missing field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("bubble {index}: invalid field `{field}`: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("text is empty")]
    EmptyText,

    #[error("invalid text pattern: {0}")]
    InvalidPattern(String),
}

pub type Result<T> = std::result::Result<T, Error>;
