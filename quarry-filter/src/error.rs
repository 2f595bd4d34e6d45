//! Error types for the boundary operations of the filter crate.
//!
//! Compiling, parsing, combining and comparing filters never fail. Errors only
//! arise where values cross into the crate: encoding a value into canonical
//! bytes, validating geometry, building a parser configuration, or parsing an
//! ObjectId from text.

use thiserror::Error;

/// Result type for filter boundary operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur at the edges of the filter algebra.
#[derive(Error, Debug)]
pub enum FilterError {
    /// A BSON value could not be encoded.
    #[error("bson encoding error: {0}")]
    Encoding(#[from] bson::ser::Error),

    /// A geometry failed validation.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid ObjectId.
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}

impl FilterError {
    /// Create an invalid geometry error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid object id error.
    pub fn invalid_object_id(message: impl Into<String>) -> Self {
        Self::InvalidObjectId(message.into())
    }

    /// Check if this is an encoding error.
    pub fn is_encoding_error(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }

    /// Check if this is a geometry error.
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Self::InvalidGeometry(_))
    }

    /// Check if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<bson::oid::Error> for FilterError {
    fn from(err: bson::oid::Error) -> Self {
        FilterError::InvalidObjectId(err.to_string())
    }
}
