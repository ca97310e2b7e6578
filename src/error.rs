//! Error types for the card studio

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, ingesting or exporting a card
#[derive(Error, Debug)]
pub enum Error {
    /// The uploaded file does not declare an image content type
    #[error("Please upload an image file (got {0:?})")]
    InvalidType(String),

    /// The uploaded file exceeds the upload ceiling
    #[error("Image too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// The uploaded bytes could not be read
    #[error("Failed to upload image: {0}")]
    ReadFailed(String),

    /// Failed to render or encode the preview
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Export was requested before the card was complete
    #[error("Export precondition failed: {0}")]
    PreconditionFailed(String),

    /// Capture or encode failed. Details are logged, not carried.
    #[error("Failed to generate card image")]
    ExportFailed,

    /// Another export is still running
    #[error("An export is already in progress")]
    ExportBusy,

    /// The operation was cancelled through its token
    #[error("Operation cancelled")]
    Cancelled,

    /// A form field path or value that does not address a card field
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A string that is not a self-contained image reference
    #[error("Invalid embedded image: {0}")]
    InvalidImage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    /// Whether the user can fix the problem and retry the same action.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidType(_)
                | Error::TooLarge { .. }
                | Error::PreconditionFailed(_)
                | Error::ExportBusy
        )
    }
}
