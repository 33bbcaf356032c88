// Error types for the gallery controller
use crate::catalog::DestinationId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    // The only error an interaction can hit at runtime
    #[error("Destination not found: {0}")]
    NotFound(DestinationId),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GalleryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GalleryError::NotFound(_))
    }
}
