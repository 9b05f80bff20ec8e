//! Error types for hello-camera

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Format(#[source] image::ImageError),

    #[error("Image encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl CameraError {
    /// Short stable identifier, used by transports to tag error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            CameraError::Config(_) => "config",
            CameraError::Io(_) => "io",
            CameraError::Format(_) => "format",
            CameraError::Encode(_) => "encode",
            CameraError::NotImplemented(_) => "not_implemented",
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, CameraError::NotImplemented(_))
    }
}
