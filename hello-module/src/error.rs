//! Error types for hello-module

use hello_camera::CameraError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Model {model} implements {expected}, config asked for {actual}")]
    ApiMismatch {
        model: String,
        expected: String,
        actual: String,
    },

    #[error("Model already registered: {0}")]
    DuplicateModel(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Resource already exists: {0}")]
    DuplicateResource(String),

    #[error("Unexpected response from request loop: {0}")]
    UnexpectedResponse(&'static str),

    #[error("Module request loop is not running")]
    ChannelClosed,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error(transparent)]
    Camera(#[from] CameraError),
}

impl ModuleError {
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleError::UnknownModel(_) => "unknown_model",
            ModuleError::ApiMismatch { .. } => "api_mismatch",
            ModuleError::DuplicateModel(_) => "duplicate_model",
            ModuleError::UnknownResource(_) => "unknown_resource",
            ModuleError::DuplicateResource(_) => "duplicate_resource",
            ModuleError::UnexpectedResponse(_) => "unexpected_response",
            ModuleError::ChannelClosed => "unavailable",
            ModuleError::Settings(_) => "settings",
            ModuleError::Camera(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_error_is_transparent() {
        let err: ModuleError = CameraError::NotImplemented("get_properties").into();
        assert_eq!(err.to_string(), "Not implemented: get_properties");
        assert_eq!(err.kind(), "not_implemented");
    }

    #[test]
    fn test_unknown_resource_display() {
        let err = ModuleError::UnknownResource("cam".to_string());
        assert!(err.to_string().contains("cam"));
        assert_eq!(err.kind(), "unknown_resource");
    }
}
