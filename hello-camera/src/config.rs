//! Configuration for hello-camera
//!
//! The host delivers a [`ComponentConfig`] whose `attributes` are a loosely
//! typed JSON object. [`HeatmapCameraConfig::from_attributes`] is the only way
//! to turn those attributes into something the camera will bind to, and it
//! rejects anything that does not match the schema exactly.

use crate::error::CameraError;
use crate::model::CAMERA_API;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute key holding the source image path
pub const IMAGE_PATH_ATTRIBUTE: &str = "image_path";

/// Resource configuration as delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Resource name, unique within the module
    pub name: String,
    /// API triple, e.g. `rdk:component:camera`
    #[serde(default = "default_api")]
    pub api: String,
    /// Model triple, e.g. `rohit:hello-quest1:hello-camera`
    pub model: String,
    /// Model-specific attributes
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

fn default_api() -> String {
    CAMERA_API.to_string()
}

impl ComponentConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api: default_api(),
            model: model.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Validated heatmap camera settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatmapCameraConfig {
    /// Image file re-read on every `get_image`
    pub image_path: String,
}

impl HeatmapCameraConfig {
    /// Strict parse of the host-supplied attributes
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, CameraError> {
        let image_path = match attributes.get(IMAGE_PATH_ATTRIBUTE) {
            None => return Err(CameraError::Config("Missing image_path attribute.".to_string())),
            Some(Value::String(path)) => path,
            Some(_) => return Err(CameraError::Config("image_path must be a string.".to_string())),
        };

        if image_path.is_empty() {
            return Err(CameraError::Config("image_path must not be empty.".to_string()));
        }

        // Remaining schema checks (unknown attributes) are left to serde
        serde_json::from_value(Value::Object(attributes.clone()))
            .map_err(|e| CameraError::Config(format!("Invalid attributes: {}", e)))
    }
}

/// Validate a config and report implicit dependencies.
///
/// The heatmap camera depends on no other resource, so a valid config always
/// yields an empty list.
pub fn validate_config(config: &ComponentConfig) -> Result<Vec<String>, CameraError> {
    HeatmapCameraConfig::from_attributes(&config.attributes)?;
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with(attrs: Value) -> ComponentConfig {
        let mut config = ComponentConfig::new("cam", "rohit:hello-quest1:hello-camera");
        config.attributes = attrs.as_object().cloned().unwrap();
        config
    }

    #[test]
    fn test_valid_config() {
        let config = config_with(json!({"image_path": "/tmp/a.png"}));
        assert_eq!(validate_config(&config).unwrap(), Vec::<String>::new());
        let parsed = HeatmapCameraConfig::from_attributes(&config.attributes).unwrap();
        assert_eq!(parsed.image_path, "/tmp/a.png");
    }

    #[test]
    fn test_missing_image_path() {
        let err = validate_config(&config_with(json!({}))).unwrap_err();
        assert!(matches!(err, CameraError::Config(ref m) if m.contains("Missing image_path")));
    }

    #[test]
    fn test_non_string_image_path() {
        for value in [json!(42), json!(true), json!(null), json!(["a"]), json!({"p": "a"})] {
            let err = validate_config(&config_with(json!({ "image_path": value }))).unwrap_err();
            assert!(matches!(err, CameraError::Config(ref m) if m.contains("must be a string")));
        }
    }

    #[test]
    fn test_empty_image_path() {
        let err = validate_config(&config_with(json!({"image_path": ""}))).unwrap_err();
        assert!(matches!(err, CameraError::Config(ref m) if m.contains("must not be empty")));
    }

    #[test]
    fn test_whitespace_image_path_is_a_filename() {
        let parsed = HeatmapCameraConfig::from_attributes(&json!({"image_path": "  "}).as_object().cloned().unwrap()).unwrap();
        assert_eq!(parsed.image_path, "  ");
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = validate_config(&config_with(json!({
            "image_path": "/tmp/a.png",
            "colormap": "turbo",
        })))
        .unwrap_err();
        assert!(matches!(err, CameraError::Config(ref m) if m.contains("colormap")));
    }

    #[test]
    fn test_component_config_defaults_api() {
        let config: ComponentConfig = serde_json::from_value(json!({
            "name": "cam",
            "model": "rohit:hello-quest1:hello-camera",
        }))
        .unwrap();
        assert_eq!(config.api, CAMERA_API);
        assert!(config.attributes.is_empty());
    }
}
