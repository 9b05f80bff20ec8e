//! Model identity declared to the host's registry
//!
//! A model is addressed by a `namespace:family:name` triple. The heatmap
//! camera is published as [`HEATMAP_CAMERA_MODEL`] under [`CAMERA_API`].

use crate::error::CameraError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// API triple every camera resource implements
pub const CAMERA_API: &str = "rdk:component:camera";

/// Namespace and family half of a model triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelFamily {
    pub namespace: String,
    pub family: String,
}

impl ModelFamily {
    pub fn new(namespace: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            family: family.into(),
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.family)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model {
    pub family: ModelFamily,
    pub name: String,
}

impl Model {
    pub fn new(family: ModelFamily, name: impl Into<String>) -> Self {
        Self {
            family,
            name: name.into(),
        }
    }
}

/// The heatmap camera model
pub static HEATMAP_CAMERA_MODEL: std::sync::LazyLock<Model> = std::sync::LazyLock::new(|| {
    Model::new(ModelFamily::new("rohit", "hello-quest1"), "hello-camera")
});

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.name)
    }
}

impl FromStr for Model {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, family, name]
                if !namespace.is_empty() && !family.is_empty() && !name.is_empty() =>
            {
                Ok(Model::new(ModelFamily::new(*namespace, *family), *name))
            }
            _ => Err(CameraError::Config(format!(
                "model must be a namespace:family:name triple, got '{}'",
                s
            ))),
        }
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heatmap_model_triple() {
        assert_eq!(HEATMAP_CAMERA_MODEL.to_string(), "rohit:hello-quest1:hello-camera");
        assert_eq!(HEATMAP_CAMERA_MODEL.family.to_string(), "rohit:hello-quest1");
    }

    #[test]
    fn test_model_parse_round_trip() {
        let model: Model = "rohit:hello-quest1:hello-camera".parse().unwrap();
        assert_eq!(model, *HEATMAP_CAMERA_MODEL);
    }

    #[test]
    fn test_model_parse_rejects_malformed() {
        assert!("hello-camera".parse::<Model>().is_err());
        assert!("rohit:hello-camera".parse::<Model>().is_err());
        assert!("rohit::hello-camera".parse::<Model>().is_err());
        assert!("a:b:c:d".parse::<Model>().is_err());
    }

    #[test]
    fn test_model_serde_as_string() {
        let json = serde_json::to_value(&*HEATMAP_CAMERA_MODEL).unwrap();
        assert_eq!(json, serde_json::json!("rohit:hello-quest1:hello-camera"));
        let back: Model = serde_json::from_value(json).unwrap();
        assert_eq!(back, *HEATMAP_CAMERA_MODEL);
    }
}
