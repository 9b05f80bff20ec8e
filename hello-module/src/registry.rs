//! Model registry
//!
//! Maps each model this module serves to the functions the host lifecycle
//! needs: config validation and construction.

use crate::error::ModuleError;
use hello_camera::config::validate_config;
use hello_camera::{
    Camera, CameraError, ComponentConfig, Dependencies, HeatmapCamera, Model, CAMERA_API,
    HEATMAP_CAMERA_MODEL,
};
use std::collections::HashMap;
use std::sync::Arc;

pub type ValidateFn = fn(&ComponentConfig) -> Result<Vec<String>, CameraError>;
pub type ConstructFn = fn(&ComponentConfig, &Dependencies) -> Result<Arc<dyn Camera>, CameraError>;

/// Everything the module needs to serve one model
#[derive(Clone)]
pub struct Registration {
    pub api: String,
    pub validate: ValidateFn,
    pub construct: ConstructFn,
}

#[derive(Clone, Default)]
pub struct ModelRegistry {
    entries: HashMap<Model, Registration>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: Model, registration: Registration) -> Result<(), ModuleError> {
        if self.entries.contains_key(&model) {
            return Err(ModuleError::DuplicateModel(model.to_string()));
        }
        self.entries.insert(model, registration);
        Ok(())
    }

    /// (api, model) pairs announced to the host on startup
    pub fn models(&self) -> Vec<(String, Model)> {
        let mut models: Vec<_> = self
            .entries
            .iter()
            .map(|(model, reg)| (reg.api.clone(), model.clone()))
            .collect();
        models.sort_by_key(|(_, model)| model.to_string());
        models
    }

    /// Resolve the registration a config refers to
    pub fn lookup(&self, config: &ComponentConfig) -> Result<(Model, &Registration), ModuleError> {
        let model: Model = config
            .model
            .parse()
            .map_err(|_| ModuleError::UnknownModel(config.model.clone()))?;
        let registration = self
            .entries
            .get(&model)
            .ok_or_else(|| ModuleError::UnknownModel(config.model.clone()))?;

        if registration.api != config.api {
            return Err(ModuleError::ApiMismatch {
                model: model.to_string(),
                expected: registration.api.clone(),
                actual: config.api.clone(),
            });
        }
        Ok((model, registration))
    }

    pub fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>, ModuleError> {
        let (_, registration) = self.lookup(config)?;
        Ok((registration.validate)(config)?)
    }

    pub fn construct(
        &self,
        config: &ComponentConfig,
        dependencies: &Dependencies,
    ) -> Result<(Model, Arc<dyn Camera>), ModuleError> {
        let (model, registration) = self.lookup(config)?;
        (registration.validate)(config)?;
        let resource = (registration.construct)(config, dependencies)?;
        Ok((model, resource))
    }
}

fn construct_heatmap_camera(
    config: &ComponentConfig,
    dependencies: &Dependencies,
) -> Result<Arc<dyn Camera>, CameraError> {
    Ok(Arc::new(HeatmapCamera::new(config, dependencies)?))
}

/// Registry with every model this module ships
pub fn default_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry.entries.insert(
        HEATMAP_CAMERA_MODEL.clone(),
        Registration {
            api: CAMERA_API.to_string(),
            validate: validate_config,
            construct: construct_heatmap_camera,
        },
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heatmap_config() -> ComponentConfig {
        ComponentConfig::new("cam", HEATMAP_CAMERA_MODEL.to_string())
            .with_attribute("image_path", "/tmp/a.png")
    }

    #[test]
    fn test_default_registry_announces_heatmap_camera() {
        let models = default_registry().models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].0, "rdk:component:camera");
        assert_eq!(models[0].1.to_string(), "rohit:hello-quest1:hello-camera");
    }

    #[test]
    fn test_validate_known_model() {
        let deps = default_registry().validate(&heatmap_config()).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_unknown_model_rejected() {
        let mut config = heatmap_config();
        config.model = "acme:cams:thermal".to_string();
        assert!(matches!(
            default_registry().validate(&config),
            Err(ModuleError::UnknownModel(_))
        ));

        config.model = "garbage".to_string();
        assert!(matches!(
            default_registry().construct(&config, &Dependencies::new()),
            Err(ModuleError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_api_mismatch_rejected() {
        let mut config = heatmap_config();
        config.api = "rdk:component:motor".to_string();
        assert!(matches!(
            default_registry().validate(&config),
            Err(ModuleError::ApiMismatch { .. })
        ));
    }

    #[test]
    fn test_construct_invalid_config_fails() {
        let config = ComponentConfig::new("cam", HEATMAP_CAMERA_MODEL.to_string());
        assert!(matches!(
            default_registry().construct(&config, &Dependencies::new()),
            Err(ModuleError::Camera(CameraError::Config(_)))
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = default_registry();
        let existing = registry.lookup(&heatmap_config()).unwrap().1.clone();
        assert!(matches!(
            registry.register(HEATMAP_CAMERA_MODEL.clone(), existing),
            Err(ModuleError::DuplicateModel(_))
        ));
    }
}
