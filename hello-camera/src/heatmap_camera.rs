//! The heatmap camera resource

use crate::camera::{Camera, CameraImage, CameraProperties, NamedImage, ResponseMetadata};
use crate::config::{ComponentConfig, HeatmapCameraConfig};
use crate::error::CameraError;
use crate::heatmap::render_heatmap;
use crate::mime::MimeType;
use crate::resource::{Dependencies, Extra, Resource};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::time::Duration;
use tracing::{debug, info};

/// Lifecycle of a heatmap camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraState {
    /// Constructed, nothing bound yet (or closed)
    Unconfigured,
    /// Bound to a validated config; frames can be served
    Ready(HeatmapCameraConfig),
}

/// Camera that re-reads a static image and serves it as a jet heatmap
pub struct HeatmapCamera {
    name: String,
    state: RwLock<CameraState>,
}

impl HeatmapCamera {
    /// Create an unconfigured camera
    pub fn unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(CameraState::Unconfigured),
        }
    }

    /// Create a camera and bind `config` to it
    pub fn new(config: &ComponentConfig, dependencies: &Dependencies) -> Result<Self, CameraError> {
        let camera = Self::unconfigured(config.name.clone());
        camera.reconfigure(config, dependencies)?;
        Ok(camera)
    }

    pub fn state(&self) -> CameraState {
        self.state.read().clone()
    }

    /// Currently bound image path, if any
    pub fn image_path(&self) -> Option<String> {
        match &*self.state.read() {
            CameraState::Ready(config) => Some(config.image_path.clone()),
            CameraState::Unconfigured => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), CameraState::Ready(_))
    }
}

#[async_trait]
impl Resource for HeatmapCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn reconfigure(&self, config: &ComponentConfig, _dependencies: &Dependencies) -> Result<(), CameraError> {
        // Parse before taking the lock so a bad config leaves the old state intact
        let parsed = HeatmapCameraConfig::from_attributes(&config.attributes)?;
        info!("Camera {} bound to image {}", self.name, parsed.image_path);
        *self.state.write() = CameraState::Ready(parsed);
        Ok(())
    }

    async fn do_command(&self, _command: Extra) -> Result<Extra, CameraError> {
        Err(CameraError::NotImplemented("do_command"))
    }

    async fn close(&self) -> Result<(), CameraError> {
        *self.state.write() = CameraState::Unconfigured;
        debug!("Camera {} closed", self.name);
        Ok(())
    }
}

#[async_trait]
impl Camera for HeatmapCamera {
    async fn get_image(
        &self,
        mime_type: MimeType,
        _extra: Option<Extra>,
        _timeout: Option<Duration>,
    ) -> Result<CameraImage, CameraError> {
        let path = self.image_path().ok_or_else(|| {
            CameraError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("camera {} has no image_path bound", self.name),
            ))
        })?;

        if !matches!(mime_type, MimeType::Jpeg | MimeType::Unspecified) {
            debug!(
                "Camera {} asked for {}, serving {} instead",
                self.name,
                mime_type,
                MimeType::Jpeg
            );
        }

        render_heatmap(&path)
    }

    async fn get_images(
        &self,
        _timeout: Option<Duration>,
    ) -> Result<(Vec<NamedImage>, ResponseMetadata), CameraError> {
        Err(CameraError::NotImplemented("get_images"))
    }

    async fn get_point_cloud(
        &self,
        _extra: Option<Extra>,
        _timeout: Option<Duration>,
    ) -> Result<(Bytes, MimeType), CameraError> {
        Err(CameraError::NotImplemented("get_point_cloud"))
    }

    async fn get_properties(&self, _timeout: Option<Duration>) -> Result<CameraProperties, CameraError> {
        Err(CameraError::NotImplemented("get_properties"))
    }
}
