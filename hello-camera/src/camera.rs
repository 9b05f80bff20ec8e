//! Camera API surface

use crate::error::CameraError;
use crate::mime::MimeType;
use crate::resource::{Extra, Resource};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One encoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraImage {
    pub data: Bytes,
    pub mime_type: MimeType,
}

impl CameraImage {
    pub fn new(data: Bytes, mime_type: MimeType) -> Self {
        Self { data, mime_type }
    }
}

/// Frame tagged with the sensor that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImage {
    pub name: String,
    pub image: CameraImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub captured_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraProperties {
    pub supports_pcd: bool,
    pub mime_types: Vec<MimeType>,
}

#[async_trait]
pub trait Camera: Resource {
    /// Single frame; `mime_type` is a preference the camera may ignore
    async fn get_image(
        &self,
        mime_type: MimeType,
        extra: Option<Extra>,
        timeout: Option<Duration>,
    ) -> Result<CameraImage, CameraError>;

    /// Frames from every sensor behind this camera
    async fn get_images(
        &self,
        timeout: Option<Duration>,
    ) -> Result<(Vec<NamedImage>, ResponseMetadata), CameraError>;

    /// Encoded point cloud and its MIME type
    async fn get_point_cloud(
        &self,
        extra: Option<Extra>,
        timeout: Option<Duration>,
    ) -> Result<(Bytes, MimeType), CameraError>;

    async fn get_properties(&self, timeout: Option<Duration>) -> Result<CameraProperties, CameraError>;
}
