//! hello-camera: heatmap camera component
//!
//! A camera resource that serves a static image from disk, re-rendered on
//! every request as a jet-colormapped heatmap and encoded as JPEG.
//!
//! The host framework constructs the component from a [`ComponentConfig`],
//! reconfigures it whenever the machine config changes, and calls
//! [`Camera::get_image`] on demand.

pub mod camera;
pub mod colormap;
pub mod config;
pub mod error;
pub mod heatmap;
pub mod heatmap_camera;
pub mod mime;
pub mod model;
pub mod resource;

pub use camera::{Camera, CameraImage, CameraProperties, NamedImage, ResponseMetadata};
pub use config::{ComponentConfig, HeatmapCameraConfig};
pub use error::CameraError;
pub use heatmap_camera::{CameraState, HeatmapCamera};
pub use mime::MimeType;
pub use model::{Model, ModelFamily, CAMERA_API, HEATMAP_CAMERA_MODEL};
pub use resource::{Dependencies, Extra, Resource};
