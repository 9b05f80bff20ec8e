//! hello-module: process that hosts the heatmap camera
//!
//! Registers the camera model, runs the request loop that serves host
//! lifecycle and camera calls, and exposes that loop over a local HTTP
//! bridge.

pub mod error;
pub mod http;
pub mod module;
pub mod registry;
pub mod settings;

pub use error::ModuleError;
pub use module::{HostRequest, HostResponse, Module, ModuleHandle};
pub use registry::{default_registry, ModelRegistry, Registration};
pub use settings::{LogFormat, ModuleSettings};
