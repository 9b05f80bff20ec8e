//! Host-managed resource lifecycle

use crate::config::ComponentConfig;
use crate::error::CameraError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Free-form per-call options forwarded by the host
pub type Extra = Map<String, Value>;

/// Resources this one depends on, keyed by resource name
pub type Dependencies = HashMap<String, Arc<dyn Resource>>;

/// Anything the host can construct, reconfigure and tear down
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource name as given in the machine config
    fn name(&self) -> &str;

    /// Apply a new configuration, replacing the previous one
    fn reconfigure(&self, config: &ComponentConfig, dependencies: &Dependencies) -> Result<(), CameraError>;

    /// Model-specific escape hatch
    async fn do_command(&self, _command: Extra) -> Result<Extra, CameraError> {
        Err(CameraError::NotImplemented("do_command"))
    }

    /// Release anything held by the resource
    async fn close(&self) -> Result<(), CameraError> {
        Ok(())
    }
}
