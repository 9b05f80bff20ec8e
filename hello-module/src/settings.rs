//! Process settings for hello-module
//!
//! Resolved in layers: built-in defaults, then an optional settings file
//! (JSON or TOML), then `HELLO_MODULE_*` environment variables, then CLI
//! flags.

use crate::error::ModuleError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const ENV_PREFIX: &str = "HELLO_MODULE_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ModuleError::Settings(format!("Unknown log format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    /// Address the host bridge listens on
    pub listen_addr: SocketAddr,
    /// `tracing` filter directive, e.g. `info` or `hello_camera=debug`
    pub log_level: String,
    pub log_format: LogFormat,
    /// Pending host requests before callers start waiting
    pub request_buffer: usize,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8085)),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            request_buffer: 64,
        }
    }
}

impl ModuleSettings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModuleError::Settings(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Parse settings text, trying JSON first and then TOML
    pub fn from_str(content: &str) -> Result<Self, ModuleError> {
        if let Ok(settings) = serde_json::from_str::<ModuleSettings>(content) {
            return Ok(settings);
        }
        toml::from_str::<ModuleSettings>(content)
            .map_err(|e| ModuleError::Settings(format!("Unrecognized settings format: {}", e)))
    }

    /// Overlay `HELLO_MODULE_*` variables from the process environment
    pub fn apply_env(&mut self) -> Result<(), ModuleError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ModuleError> {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(addr) = var("LISTEN_ADDR") {
            self.listen_addr = addr
                .parse()
                .map_err(|e| ModuleError::Settings(format!("Invalid {}LISTEN_ADDR '{}': {}", ENV_PREFIX, addr, e)))?;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        if let Some(buffer) = var("REQUEST_BUFFER") {
            self.request_buffer = buffer
                .parse()
                .map_err(|e| ModuleError::Settings(format!("Invalid {}REQUEST_BUFFER '{}': {}", ENV_PREFIX, buffer, e)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.request_buffer == 0 || self.request_buffer > 65_536 {
            return Err(ModuleError::Settings(
                "request_buffer must be between 1 and 65536".to_string(),
            ));
        }
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| ModuleError::Settings(format!("Invalid log_level '{}': {}", self.log_level, e)))?;
        Ok(())
    }
}
