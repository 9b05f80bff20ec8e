//! Module request loop
//!
//! The host talks to the module through [`HostRequest`]s. [`Module::run`]
//! pulls them off a bounded channel and serves each one on its own task, so
//! a slow `get_image` never holds up a reconfigure or a second reader.

use crate::error::ModuleError;
use crate::registry::ModelRegistry;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hello_camera::{
    Camera, CameraImage, CameraProperties, ComponentConfig, Dependencies, Extra, MimeType, Model,
    NamedImage, ResponseMetadata,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Calls the host can make into the module
#[derive(Debug, Clone)]
pub enum HostRequest {
    Ready,
    ValidateConfig(ComponentConfig),
    AddResource(ComponentConfig),
    ReconfigureResource(ComponentConfig),
    RemoveResource {
        name: String,
    },
    GetImage {
        name: String,
        mime_type: MimeType,
        extra: Option<Extra>,
        timeout: Option<Duration>,
    },
    GetImages {
        name: String,
        timeout: Option<Duration>,
    },
    GetPointCloud {
        name: String,
        extra: Option<Extra>,
        timeout: Option<Duration>,
    },
    GetProperties {
        name: String,
        timeout: Option<Duration>,
    },
    DoCommand {
        name: String,
        command: Extra,
    },
}

impl HostRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            HostRequest::Ready => "ready",
            HostRequest::ValidateConfig(_) => "validate_config",
            HostRequest::AddResource(_) => "add_resource",
            HostRequest::ReconfigureResource(_) => "reconfigure_resource",
            HostRequest::RemoveResource { .. } => "remove_resource",
            HostRequest::GetImage { .. } => "get_image",
            HostRequest::GetImages { .. } => "get_images",
            HostRequest::GetPointCloud { .. } => "get_point_cloud",
            HostRequest::GetProperties { .. } => "get_properties",
            HostRequest::DoCommand { .. } => "do_command",
        }
    }
}

#[derive(Debug, Clone)]
pub enum HostResponse {
    Ready { models: Vec<(String, Model)> },
    Validated { implicit_dependencies: Vec<String> },
    Ack,
    Image(CameraImage),
    Images(Vec<NamedImage>, ResponseMetadata),
    PointCloud(bytes::Bytes, MimeType),
    Properties(CameraProperties),
    Command(Extra),
}

impl HostResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            HostResponse::Ready { .. } => "ready",
            HostResponse::Validated { .. } => "validated",
            HostResponse::Ack => "ack",
            HostResponse::Image(_) => "image",
            HostResponse::Images(..) => "images",
            HostResponse::PointCloud(..) => "point_cloud",
            HostResponse::Properties(_) => "properties",
            HostResponse::Command(_) => "command",
        }
    }
}

type Reply = oneshot::Sender<Result<HostResponse, ModuleError>>;

struct Envelope {
    request: HostRequest,
    reply: Reply,
}

struct ResourceEntry {
    model: Model,
    resource: Arc<dyn Camera>,
}

/// Registered models plus the resources the host has created from them
pub struct Module {
    registry: ModelRegistry,
    resources: DashMap<String, ResourceEntry>,
}

impl Module {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            resources: DashMap::new(),
        }
    }

    /// (api, model) pairs this module serves
    pub fn models(&self) -> Vec<(String, Model)> {
        self.registry.models()
    }

    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn camera(&self, name: &str) -> Result<Arc<dyn Camera>, ModuleError> {
        self.resources
            .get(name)
            .map(|entry| entry.resource.clone())
            .ok_or_else(|| ModuleError::UnknownResource(name.to_string()))
    }

    /// Serve one request
    pub async fn handle(&self, request: HostRequest) -> Result<HostResponse, ModuleError> {
        match request {
            HostRequest::Ready => Ok(HostResponse::Ready {
                models: self.registry.models(),
            }),
            HostRequest::ValidateConfig(config) => {
                let implicit_dependencies = self.registry.validate(&config)?;
                Ok(HostResponse::Validated { implicit_dependencies })
            }
            HostRequest::AddResource(config) => {
                self.add_resource(config)?;
                Ok(HostResponse::Ack)
            }
            HostRequest::ReconfigureResource(config) => {
                self.reconfigure_resource(config).await?;
                Ok(HostResponse::Ack)
            }
            HostRequest::RemoveResource { name } => {
                let (_, entry) = self
                    .resources
                    .remove(&name)
                    .ok_or_else(|| ModuleError::UnknownResource(name.clone()))?;
                entry.resource.close().await?;
                info!("Removed resource {}", name);
                Ok(HostResponse::Ack)
            }
            HostRequest::GetImage {
                name,
                mime_type,
                extra,
                timeout,
            } => {
                let image = self.camera(&name)?.get_image(mime_type, extra, timeout).await?;
                Ok(HostResponse::Image(image))
            }
            HostRequest::GetImages { name, timeout } => {
                let (images, metadata) = self.camera(&name)?.get_images(timeout).await?;
                Ok(HostResponse::Images(images, metadata))
            }
            HostRequest::GetPointCloud { name, extra, timeout } => {
                let (data, mime_type) = self.camera(&name)?.get_point_cloud(extra, timeout).await?;
                Ok(HostResponse::PointCloud(data, mime_type))
            }
            HostRequest::GetProperties { name, timeout } => {
                let properties = self.camera(&name)?.get_properties(timeout).await?;
                Ok(HostResponse::Properties(properties))
            }
            HostRequest::DoCommand { name, command } => {
                let result = self.camera(&name)?.do_command(command).await?;
                Ok(HostResponse::Command(result))
            }
        }
    }

    fn add_resource(&self, config: ComponentConfig) -> Result<(), ModuleError> {
        match self.resources.entry(config.name.clone()) {
            Entry::Occupied(_) => Err(ModuleError::DuplicateResource(config.name)),
            Entry::Vacant(slot) => {
                let (model, resource) = self.registry.construct(&config, &Dependencies::new())?;
                info!("Added resource {} ({})", config.name, model);
                slot.insert(ResourceEntry { model, resource });
                Ok(())
            }
        }
    }

    async fn reconfigure_resource(&self, config: ComponentConfig) -> Result<(), ModuleError> {
        let (model, _) = self.registry.lookup(&config)?;
        let (current_model, resource) = {
            let entry = self
                .resources
                .get(&config.name)
                .ok_or_else(|| ModuleError::UnknownResource(config.name.clone()))?;
            (entry.model.clone(), entry.resource.clone())
        };

        if current_model == model {
            self.registry.validate(&config)?;
            resource.reconfigure(&config, &Dependencies::new())?;
            return Ok(());
        }

        // Model changed: build the replacement first, then swap it in only if
        // the entry still holds the resource we started from
        let (model, replacement) = self.registry.construct(&config, &Dependencies::new())?;
        let swapped = match self.resources.get_mut(&config.name) {
            Some(mut entry) if Arc::ptr_eq(&entry.resource, &resource) => {
                *entry = ResourceEntry {
                    model: model.clone(),
                    resource: replacement.clone(),
                };
                true
            }
            _ => false,
        };

        if !swapped {
            if let Err(e) = replacement.close().await {
                warn!("Failed to close discarded replacement for {}: {}", config.name, e);
            }
            return Err(ModuleError::UnknownResource(config.name));
        }

        info!(
            "Resource {} switched model {} -> {}",
            config.name, current_model, model
        );
        resource.close().await?;
        Ok(())
    }

    /// Close every live resource
    pub async fn close_all(&self) {
        let names = self.resource_names();
        for name in names {
            if let Some((_, entry)) = self.resources.remove(&name) {
                if let Err(e) = entry.resource.close().await {
                    warn!("Failed to close resource {}: {}", name, e);
                }
            }
        }
    }

    /// Serve requests until every [`ModuleHandle`] is dropped
    async fn run(self: Arc<Self>, mut requests: mpsc::Receiver<Envelope>) {
        info!("Module request loop started");
        while let Some(Envelope { request, reply }) = requests.recv().await {
            let module = self.clone();
            tokio::spawn(async move {
                let operation = request.operation();
                let result = module.handle(request).await;
                match &result {
                    Ok(_) => debug!("{} ok", operation),
                    Err(e) => warn!("{} failed: {}", operation, e),
                }
                if reply.send(result).is_err() {
                    debug!("Caller dropped before {} finished", operation);
                }
            });
        }
        info!("Module request loop stopped");
    }

    /// Spawn the request loop and return a handle for submitting requests
    pub fn start(self: Arc<Self>, buffer: usize) -> (ModuleHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(self.run(receiver));
        (ModuleHandle { sender }, task)
    }
}

/// Cloneable client side of the request loop
#[derive(Clone)]
pub struct ModuleHandle {
    sender: mpsc::Sender<Envelope>,
}

impl ModuleHandle {
    pub async fn call(&self, request: HostRequest) -> Result<HostResponse, ModuleError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Envelope { request, reply })
            .await
            .map_err(|_| ModuleError::ChannelClosed)?;
        response.await.map_err(|_| ModuleError::ChannelClosed)?
    }

    pub async fn validate_config(&self, config: ComponentConfig) -> Result<Vec<String>, ModuleError> {
        match self.call(HostRequest::ValidateConfig(config)).await? {
            HostResponse::Validated { implicit_dependencies } => Ok(implicit_dependencies),
            other => Err(ModuleError::UnexpectedResponse(other.kind())),
        }
    }

    pub async fn get_image(&self, name: impl Into<String>, mime_type: MimeType) -> Result<CameraImage, ModuleError> {
        let request = HostRequest::GetImage {
            name: name.into(),
            mime_type,
            extra: None,
            timeout: None,
        };
        match self.call(request).await? {
            HostResponse::Image(image) => Ok(image),
            other => Err(ModuleError::UnexpectedResponse(other.kind())),
        }
    }

    /// Run a request whose only success value is an acknowledgement
    pub async fn ack(&self, request: HostRequest) -> Result<(), ModuleError> {
        match self.call(request).await? {
            HostResponse::Ack => Ok(()),
            other => Err(ModuleError::UnexpectedResponse(other.kind())),
        }
    }
}
