//! Local HTTP bridge into the module request loop
//!
//! Each route translates to one [`HostRequest`]; responses and errors are
//! mapped back onto HTTP status codes.

use crate::error::ModuleError;
use crate::module::{HostRequest, HostResponse, ModuleHandle};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use hello_camera::{CameraError, ComponentConfig, Extra, MimeType};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct BridgeState {
    module: ModuleHandle,
}

/// Error wrapper that renders as a JSON body with a matching status code
pub struct ApiError(pub ModuleError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ModuleError::UnknownModel(_) | ModuleError::ApiMismatch { .. } => StatusCode::BAD_REQUEST,
            ModuleError::UnknownResource(_) => StatusCode::NOT_FOUND,
            ModuleError::DuplicateResource(_) | ModuleError::DuplicateModel(_) => StatusCode::CONFLICT,
            ModuleError::ChannelClosed => StatusCode::SERVICE_UNAVAILABLE,
            ModuleError::UnexpectedResponse(_) | ModuleError::Settings(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ModuleError::Camera(err) => match err {
                CameraError::Config(_) => StatusCode::BAD_REQUEST,
                CameraError::Format(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CameraError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
                CameraError::Io(_) | CameraError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<ModuleError> for ApiError {
    fn from(err: ModuleError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ImageQuery {
    #[serde(default)]
    mime_type: Option<String>,
    /// Accepted for parity with the host API; the camera ignores it
    #[serde(default)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TimeoutQuery {
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Map a body that is not a valid config record onto a configuration error
fn config_body(body: Result<Json<ComponentConfig>, JsonRejection>) -> Result<ComponentConfig, ApiError> {
    body.map(|Json(config)| config)
        .map_err(|rejection| ApiError(CameraError::Config(rejection.body_text()).into()))
}

fn timeout(ms: Option<u64>) -> Option<Duration> {
    ms.map(Duration::from_millis)
}

/// Build the bridge router around a running module
pub fn create_router(module: ModuleHandle) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/config/validate", post(validate_config))
        .route("/v1/resources", post(add_resource))
        .route("/v1/resources/:name", put(reconfigure_resource).delete(remove_resource))
        .route("/v1/resources/:name/do_command", post(do_command))
        .route("/v1/cameras/:name/image", get(get_image))
        .route("/v1/cameras/:name/images", get(get_images))
        .route("/v1/cameras/:name/point_cloud", get(get_point_cloud))
        .route("/v1/cameras/:name/properties", get(get_properties))
        .layer(TraceLayer::new_for_http())
        .with_state(BridgeState { module })
}

async fn health(State(state): State<BridgeState>) -> Result<Json<serde_json::Value>, ApiError> {
    match state.module.call(HostRequest::Ready).await? {
        HostResponse::Ready { models } => {
            let models: Vec<_> = models
                .into_iter()
                .map(|(api, model)| json!({"api": api, "model": model.to_string()}))
                .collect();
            Ok(Json(json!({"status": "ok", "models": models})))
        }
        other => Err(ModuleError::UnexpectedResponse(other.kind()).into()),
    }
}

async fn validate_config(
    State(state): State<BridgeState>,
    body: Result<Json<ComponentConfig>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let config = config_body(body)?;
    let implicit_dependencies = state.module.validate_config(config).await?;
    Ok(Json(json!({ "implicit_dependencies": implicit_dependencies })))
}

async fn add_resource(
    State(state): State<BridgeState>,
    body: Result<Json<ComponentConfig>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let config = config_body(body)?;
    let name = config.name.clone();
    state.module.ack(HostRequest::AddResource(config)).await?;
    Ok((StatusCode::CREATED, Json(json!({ "name": name }))))
}

async fn reconfigure_resource(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
    body: Result<Json<ComponentConfig>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut config = config_body(body)?;
    // The path names the resource; the body's name is advisory
    config.name = name.clone();
    state.module.ack(HostRequest::ReconfigureResource(config)).await?;
    Ok(Json(json!({ "name": name })))
}

async fn remove_resource(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.module.ack(HostRequest::RemoveResource { name }).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn do_command(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
    Json(command): Json<Extra>,
) -> Result<Json<Extra>, ApiError> {
    match state.module.call(HostRequest::DoCommand { name, command }).await? {
        HostResponse::Command(result) => Ok(Json(result)),
        other => Err(ModuleError::UnexpectedResponse(other.kind()).into()),
    }
}

async fn get_image(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let request = HostRequest::GetImage {
        name,
        mime_type: MimeType::parse(query.mime_type.as_deref().unwrap_or_default()),
        extra: None,
        timeout: timeout(query.timeout_ms),
    };
    match state.module.call(request).await? {
        HostResponse::Image(image) => {
            Ok(([(header::CONTENT_TYPE, image.mime_type.to_string())], image.data).into_response())
        }
        other => Err(ModuleError::UnexpectedResponse(other.kind()).into()),
    }
}

async fn get_images(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
    Query(query): Query<TimeoutQuery>,
) -> Result<Response, ApiError> {
    let request = HostRequest::GetImages {
        name,
        timeout: timeout(query.timeout_ms),
    };
    match state.module.call(request).await? {
        HostResponse::Images(images, _) => {
            let names: Vec<_> = images.into_iter().map(|i| i.name).collect();
            Ok(Json(json!({ "images": names })).into_response())
        }
        other => Err(ModuleError::UnexpectedResponse(other.kind()).into()),
    }
}

async fn get_point_cloud(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
    Query(query): Query<TimeoutQuery>,
) -> Result<Response, ApiError> {
    let request = HostRequest::GetPointCloud {
        name,
        extra: None,
        timeout: timeout(query.timeout_ms),
    };
    match state.module.call(request).await? {
        HostResponse::PointCloud(data, mime_type) => {
            Ok(([(header::CONTENT_TYPE, mime_type.to_string())], data).into_response())
        }
        other => Err(ModuleError::UnexpectedResponse(other.kind()).into()),
    }
}

async fn get_properties(
    State(state): State<BridgeState>,
    Path(name): Path<String>,
    Query(query): Query<TimeoutQuery>,
) -> Result<Response, ApiError> {
    let request = HostRequest::GetProperties {
        name,
        timeout: timeout(query.timeout_ms),
    };
    match state.module.call(request).await? {
        HostResponse::Properties(properties) => Ok(Json(properties).into_response()),
        other => Err(ModuleError::UnexpectedResponse(other.kind()).into()),
    }
}
