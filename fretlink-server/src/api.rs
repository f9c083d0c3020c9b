use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::room::RoomManager;
use crate::signaling::ws_handler;
use crate::token_store::TokenStore;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use fretlink_core::{RoomId, RoomTicket};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub rooms: RoomManager,
    pub tokens: TokenStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            tokens: TokenStore::new(config.token_ttl),
            config: Arc::new(config),
            rooms: RoomManager::new(),
        }
    }
}

pub fn router(state: AppState) -> Result<Router, ServerError> {
    let cors = cors_layer(&state.config.allowed_origins)?;
    let production = state.config.is_production();

    Ok(Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/rooms", post(create_room))
        .route("/ws", get(ws_handler))
        .layer(middleware::from_fn_with_state(production, security_headers))
        .layer(cors)
        .with_state(state))
}

/// Binds `config.host:config.port` and serves until the process ends.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    serve_with_shutdown(listener, config, std::future::pending()).await
}

pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        "Signaling server listening on http://{} ({}, tokens {})",
        listener.local_addr()?,
        config.environment,
        if config.require_tokens { "required" } else { "not required" }
    );

    let app = router(AppState::new(config))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Signaling server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).map_err(|_| ServerError::InvalidOrigin(o.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn security_headers(State(production): State<bool>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    if production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    response
}

async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Fretlink signaling server", "status": "ok" }))
}

async fn health() -> impl IntoResponse {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Json(json!({ "status": "ok", "timestamp": timestamp }))
}

#[derive(Debug, Default, Deserialize)]
struct CreateRoomRequest {
    preferred_room_id: Option<String>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn create_room(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateRoomRequest::default()
    } else {
        match serde_json::from_slice::<CreateRoomRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
            }
        }
    };

    let room_id = match request.preferred_room_id.as_deref().map(RoomId::sanitize) {
        Some(id) if !id.is_empty() => id,
        _ => RoomId::generate().to_string(),
    };
    if room_id.len() < RoomId::MIN_LEN {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Room id must have at least {} letters or digits", RoomId::MIN_LEN),
        );
    }

    if state.rooms.occupancy(&room_id).await.len() >= 2 {
        return error_response(StatusCode::CONFLICT, format!("Room {} is full", room_id));
    }

    let access_token = state.tokens.issue(&room_id);
    info!("Issued access token for room {}", room_id);

    Json(RoomTicket {
        room_id,
        access_token,
        expires_in: state.tokens.ttl().as_secs(),
    })
    .into_response()
}
