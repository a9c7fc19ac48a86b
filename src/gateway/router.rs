//! Gateway router configuration.

use axum::{
    routing::{any, delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::events::ws_events_handler;
use super::handlers::{
    api_info, create_session, execute_command, fs_list, fs_read, fs_write, health, kill_session,
    list_sessions, open_file_dialog, open_folder_dialog, resize_session, save_as_dialog,
    save_file_dialog, write_session, AppState,
};
use crate::backend::ProcessBackend;

/// Create the gateway router with a freshly detected backend.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new(ProcessBackend::detect(false), None))
}

/// Create the gateway router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/{id}", delete(kill_session))
        .route("/{id}/input", post(write_session))
        .route("/{id}/resize", post(resize_session));

    let fs_routes = Router::new()
        .route("/read", post(fs_read))
        .route("/write", post(fs_write))
        .route("/list", post(fs_list));

    let dialog_routes = Router::new()
        .route("/open-file", post(open_file_dialog))
        .route("/open-folder", post(open_folder_dialog))
        .route("/save-file", post(save_file_dialog))
        .route("/save-as", post(save_as_dialog));

    let api_v1 = Router::new()
        .route("/", get(api_info))
        .route("/execute", post(execute_command))
        .route("/events", any(ws_events_handler))
        .nest("/sessions", session_routes)
        .nest("/fs", fs_routes)
        .nest("/dialogs", dialog_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3710,
        }
    }
}

/// Start the gateway server with custom state.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("codeshell gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::HostError::Io)?;

    axum::serve(listener, router)
        .await
        .map_err(|e| crate::error::HostError::Io(std::io::Error::other(e.to_string())))?;

    Ok(())
}
