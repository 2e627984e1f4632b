//! Axum HTTP server

use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use spinflow_core::VisualFrame;

use crate::plants::PlantStore;
use crate::{error::ControlError, Result};

use super::routes::build_router;
use super::websocket::ws_handler;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Watering-log store.
    pub store: PlantStore,
    /// Visual-frame feed consumed by WebSocket clients.
    pub frames: broadcast::Sender<VisualFrame>,
}

/// Web server configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WebServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            // Bind to localhost to prevent accidental network exposure
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl WebServerConfig {
    /// Create a new web server config
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Set the host address
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Set CORS enabled/disabled
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Set allowed origins for CORS
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}

/// Web server for the plant-log REST API and the visual-frame WebSocket
pub struct WebServer {
    config: WebServerConfig,
    state: AppState,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Run the web server until it fails or the task is cancelled
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| ControlError::Http(format!("Invalid address: {e}")))?;

        let app = build_router()
            .route("/ws", axum::routing::get(ws_handler))
            .with_state(self.state);

        let app = if self.config.enable_cors {
            let cors_layer = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]);

            // "*" or an empty list means permissive; otherwise parse the
            // configured origins. The branches produce different concrete
            // layer types, hence the duplication.
            if self.config.allowed_origins.contains(&"*".to_string())
                || self.config.allowed_origins.is_empty()
            {
                app.layer(cors_layer.allow_origin(Any))
            } else {
                let origins: Result<Vec<HeaderValue>> = self
                    .config
                    .allowed_origins
                    .iter()
                    .map(|origin| {
                        origin.parse::<HeaderValue>().map_err(|e| {
                            ControlError::Http(format!("Invalid origin header: {e}"))
                        })
                    })
                    .collect();

                app.layer(cors_layer.allow_origin(origins?))
            }
        } else {
            app
        };

        tracing::info!("web server listening on {addr}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ControlError::Http(format!("Failed to bind: {e}")))?;

        axum::serve(listener, app.into_make_service())
            .await
            .map_err(|e| ControlError::Http(format!("Server error: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_server_config_builder() {
        let config = WebServerConfig::new(9090)
            .with_host("0.0.0.0".to_string())
            .with_cors(false)
            .with_allowed_origins(vec!["http://localhost:3000".to_string()]);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert!(!config.enable_cors);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000".to_string()]
        );
    }

    #[test]
    fn test_default_binds_localhost_with_permissive_cors() {
        let config = WebServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.enable_cors);
        assert!(config.allowed_origins.contains(&"*".to_string()));
    }
}
