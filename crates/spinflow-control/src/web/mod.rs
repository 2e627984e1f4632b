//! Web API: plant-log REST endpoints and the visual-frame WebSocket feed.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{AppState, WebServer, WebServerConfig};
