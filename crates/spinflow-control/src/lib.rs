//! SpinFlow Control - External Surfaces
//!
//! This crate provides SpinFlow's outward-facing plumbing:
//! - **Plant store**: Postgres-backed watering log
//! - **Web API**: the two plant-log endpoints over axum
//! - **WebSocket**: real-time visual-frame feed for rendering clients
//!
//! ## Modules
//!
//! - [`plants`] - watering-log store and schedule math
//! - [`web`] - axum server, routes, and the WebSocket feed
//! - [`error`] - error types

#![allow(missing_docs)]

/// Error types
pub mod error;
/// Watering-log store
pub mod plants;
/// Web API server
pub mod web;

pub use error::{ControlError, Result};
pub use plants::{days_until_next_watering, PlantRecord, PlantStatus, PlantStore};
pub use web::{AppState, WebServer, WebServerConfig};
