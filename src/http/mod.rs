//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request ID, trace, timeout, body limit)
//!     → explicit routes (/health)
//!     → dispatch_handler (fallback)
//!         → Router::route (method + decoded path)
//!         → buffer body, build RequestContext
//!         → MatchedRoute::dispatch
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
