//! Priority-ordered HTTP request routing.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum + tower-http layers)
//!                          │
//!                          ▼
//!                     dispatch::Router ──▶ routing (priority table, matcher)
//!                          │
//!                          ▼
//!                     binding (captures/query/body → typed Arguments)
//!                          │
//!                          ▼
//!                     handler ──▶ Reply ──▶ encoding ──▶ Response
//!
//!     Cross-cutting: config, observability (tracing + metrics), lifecycle
//! ```

// Core subsystems
pub mod binding;
pub mod dispatch;
pub mod routing;

// Boundary
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use binding::{Arguments, BindingError, Parameter};
pub use config::RouterConfig;
pub use dispatch::{Endpoint, Reply, Response, RouteGroup, Router, RouterBuilder};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
