//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     RouteGroup (prefix, factory, error handler, serializer, endpoints)
//!     → dispatcher.rs (validate every template, then insert into RouteTable)
//!     → Router (frozen, shared via Arc)
//!
//! Per request:
//!     RequestContext (method, decoded path, query, headers, body)
//!     → Router::route (priority lookup)
//!     → binding::bind (typed Arguments or BindingError)
//!     → group factory (instance-bound handlers only)
//!     → handler → Reply (empty, value, eventual)
//!     → encoding.rs (serializer settings)
//!     → Response (status + optional JSON body)
//! ```
//!
//! # Design Decisions
//! - Binding failures become responses; handler failures become `DispatchError`
//! - Handlers see only bound arguments, never raw captures
//! - Verb comes from the endpoint, or is inferred from its name

pub mod context;
pub mod dispatcher;
pub mod encoding;
pub mod endpoint;
pub mod group;
pub mod reply;

pub use context::{decode_path, RequestContext};
pub use dispatcher::{MatchedRoute, RegistrationError, RouteHandler, Router, RouterBuilder};
pub use encoding::{KeyCase, SerializerSettings};
pub use endpoint::{infer_method, Endpoint, HandlerResult};
pub use group::{ErrorHandler, InstanceFactory, RouteGroup};
pub use reply::{DispatchError, HandlerError, Reply, Response};
