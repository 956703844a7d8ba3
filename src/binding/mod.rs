//! Parameter binding subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     Endpoint declares Parameter list (name, type, source, fallback)
//!
//! Per request:
//!     Captures (from routing) + Query + raw body
//!     → binder.rs (resolve + convert each parameter, in order)
//!     → Arguments (typed, taken once by the handler)
//!     or BindingError (first failure, no partial result)
//! ```
//!
//! # Design Decisions
//! - Converters are a fixed, compile-time set (`FromParam` impls)
//! - Bound values are type-erased and checked again when taken
//! - Binding never touches shared state

pub mod arguments;
pub mod binder;
pub mod params;

pub use arguments::{ArgumentError, Arguments};
pub use binder::{bind, BindingError, Query};
pub use params::{ConversionError, FromParam, Parameter};
