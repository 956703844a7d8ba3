//! Endpoint declarations.
//!
//! An endpoint is the registration-time description of one handler: its
//! name, URL template, HTTP verb (explicit or inferred from the name),
//! declared parameters and the callable itself.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::binding::{Arguments, Parameter};
use crate::dispatch::reply::{HandlerError, Reply};

/// Result of invoking a handler body.
pub type HandlerResult = Result<Reply, HandlerError>;

pub(crate) enum Invoker<T> {
    /// Needs an owner instance from the group's factory.
    Instance(Arc<dyn Fn(T, Arguments) -> HandlerResult + Send + Sync>),
    /// Free function; the factory is never called.
    Static(Arc<dyn Fn(Arguments) -> HandlerResult + Send + Sync>),
}

impl<T> Clone for Invoker<T> {
    fn clone(&self) -> Self {
        match self {
            Invoker::Instance(f) => Invoker::Instance(f.clone()),
            Invoker::Static(f) => Invoker::Static(f.clone()),
        }
    }
}

/// One handler and its routing metadata, for owner type `T`.
pub struct Endpoint<T> {
    pub(crate) name: String,
    pub(crate) template: String,
    pub(crate) verb: Option<Method>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) invoker: Option<Invoker<T>>,
}

impl<T> Endpoint<T> {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            verb: None,
            parameters: Vec::new(),
            invoker: None,
        }
    }

    /// Set the HTTP verb instead of inferring it from the name.
    pub fn verb(mut self, verb: Method) -> Self {
        self.verb = Some(verb);
        self
    }

    /// Declare the next parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Handler that receives an owner instance.
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(T, Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.invoker = Some(Invoker::Instance(Arc::new(f)));
        self
    }

    /// Handler that needs no owner instance.
    pub fn static_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        self.invoker = Some(Invoker::Static(Arc::new(f)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Explicit verb, or the one inferred from the endpoint name.
    pub fn method(&self) -> Method {
        self.verb.clone().unwrap_or_else(|| infer_method(&self.name))
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("method", &self.method())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Infer an HTTP verb from a handler name.
///
/// `Create*`, `Add*`, `Insert*` → POST; `Update*` → PUT; `Patch*` → PATCH;
/// `Remove*`, `Delete*` → DELETE; anything else → GET.
pub fn infer_method(name: &str) -> Method {
    let starts = |prefix: &str| {
        name.get(..prefix.len())
            .map(|head| head.eq_ignore_ascii_case(prefix))
            .unwrap_or(false)
    };

    if starts("create") || starts("add") || starts("insert") {
        Method::POST
    } else if starts("update") {
        Method::PUT
    } else if starts("patch") {
        Method::PATCH
    } else if starts("remove") || starts("delete") {
        Method::DELETE
    } else {
        Method::GET
    }
}
