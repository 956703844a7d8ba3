//! Request dispatch.
//!
//! # Responsibilities
//! - Register raw routes and route groups into one priority table
//! - Freeze the table into a cheaply clonable [`Router`]
//! - For a matched route: bind, resolve the owner, invoke, normalize, encode
//! - Turn binding failures into client-error responses
//!
//! # Design Decisions
//! - Binding errors never escape: they become a 4xx response or go through the
//!   group's error callback
//! - Handler failures are not caught: they surface as [`DispatchError`] for the
//!   outer boundary to report
//! - No timeout or cancellation here; a handler that never completes stalls
//!   only its own request

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::json;
use thiserror::Error;

use crate::binding::{bind, BindingError, Parameter};
use crate::config::DispatchConfig;
use crate::dispatch::context::RequestContext;
use crate::dispatch::encoding::SerializerSettings;
use crate::dispatch::endpoint::Invoker;
use crate::dispatch::group::{ErrorHandler, InstanceFactory, RouteGroup};
use crate::dispatch::reply::{DispatchError, HandlerError, Response};
use crate::observability::metrics;
use crate::routing::{compile, join_prefix, Captures, RouteError, RouteId, RouteTable};

/// Type-erased handler stored in the route table.
pub type RouteHandler =
    Arc<dyn Fn(RequestContext, Captures) -> BoxFuture<'static, Result<Response, DispatchError>> + Send + Sync>;

/// Errors raised while building a router.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("endpoint '{0}' has no handler")]
    MissingHandler(String),

    #[error("cannot register '{name}': {source}")]
    Route {
        name: String,
        #[source]
        source: RouteError,
    },
}

/// Collects routes before serving starts.
pub struct RouterBuilder {
    table: RouteTable<RouteHandler>,
    settings: DispatchConfig,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl RouterBuilder {
    pub fn new(settings: DispatchConfig) -> Self {
        Self {
            table: RouteTable::new(),
            settings,
        }
    }

    /// Register a raw handler that builds its own response.
    pub fn register<F, Fut>(&mut self, method: &str, template: &str, handler: F) -> Result<RouteId, RegistrationError>
    where
        F: Fn(RequestContext, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        let label = format!("{} {}", method.to_ascii_uppercase(), template.trim_matches('/'));
        let handler = Arc::new(handler);
        let erased: RouteHandler = {
            let label = label.clone();
            Arc::new(move |ctx: RequestContext, captures: Captures| {
                let route = label.clone();
                handler(ctx, captures)
                    .map(move |result| result.map_err(|source| DispatchError::Handler { route, source }))
                    .boxed()
            })
        };

        self.table
            .register(method, template, erased)
            .map_err(|source| RegistrationError::Route { name: label, source })
    }

    pub fn get<F, Fut>(&mut self, template: &str, handler: F) -> Result<RouteId, RegistrationError>
    where
        F: Fn(RequestContext, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.register(Method::GET.as_str(), template, handler)
    }

    pub fn post<F, Fut>(&mut self, template: &str, handler: F) -> Result<RouteId, RegistrationError>
    where
        F: Fn(RequestContext, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.register(Method::POST.as_str(), template, handler)
    }

    pub fn put<F, Fut>(&mut self, template: &str, handler: F) -> Result<RouteId, RegistrationError>
    where
        F: Fn(RequestContext, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.register(Method::PUT.as_str(), template, handler)
    }

    pub fn patch<F, Fut>(&mut self, template: &str, handler: F) -> Result<RouteId, RegistrationError>
    where
        F: Fn(RequestContext, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.register(Method::PATCH.as_str(), template, handler)
    }

    pub fn delete<F, Fut>(&mut self, template: &str, handler: F) -> Result<RouteId, RegistrationError>
    where
        F: Fn(RequestContext, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        self.register(Method::DELETE.as_str(), template, handler)
    }

    /// Register every endpoint of `group`.
    ///
    /// All templates are validated first, so a bad endpoint registers nothing.
    pub fn mount<T: 'static>(&mut self, group: RouteGroup<T>) -> Result<Vec<RouteId>, RegistrationError> {
        for endpoint in &group.endpoints {
            if endpoint.invoker.is_none() {
                return Err(RegistrationError::MissingHandler(endpoint.name.clone()));
            }
            compile(&join_prefix(&group.prefix, &endpoint.template)).map_err(|source| {
                RegistrationError::Route {
                    name: endpoint.name.clone(),
                    source: source.into(),
                }
            })?;
        }

        let serializer = group
            .serializer
            .clone()
            .unwrap_or_else(|| self.settings.serializer.clone());
        let binding_error_status = self.settings.error_status();

        let mut ids = Vec::with_capacity(group.endpoints.len());
        for endpoint in group.endpoints {
            let method = endpoint.method();
            let template = join_prefix(&group.prefix, &endpoint.template);
            let invoker = match endpoint.invoker {
                Some(invoker) => invoker,
                None => return Err(RegistrationError::MissingHandler(endpoint.name)),
            };

            let runtime = Arc::new(EndpointRuntime {
                route: format!("{} {}", method, template.trim_matches('/')),
                name: endpoint.name.clone(),
                parameters: endpoint.parameters,
                invoker,
                factory: group.factory.clone(),
                error_handler: group.error_handler.clone(),
                serializer: serializer.clone(),
                error_serializer: self.settings.serializer.clone(),
                binding_error_status,
            });
            let handler: RouteHandler = Arc::new(move |ctx: RequestContext, captures: Captures| {
                let runtime = runtime.clone();
                async move { runtime.handle(ctx, captures).await }.boxed()
            });

            let id = self
                .table
                .register(method.as_str(), &template, handler)
                .map_err(|source| RegistrationError::Route {
                    name: endpoint.name,
                    source,
                })?;
            ids.push(id);
        }

        tracing::info!(
            prefix = %group.prefix,
            routes = ids.len(),
            "Route group mounted"
        );
        Ok(ids)
    }

    /// Freeze the table.
    pub fn build(self) -> Router {
        Router {
            table: Arc::new(self.table),
        }
    }
}

/// Frozen route table plus dispatch.
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable<RouteHandler>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Select the route for a request, if any.
    pub fn route(&self, method: &str, path: &str) -> Option<MatchedRoute> {
        match self.table.lookup(method, path) {
            Some(found) => {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    route = %found.route.template(),
                    captures = ?found.captures.iter().collect::<Vec<_>>(),
                    "Route matched"
                );
                Some(MatchedRoute {
                    method: found.route.method().to_string(),
                    template: found.route.template().to_string(),
                    handler: found.route.handler().clone(),
                    captures: found.captures,
                })
            }
            None => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                metrics::record_not_found(method);
                None
            }
        }
    }

    /// Route and dispatch in one step. `Ok(None)` means no route matched.
    pub async fn dispatch(&self, ctx: RequestContext) -> Result<Option<Response>, DispatchError> {
        match self.route(ctx.method().as_str(), ctx.path()) {
            Some(matched) => matched.dispatch(ctx).await.map(Some),
            None => Ok(None),
        }
    }

    /// `METHOD template` for every route, in lookup order.
    pub fn describe(&self) -> Vec<String> {
        self.table
            .routes()
            .map(|route| format!("{} {}", route.method(), route.template()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.describe()).finish()
    }
}

/// A selected route, ready to run against the full request.
pub struct MatchedRoute {
    method: String,
    template: String,
    handler: RouteHandler,
    captures: Captures,
}

impl MatchedRoute {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub async fn dispatch(self, ctx: RequestContext) -> Result<Response, DispatchError> {
        let start = Instant::now();
        let result = (self.handler)(ctx, self.captures).await;
        let status = match &result {
            Ok(response) => response.status(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        metrics::record_request(&self.method, &self.template, status.as_u16(), start);
        result
    }
}

/// Everything one endpoint needs at request time.
struct EndpointRuntime<T> {
    route: String,
    name: String,
    parameters: Vec<Parameter>,
    invoker: Invoker<T>,
    factory: InstanceFactory<T>,
    error_handler: Option<ErrorHandler>,
    serializer: SerializerSettings,
    /// Router-wide settings; error-callback payloads ignore the group override.
    error_serializer: SerializerSettings,
    binding_error_status: StatusCode,
}

impl<T> EndpointRuntime<T> {
    async fn handle(&self, ctx: RequestContext, captures: Captures) -> Result<Response, DispatchError> {
        let args = match bind(&self.parameters, &captures, ctx.query(), ctx.body()) {
            Ok(args) => args,
            Err(error) => return self.binding_failed(&ctx, &error),
        };

        let invoked = match &self.invoker {
            Invoker::Instance(handler) => {
                let owner = (self.factory)(&ctx);
                handler(owner, args)
            }
            Invoker::Static(handler) => handler(args),
        };

        let payload = match invoked {
            Ok(reply) => reply.resolve().await,
            Err(source) => Err(source),
        }
        .map_err(|source| DispatchError::Handler {
            route: self.route.clone(),
            source,
        })?;

        match payload {
            Some(value) => Ok(Response::json(StatusCode::OK, self.encode(&self.serializer, value)?)),
            None => Ok(Response::empty()),
        }
    }

    fn binding_failed(&self, ctx: &RequestContext, error: &BindingError) -> Result<Response, DispatchError> {
        tracing::warn!(
            route = %self.route,
            endpoint = %self.name,
            parameter = %error.parameter(),
            error = %error,
            "Parameter binding failed"
        );
        metrics::record_binding_failure(&self.route, error.parameter(), error.kind());

        match &self.error_handler {
            Some(on_error) => match on_error(ctx, error) {
                Some(payload) if !payload.is_null() => {
                    Ok(Response::json(StatusCode::OK, self.encode(&self.error_serializer, payload)?))
                }
                _ => Ok(Response::empty()),
            },
            None => {
                let body = self.encode(&self.error_serializer, json!({ "error": error.to_string() }))?;
                Ok(Response::json(self.binding_error_status, body))
            }
        }
    }

    fn encode(
        &self,
        settings: &SerializerSettings,
        value: serde_json::Value,
    ) -> Result<axum::body::Bytes, DispatchError> {
        settings.encode(value).map_err(|source| DispatchError::Encode {
            route: self.route.clone(),
            source,
        })
    }
}
