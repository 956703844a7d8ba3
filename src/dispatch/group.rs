//! Route groups: endpoints that share an owner type and its hooks.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::BindingError;
use crate::dispatch::context::RequestContext;
use crate::dispatch::encoding::SerializerSettings;
use crate::dispatch::endpoint::Endpoint;

/// Produces the handler owner for one request.
pub type InstanceFactory<T> = Arc<dyn Fn(&RequestContext) -> T + Send + Sync>;

/// Turns a binding failure into a response payload; `None` sends no body.
pub type ErrorHandler = Arc<dyn Fn(&RequestContext, &BindingError) -> Option<Value> + Send + Sync>;

/// A set of endpoints mounted together under an optional prefix.
pub struct RouteGroup<T> {
    pub(crate) prefix: String,
    pub(crate) factory: InstanceFactory<T>,
    pub(crate) error_handler: Option<ErrorHandler>,
    pub(crate) serializer: Option<SerializerSettings>,
    pub(crate) endpoints: Vec<Endpoint<T>>,
}

impl<T: Send + 'static> RouteGroup<T> {
    /// Group whose instance-bound handlers get an owner from `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&RequestContext) -> T + Send + Sync + 'static,
    {
        Self {
            prefix: String::new(),
            factory: Arc::new(factory),
            error_handler: None,
            serializer: None,
            endpoints: Vec::new(),
        }
    }

    /// Group sharing one owner value across requests.
    pub fn shared(owner: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move |_| owner.clone())
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Callback consulted when binding fails.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext, &BindingError) -> Option<Value> + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(f));
        self
    }

    /// Serializer settings for this group's responses.
    pub fn serializer(mut self, settings: SerializerSettings) -> Self {
        self.serializer = Some(settings);
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint<T>) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn endpoints(&self) -> &[Endpoint<T>] {
        &self.endpoints
    }
}

impl RouteGroup<()> {
    /// Group of free-function handlers.
    pub fn stateless() -> Self {
        Self::new(|_| ())
    }
}

impl<T> fmt::Debug for RouteGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("prefix", &self.prefix)
            .field("endpoints", &self.endpoints)
            .field("has_error_handler", &self.error_handler.is_some())
            .field("serializer", &self.serializer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Parameter;
    use crate::dispatch::reply::Reply;
    use axum::http::Method;

    #[test]
    fn test_group_collects_endpoints_in_order() {
        let group = RouteGroup::stateless()
            .prefix("docs")
            .endpoint(
                Endpoint::new("UpdateItem", "item/{number}")
                    .param(Parameter::new::<i32>("number"))
                    .param(Parameter::body::<serde_json::Value>("item"))
                    .static_handler(|_| Ok(Reply::empty())),
            )
            .endpoint(Endpoint::new("GetItems", "items").static_handler(|_| Ok(Reply::empty())));

        let endpoints = group.endpoints();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].method(), Method::PUT);
        assert_eq!(endpoints[1].method(), Method::GET);

        let names: Vec<_> = endpoints[0].parameters().iter().map(Parameter::name).collect();
        assert_eq!(names, ["number", "item"]);
        assert!(endpoints[0].parameters()[1].is_body());
        assert!(endpoints[1].parameters().is_empty());
    }
}
