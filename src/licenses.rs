//! Demo licenses API served by the binary.

use std::sync::Arc;

use axum::http::Method;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use priority_router::dispatch::{Endpoint, KeyCase, Reply, RouteGroup, SerializerSettings};
use priority_router::Parameter;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseInfo {
    pub serial_key: String,
    pub package: String,
    pub status: String,
    pub days_left: i32,
}

struct License {
    info: LicenseInfo,
    activation_key: String,
}

/// In-memory license registry.
#[derive(Default)]
pub struct LicenseStore {
    licenses: DashMap<String, License>,
    subjects: DashMap<Uuid, &'static str>,
}

impl LicenseStore {
    pub fn list(&self) -> Vec<LicenseInfo> {
        let mut all: Vec<_> = self.licenses.iter().map(|entry| entry.info.clone()).collect();
        all.sort_by(|a, b| a.serial_key.cmp(&b.serial_key));
        all
    }

    pub fn get(&self, serial_key: &str) -> Option<LicenseInfo> {
        self.licenses.get(serial_key).map(|entry| entry.info.clone())
    }

    pub fn activation_key(&self, serial_key: &str) -> Option<String> {
        self.licenses
            .get(serial_key)
            .map(|entry| entry.activation_key.clone())
    }

    pub fn add(&self, serial_key: String, activation_key: String, package: String) -> String {
        let info = LicenseInfo {
            serial_key: serial_key.clone(),
            package,
            status: "registered".to_string(),
            days_left: 30,
        };
        self.licenses.insert(serial_key.clone(), License { info, activation_key });
        serial_key
    }

    pub fn remove(&self, serial_key: &str) -> bool {
        self.licenses.remove(serial_key).is_some()
    }

    pub fn set_status(&self, subject: Uuid, status: &'static str) {
        self.subjects.insert(subject, status);
    }

    pub fn status(&self, subject: Uuid) -> &'static str {
        self.subjects.get(&subject).map(|s| *s).unwrap_or("unknown")
    }
}

/// Endpoints over a shared store, replies in camelCase.
pub fn licenses_api(store: Arc<LicenseStore>) -> RouteGroup<Arc<LicenseStore>> {
    RouteGroup::shared(store)
        .serializer(SerializerSettings::default().key_case(KeyCase::CamelCase))
        .endpoint(
            Endpoint::new("GetLicenses", "licenses").handler(|store: Arc<LicenseStore>, _| Reply::value(store.list())),
        )
        .endpoint(
            Endpoint::new("GetLicense", "licenses/{serialKey}")
                .param(Parameter::new::<String>("serialKey"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let serial_key: String = args.take("serialKey")?;
                    Reply::value(store.get(&serial_key))
                }),
        )
        .endpoint(
            Endpoint::new("GetActivationKey", "licenses/{serialKey}/activationKey")
                .param(Parameter::new::<String>("serialKey"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let serial_key: String = args.take("serialKey")?;
                    Reply::value(store.activation_key(&serial_key))
                }),
        )
        .endpoint(
            Endpoint::new("AddLicense", "licenses")
                .param(Parameter::new::<String>("serialKey"))
                .param(Parameter::new::<String>("activationKey"))
                .param(Parameter::new::<String>("licenseKey"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let serial_key: String = args.take("serialKey")?;
                    let activation_key: String = args.take("activationKey")?;
                    let license_key: String = args.take("licenseKey")?;
                    tracing::info!(serial_key = %serial_key, "License added");
                    Reply::value(store.add(serial_key, activation_key, license_key))
                }),
        )
        .endpoint(
            Endpoint::new("RemoveLicense", "licenses/{serialKey}")
                .param(Parameter::new::<String>("serialKey"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let serial_key: String = args.take("serialKey")?;
                    if store.remove(&serial_key) {
                        tracing::info!(serial_key = %serial_key, "License removed");
                    }
                    Ok(Reply::empty())
                }),
        )
        .endpoint(
            Endpoint::new("Activate", "licenses/{subjectId}/activate")
                .verb(Method::GET)
                .param(Parameter::new::<Uuid>("subjectId"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let subject: Uuid = args.take("subjectId")?;
                    Ok(Reply::eventual_empty(async move {
                        store.set_status(subject, "activated");
                        Ok(())
                    }))
                }),
        )
        .endpoint(
            Endpoint::new("Deactivate", "licenses/{subjectId}/deactivate")
                .verb(Method::GET)
                .param(Parameter::new::<Uuid>("subjectId"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let subject: Uuid = args.take("subjectId")?;
                    store.set_status(subject, "deactivated");
                    Ok(Reply::empty())
                }),
        )
        .endpoint(
            Endpoint::new("GetLicenseStatus", "licenses/{subjectId}/status")
                .param(Parameter::new::<Uuid>("subjectId"))
                .handler(|store: Arc<LicenseStore>, mut args| {
                    let subject: Uuid = args.take("subjectId")?;
                    Reply::value(store.status(subject))
                }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use priority_router::dispatch::{RequestContext, Router, RouterBuilder};
    use priority_router::config::DispatchConfig;

    fn router(store: Arc<LicenseStore>) -> Router {
        let mut builder = RouterBuilder::new(DispatchConfig::default());
        builder.mount(licenses_api(store)).unwrap();
        builder.build()
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let store = Arc::new(LicenseStore::default());
        let router = router(store.clone());

        let added = router
            .dispatch(
                RequestContext::new(Method::POST, "licenses")
                    .with_body(r#"{"serialKey":"1","activationKey":"2","licenseKey":"3"}"#),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(added.text().as_deref(), Some("\"1\""));

        let listed = router
            .dispatch(RequestContext::new(Method::GET, "licenses"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            listed.text().as_deref(),
            Some(r#"[{"daysLeft":30,"package":"3","serialKey":"1","status":"registered"}]"#)
        );

        let key = router
            .dispatch(RequestContext::new(Method::GET, "licenses/1/activationKey"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key.text().as_deref(), Some("\"2\""));
    }

    #[tokio::test]
    async fn test_activation_round() {
        let store = Arc::new(LicenseStore::default());
        let router = router(store.clone());
        let subject = Uuid::new_v4();

        let response = router
            .dispatch(RequestContext::new(Method::GET, format!("licenses/{subject}/activate")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.status(subject), "activated");

        let bad = router
            .dispatch(RequestContext::new(Method::GET, "licenses/not-a-uuid/status"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }
}
