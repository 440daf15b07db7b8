//! HTTP API tests through the real router, with an in-memory stub server.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiresmith_admin::{AdminApi, ApiError, Auth, RemoteMapping};
use wiresmith_core::Mapping;
use wiresmith_server::{route_request, AppState, Config, TargetConfig};

/// Records every call; refuses mappings whose URL contains `fail`.
#[derive(Default)]
struct FakeAdmin {
    stored: Mutex<Vec<Mapping>>,
    /// Mappings placed on the server by something other than this tool.
    foreign: Mutex<Vec<Value>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeAdmin {
    fn record(&self, base_url: &str, auth: &Auth) {
        self.calls
            .lock()
            .unwrap()
            .push((base_url.to_string(), auth.header_value()));
    }
}

#[async_trait]
impl AdminApi for FakeAdmin {
    async fn create(
        &self,
        base_url: &str,
        mapping: &Mapping,
        auth: &Auth,
    ) -> Result<Mapping, ApiError> {
        self.record(base_url, auth);
        let url = mapping.request.url.as_ref().map(|u| u.value()).unwrap_or("");
        if url.contains("fail") {
            return Err(ApiError::Server {
                status: 500,
                message: "rejected".into(),
            });
        }
        self.stored.lock().unwrap().push(mapping.clone());
        Ok(mapping.clone())
    }

    async fn list_all(
        &self,
        base_url: &str,
        auth: &Auth,
    ) -> Result<Vec<RemoteMapping>, ApiError> {
        self.record(base_url, auth);
        let mut listing: Vec<RemoteMapping> = self
            .stored
            .lock()
            .unwrap()
            .iter()
            .map(|m| RemoteMapping::from_mapping(m).unwrap())
            .collect();
        for raw in self.foreign.lock().unwrap().iter() {
            listing.push(serde_json::from_value(raw.clone()).unwrap());
        }
        Ok(listing)
    }

    async fn delete(&self, base_url: &str, id: &str, auth: &Auth) -> Result<bool, ApiError> {
        self.record(base_url, auth);
        let mut stored = self.stored.lock().unwrap();
        let before = stored.len();
        stored.retain(|m| m.id != id);
        Ok(stored.len() != before)
    }

    async fn reset_all(&self, base_url: &str, auth: &Auth) -> Result<(), ApiError> {
        self.record(base_url, auth);
        self.stored.lock().unwrap().clear();
        Ok(())
    }
}

/// Fails every call as if the stub server were down.
struct DownAdmin;

#[async_trait]
impl AdminApi for DownAdmin {
    async fn create(&self, base_url: &str, _: &Mapping, _: &Auth) -> Result<Mapping, ApiError> {
        Err(ApiError::Connection(base_url.to_string()))
    }

    async fn list_all(&self, base_url: &str, _: &Auth) -> Result<Vec<RemoteMapping>, ApiError> {
        Err(ApiError::Connection(base_url.to_string()))
    }

    async fn delete(&self, base_url: &str, _: &str, _: &Auth) -> Result<bool, ApiError> {
        Err(ApiError::Connection(base_url.to_string()))
    }

    async fn reset_all(&self, base_url: &str, _: &Auth) -> Result<(), ApiError> {
        Err(ApiError::Connection(base_url.to_string()))
    }
}

struct Harness {
    state: Arc<AppState>,
    admin: Arc<FakeAdmin>,
}

impl Harness {
    fn new(target: Option<&str>) -> Self {
        let config = Config {
            target: target.map(TargetConfig::new),
            ..Config::default()
        };
        let admin = Arc::new(FakeAdmin::default());
        let state = Arc::new(AppState::new(&config, admin.clone()));
        Self { state, admin }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        self.send_raw(method, uri, "application/json", body).await
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: String,
    ) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Full::new(Bytes::from(body)))
            .unwrap();
        let resp = route_request(req, Arc::clone(&self.state)).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn calls(&self) -> Vec<(String, Option<String>)> {
        self.admin.calls.lock().unwrap().clone()
    }
}

fn document(urls: &[&str]) -> Value {
    let mocks: Vec<Value> = urls
        .iter()
        .map(|url| {
            json!({
                "request": {"method": "GET", "url": url},
                "response": {"status": 200, "body": {"type": "inline", "value": "ok"}}
            })
        })
        .collect();
    json!({"version": "1.0", "mocks": mocks})
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new(None);
    let (status, body) = h.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let h = Harness::new(None);
    let (status, body) = h.send(Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["errors"].is_array());

    let (status, _) = h.send(Method::PATCH, "/mappings", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schema_and_template() {
    let h = Harness::new(None);
    let (status, schema) = h.send(Method::GET, "/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schema["required"], json!(["version", "mocks"]));

    let (status, template) = h.send(Method::GET, "/template", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, result) = h.send(Method::POST, "/validate", Some(template)).await;
    assert_eq!(result["isValid"], json!(true));
    assert_eq!(result["warnings"], json!([]));
}

#[tokio::test]
async fn test_validate_reports_errors_with_200() {
    let h = Harness::new(None);
    let doc = json!({"version": "1.0", "mocks": [{"request": {"method": "GET", "url": "/a"}, "response": {"status": 700}}]});

    let (status, result) = h.send(Method::POST, "/validate", Some(doc)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["isValid"], json!(false));
    assert_eq!(result["errors"][0]["path"], json!("mocks[0].response.status"));
}

#[tokio::test]
async fn test_validate_unparseable_body() {
    let h = Harness::new(None);
    let (status, result) = h
        .send_raw(Method::POST, "/validate", "application/json", "{not json".into())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["isValid"], json!(false));
    assert_eq!(result["errors"][0]["path"], json!("$"));
}

#[tokio::test]
async fn test_validate_yaml_body() {
    let h = Harness::new(None);
    let yaml = "version: \"1.0\"\nmocks:\n  - request:\n      method: GET\n      url: /a\n    response:\n      status: 200\n";
    let (status, result) = h
        .send_raw(Method::POST, "/validate", "application/yaml", yaml.into())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["isValid"], json!(true));
}

#[tokio::test]
async fn test_generate_stores_mappings() {
    let h = Harness::new(None);
    let (status, body) = h
        .send(Method::POST, "/generate", Some(document(&["/a", "/b"])))
        .await;
    assert_eq!(status, StatusCode::OK);
    let mappings = body["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0]["request"]["url"], json!("/a"));
    assert_eq!(mappings[1]["request"]["url"], json!("/b"));

    let (status, list) = h.send(Method::GET, "/mappings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], json!(2));
    assert_eq!(list["mappings"][0]["id"], mappings[0]["id"]);
}

#[tokio::test]
async fn test_generate_invalid_document_is_422() {
    let h = Harness::new(None);
    let (status, body) = h
        .send(Method::POST, "/generate", Some(json!({"version": "1.0"})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["isValid"], json!(false));

    let (_, list) = h.send(Method::GET, "/mappings", None).await;
    assert_eq!(list["meta"]["total"], json!(0));
}

fn legacy_document(ids: &[&str]) -> Value {
    let mappings: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "request": {"method": "GET", "url": format!("/{id}")},
                "response": {"status": 200}
            })
        })
        .collect();
    json!({"name": "legacy", "version": "0.1", "mappings": mappings})
}

#[tokio::test]
async fn test_generate_conflict_leaves_store_unchanged() {
    let h = Harness::new(None);
    let (status, _) = h
        .send(Method::POST, "/generate", Some(legacy_document(&["x"])))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h
        .send(Method::POST, "/generate", Some(legacy_document(&["a", "x"])))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = body["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("already exists"), "{message}");

    let (_, list) = h.send(Method::GET, "/mappings", None).await;
    assert_eq!(list["meta"]["total"], json!(1));
    assert_eq!(list["mappings"][0]["id"], json!("x"));
    let (status, _) = h.send(Method::GET, "/mappings/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mapping_crud() {
    let h = Harness::new(None);
    let mapping = json!({
        "request": {"method": "POST", "urlPath": "/orders"},
        "response": {"status": 201}
    });

    let (status, created) = h.send(Method::POST, "/mappings", Some(mapping)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, fetched) = h.send(Method::GET, &format!("/mappings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let replacement = json!({
        "id": "ignored",
        "request": {"method": "GET", "urlPath": "/orders"},
        "response": {"status": 200}
    });
    let (status, replaced) = h
        .send(Method::PUT, &format!("/mappings/{id}"), Some(replacement))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], json!(id));
    assert_eq!(replaced["response"]["status"], json!(200));

    let (status, _) = h.send(Method::DELETE, &format!("/mappings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.send(Method::GET, &format!("/mappings/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h.send(Method::DELETE, &format!("/mappings/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mapping_create_conflict_and_bad_json() {
    let h = Harness::new(None);
    let mapping = json!({
        "id": "fixed",
        "request": {"method": "GET", "url": "/x"},
        "response": {"status": 200}
    });
    let (status, _) = h.send(Method::POST, "/mappings", Some(mapping.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = h.send(Method::POST, "/mappings", Some(mapping)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = h
        .send_raw(Method::POST, "/mappings", "application/json", "[]".into())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_all_mappings() {
    let h = Harness::new(None);
    h.send(Method::POST, "/generate", Some(document(&["/a", "/b", "/c"])))
        .await;
    let (status, body) = h.send(Method::DELETE, "/mappings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], json!(3));

    let (_, list) = h.send(Method::GET, "/mappings", None).await;
    assert_eq!(list["meta"]["total"], json!(0));
}

#[tokio::test]
async fn test_deploy_without_target_is_400() {
    let h = Harness::new(None);
    let (status, _) = h
        .send(Method::POST, "/deploy", Some(document(&["/a"])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_uses_document_target_and_auth() {
    let h = Harness::new(Some("http://configured.test"));
    let mut doc = document(&["/m1", "/fail", "/m3"]);
    doc["target"] = json!({
        "baseUrl": "http://stub.test",
        "auth": {"type": "bearer", "token": "t0k"}
    });

    let (status, body) = h.send(Method::POST, "/deploy", Some(doc)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targetUrl"], json!("http://stub.test"));
    assert_eq!(body["successCount"], json!(2));
    assert_eq!(body["failureCount"], json!(1));
    assert_eq!(body["failed"][0]["index"], json!(1));

    let calls = h.calls();
    assert_eq!(calls.len(), 3);
    for (base_url, auth) in calls {
        assert_eq!(base_url, "http://stub.test");
        assert_eq!(auth.as_deref(), Some("Bearer t0k"));
    }
}

#[tokio::test]
async fn test_deploy_falls_back_to_configured_target() {
    let h = Harness::new(Some("http://configured.test"));
    let (status, body) = h
        .send(Method::POST, "/deploy", Some(document(&["/a"])))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targetUrl"], json!("http://configured.test"));
    assert_eq!(body["successCount"], json!(1));
    assert_eq!(h.calls()[0], ("http://configured.test".to_string(), None));
}

#[tokio::test]
async fn test_deploy_invalid_document_is_422() {
    let h = Harness::new(Some("http://configured.test"));
    let (status, _) = h
        .send(Method::POST, "/deploy", Some(json!({"mocks": "nope"})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_stored_mappings() {
    let h = Harness::new(Some("http://configured.test"));
    h.send(Method::POST, "/generate", Some(document(&["/a", "/b"])))
        .await;

    let (status, body) = h.send(Method::POST, "/mappings/deploy", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successCount"], json!(2));
    assert_eq!(h.admin.stored.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_remote_requires_configured_target() {
    let h = Harness::new(None);
    let (status, _) = h.send(Method::GET, "/remote/mappings", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remote_passthrough() {
    let h = Harness::new(Some("http://configured.test"));
    h.send(Method::POST, "/generate", Some(document(&["/a"])))
        .await;
    h.send(Method::POST, "/mappings/deploy", None).await;

    let (status, list) = h.send(Method::GET, "/remote/mappings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], json!(1));
    let id = list["mappings"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = h
        .send(Method::DELETE, &format!("/remote/mappings/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h
        .send(Method::DELETE, &format!("/remote/mappings/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h.send(Method::POST, "/remote/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reset"], json!(true));
}

#[tokio::test]
async fn test_remote_list_includes_foreign_mappings() {
    let h = Harness::new(Some("http://configured.test"));
    h.send(Method::POST, "/generate", Some(document(&["/a"])))
        .await;
    h.send(Method::POST, "/mappings/deploy", None).await;
    h.admin.foreign.lock().unwrap().push(json!({
        "id": "manual",
        "request": {"method": "TRACE", "headers": {"X-Env": {"equalTo": "qa", "caseInsensitive": true}}},
        "response": {"status": 204}
    }));

    let (status, list) = h.send(Method::GET, "/remote/mappings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], json!(2));
    assert_eq!(list["mappings"][0]["request"]["url"], json!("/a"));
    assert_eq!(list["mappings"][1]["id"], json!("manual"));
    assert_eq!(
        list["mappings"][1]["request"]["headers"]["X-Env"]["caseInsensitive"],
        json!(true)
    );
}

#[tokio::test]
async fn test_remote_failure_is_502() {
    let config = Config {
        target: Some(TargetConfig::new("http://down.test")),
        ..Config::default()
    };
    let state = Arc::new(AppState::new(&config, Arc::new(DownAdmin)));
    let req = Request::builder()
        .method(Method::GET)
        .uri("/remote/mappings")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let resp = route_request(req, state).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_metrics_endpoint_counts_requests() {
    let h = Harness::new(None);
    h.send(Method::GET, "/health", None).await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/metrics")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let resp = route_request(req, Arc::clone(&h.state)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(resp.into_body().collect().await.unwrap().to_bytes().to_vec())
        .unwrap();
    assert!(text.contains("wiresmith_requests_total"));
}
