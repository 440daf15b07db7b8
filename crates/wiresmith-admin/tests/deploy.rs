//! Batch deployment against an in-process Admin API.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use std::time::Duration;
use wiresmith_admin::{deploy, AdminApi, ApiError, Auth, RemoteMapping};
use wiresmith_core::{HttpMethod, Mapping, MappingRequest, MappingResponse, UrlMatcher};

/// Stores mappings in memory and refuses those whose URL contains `fail`.
#[derive(Default)]
struct FakeAdmin {
    stored: Mutex<Vec<Mapping>>,
    seen_auth: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl AdminApi for FakeAdmin {
    async fn create(
        &self,
        _base_url: &str,
        mapping: &Mapping,
        auth: &Auth,
    ) -> Result<Mapping, ApiError> {
        self.seen_auth.lock().unwrap().push(auth.header_value());
        // Slow first item, so completion order differs from submission order.
        if mapping.id == "m1" {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        let url = mapping.request.url.as_ref().map(|u| u.value()).unwrap_or("");
        if url.contains("fail") {
            return Err(ApiError::Server {
                status: 500,
                message: "simulated failure".into(),
            });
        }
        self.stored.lock().unwrap().push(mapping.clone());
        Ok(mapping.clone())
    }

    async fn list_all(
        &self,
        _base_url: &str,
        _auth: &Auth,
    ) -> Result<Vec<RemoteMapping>, ApiError> {
        let stored = self.stored.lock().unwrap();
        Ok(stored
            .iter()
            .map(|m| RemoteMapping::from_mapping(m).unwrap())
            .collect())
    }

    async fn delete(&self, _base_url: &str, id: &str, _auth: &Auth) -> Result<bool, ApiError> {
        let mut stored = self.stored.lock().unwrap();
        let before = stored.len();
        stored.retain(|m| m.id != id);
        Ok(stored.len() != before)
    }

    async fn reset_all(&self, _base_url: &str, _auth: &Auth) -> Result<(), ApiError> {
        self.stored.lock().unwrap().clear();
        Ok(())
    }
}

fn mapping(id: &str, url: &str) -> Mapping {
    Mapping {
        id: id.to_string(),
        name: None,
        priority: None,
        request: MappingRequest::new(HttpMethod::Get, Some(UrlMatcher::Url(url.into()))),
        response: MappingResponse::new(200),
        scenario_name: None,
        required_scenario_state: None,
        new_scenario_state: None,
        metadata: None,
    }
}

#[tokio::test]
async fn second_create_fails_rest_succeed() {
    let admin = FakeAdmin::default();
    let batch = vec![
        mapping("m1", "/one"),
        mapping("m2", "/fail"),
        mapping("m3", "/three"),
    ];

    let report = deploy(&admin, "http://stubs:8080", &batch, &Auth::None, 4).await;

    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert!(!report.is_complete());
    let ids: Vec<&str> = report.succeeded.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m3"]);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].mapping_id, "m2");
    assert!(report.failed[0].message.contains("simulated failure"));

    let remote = admin.list_all("http://stubs:8080", &Auth::None).await.unwrap();
    let remote_ids: Vec<Option<&str>> = remote.iter().map(|m| m.id.as_deref()).collect();
    assert_eq!(remote_ids.len(), 2);
    assert!(remote_ids.contains(&Some("m1")) && remote_ids.contains(&Some("m3")));
}

#[tokio::test]
async fn auth_header_reaches_every_create() {
    let admin = FakeAdmin::default();
    let batch = vec![mapping("a", "/a"), mapping("b", "/b")];
    let auth = Auth::Bearer {
        token: "t0k".into(),
    };

    let report = deploy(&admin, "http://stubs:8080", &batch, &auth, 1).await;
    assert!(report.is_complete());
    assert_eq!(
        *admin.seen_auth.lock().unwrap(),
        vec![Some("Bearer t0k".to_string()), Some("Bearer t0k".to_string())]
    );
}

#[tokio::test]
async fn empty_batch_and_zero_concurrency() {
    let admin = FakeAdmin::default();
    let report = deploy(&admin, "http://stubs:8080", &[], &Auth::None, 0).await;
    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failure_count(), 0);

    let report = deploy(
        &admin,
        "http://stubs:8080",
        &[mapping("x", "/x")],
        &Auth::None,
        0,
    )
    .await;
    assert_eq!(report.success_count(), 1);
}

#[tokio::test]
async fn delete_and_reset_through_trait_object() {
    let admin: Box<dyn AdminApi> = Box::new(FakeAdmin::default());
    let batch = vec![mapping("a", "/a"), mapping("b", "/b")];
    deploy(admin.as_ref(), "http://stubs", &batch, &Auth::None, 2).await;

    assert!(admin.delete("http://stubs", "a", &Auth::None).await.unwrap());
    assert!(!admin.delete("http://stubs", "a", &Auth::None).await.unwrap());
    admin.reset_all("http://stubs", &Auth::None).await.unwrap();
    assert!(admin
        .list_all("http://stubs", &Auth::None)
        .await
        .unwrap()
        .is_empty());
}
