use std::collections::HashMap;

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt as _;
use serde_json::{json, Value};
use space_content_backend::handle;
use space_content_target::error::{HttpError, TargetError};
use space_content_target::{AccessToken, Resource, TargetApi};

/// Answers every resource from memory, unknown resources fail like an unreachable host.
#[derive(Default)]
pub struct StubTarget {
    responses: HashMap<String, Value>,
}

impl StubTarget {
    #[must_use]
    pub fn with(mut self, resource: &Resource, response: Value) -> Self {
        self.responses.insert(resource.path(), response);
        self
    }

    #[must_use]
    pub fn listings(self, activities: Value, audiences: Value, offers: Value) -> Self {
        self.with(
            &Resource::approved_activities(),
            json!({ "total": 0, "activities": activities }),
        )
        .with(&Resource::Audiences, json!({ "audiences": audiences }))
        .with(&Resource::Offers, json!({ "offers": offers }))
    }
}

impl TargetApi for StubTarget {
    async fn access_token(&self) -> Result<AccessToken, TargetError> {
        Ok(AccessToken::new("stub-token".to_owned()))
    }

    async fn fetch(&self, resource: &Resource, _token: &AccessToken) -> Result<Value, TargetError> {
        self.responses
            .get(&resource.path())
            .cloned()
            .ok_or_else(|| TargetError::Http(HttpError::UnsupportedUrl(resource.path())))
    }
}

pub fn activity_detail(id: i64, name: &str, priority: i64, offer_id: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "state": "approved",
        "priority": priority,
        "experiences": [{
            "experienceLocalId": 0,
            "name": "Experience A",
            "audienceIds": [],
            "optionLocations": [{"locationLocalId": 0, "optionLocalId": 0}]
        }],
        "locations": {"mboxes": [
            {"locationLocalId": 0, "name": "home-banner", "audienceIds": [7]}
        ]},
        "options": [{"optionLocalId": 0, "offerId": offer_id, "name": "Offer"}]
    })
}

pub async fn request(target: &StubTarget, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap();
    let response = handle(target, request).await;
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

pub async fn get(target: &StubTarget, uri: &str) -> (StatusCode, Value) {
    request(target, Method::GET, uri).await
}
