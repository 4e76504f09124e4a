//! Request helpers that drive the full router
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use music_rooms::room::SESSION_TOKEN_HEADER;

use super::setup::TestSetup;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Token of a session issued while serving this request
    pub fn issued_token(&self) -> Option<String> {
        self.headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

impl TestSetup {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: &str) -> TestResponse {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request("GET", uri, token, None).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request("DELETE", uri, token, None).await
    }

    /// POST /session, returning the token
    pub async fn new_session(&self) -> String {
        let response = self.request("POST", "/session", None, None).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_room(
        &self,
        token: Option<&str>,
        guest_can_pause: bool,
        votes_to_skip: i32,
    ) -> TestResponse {
        let body = format!(
            r#"{{"guest_can_pause": {}, "votes_to_skip": {}}}"#,
            guest_can_pause, votes_to_skip
        );
        self.post("/api/create-room", token, &body).await
    }
}
