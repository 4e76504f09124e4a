//! Test assertion helpers - fluent API for verifying responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

use super::actions::TestResponse;

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// Asserts the body is a field error map with exactly `message` for `field`
    pub fn has_field_error(self, field: &str, message: &str) -> Self {
        let messages = self.response.body.get(field).unwrap_or_else(|| {
            panic!("no errors for field {}, body: {}", field, self.response.body)
        });
        assert_eq!(messages, &Value::from(vec![message]));
        self
    }

    pub fn has_field(self, field: &str, expected: Value) -> Self {
        assert_eq!(
            self.response.body[field], expected,
            "field {} mismatch, body: {}",
            field, self.response.body
        );
        self
    }

    pub fn issued_session(self) -> Self {
        assert!(
            self.response.issued_token().is_some(),
            "expected a newly issued session token"
        );
        self
    }

    pub fn issued_no_session(self) -> Self {
        assert!(
            self.response.issued_token().is_none(),
            "expected no new session token"
        );
        self
    }
}
