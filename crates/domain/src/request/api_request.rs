//! A single call against the MentorLink REST API.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::id::generate_id_v7;
use crate::request::HttpMethod;

/// A JSON-over-HTTP API call.
///
/// `path` is relative to the configured base URL. The request keeps its id
/// across a replay so both attempts share one log correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Correlation id sent as `X-Request-Id`.
    pub id: Uuid,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the API base URL, always starting with `/`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
    retried: bool,
}

impl ApiRequest {
    /// Creates a request for `path`, adding a leading `/` when missing.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Self {
            id: generate_id_v7(),
            method,
            path,
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        Ok(self.with_body(value))
    }

    /// Path with the URL-encoded query string appended.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        match serde_urlencoded::to_string(&self.query) {
            Ok(query) => format!("{}?{query}", self.path),
            Err(_) => self.path.clone(),
        }
    }

    /// Marks the request as replayed after a token refresh.
    pub const fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Returns true if the request has already been replayed once.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_leading_slash_is_added() {
        assert_eq!(ApiRequest::get("users/me").path, "/users/me");
        assert_eq!(ApiRequest::get("/users/me").path, "/users/me");
    }

    #[test]
    fn test_path_and_query_encodes_parameters() {
        let request = ApiRequest::get("/mentors")
            .with_query("skill", "rust & go")
            .with_query("page", "2");
        assert_eq!(request.path_and_query(), "/mentors?skill=rust+%26+go&page=2");
        assert_eq!(ApiRequest::get("/mentors").path_and_query(), "/mentors");
    }

    #[test]
    fn test_with_json_body() {
        #[derive(Serialize)]
        struct NewBooking<'a> {
            mentor_id: &'a str,
            slot: u32,
        }

        let request = ApiRequest::post("/bookings")
            .with_json(&NewBooking {
                mentor_id: "m-1",
                slot: 3,
            })
            .unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body, Some(json!({"mentor_id": "m-1", "slot": 3})));
    }

    #[test]
    fn test_mark_retried_keeps_id() {
        let mut request = ApiRequest::delete("/reviews/7");
        let id = request.id;
        assert!(!request.is_retried());
        request.mark_retried();
        assert!(request.is_retried());
        assert_eq!(request.id, id);
    }
}
