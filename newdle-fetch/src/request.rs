//! Request descriptors.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// HTTP methods used by the newdle API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Description of one logical API call.
///
/// `endpoint` is a path relative to the API base URL (e.g. `api/me/`).
/// Anonymous requests never carry a token and never trigger a login.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Relative path, including any query string.
    pub endpoint: String,
    /// HTTP method.
    pub method: Method,
    /// JSON body for mutating requests.
    pub body: Option<Value>,
    /// Skip authentication entirely.
    pub anonymous: bool,
}

impl RequestDescriptor {
    /// Creates an authenticated request without body.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
            anonymous: false,
        }
    }

    /// Creates an authenticated GET request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    /// Creates an authenticated POST request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    /// Creates an authenticated PATCH request.
    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Patch, endpoint)
    }

    /// Creates an authenticated DELETE request.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Delete, endpoint)
    }

    /// Marks the request as anonymous (or not).
    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes a payload and attaches it as the JSON body.
    pub fn with_json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ClientError::InvalidRequest(format!("cannot encode body: {e}")))?;
        Ok(self.with_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders() {
        let req = RequestDescriptor::patch("api/newdle/abc")
            .anonymous(true)
            .with_json(&json!({"final_dt": null}))
            .unwrap();

        assert_eq!(req.method, Method::Patch);
        assert!(req.anonymous);
        assert_eq!(req.body, Some(json!({"final_dt": null})));
        assert!(!RequestDescriptor::get("api/me/").anonymous);
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
