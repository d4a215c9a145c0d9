//! Response classification.
//!
//! Turns a raw [`WireResponse`] into an [`Outcome`] or a structured
//! [`ClientError`]. The server's `error` code is preserved so the executor
//! can recognize token rejections.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::host::WireResponse;

/// Status used by the API for successful requests without a body.
const NO_CONTENT: u16 = 204;

/// Successful result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx response with a JSON body.
    Payload(Value),
    /// 204 response; no body was parsed.
    Empty,
}

impl Outcome {
    /// Returns the payload, if any.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Outcome::Payload(value) => Some(value),
            Outcome::Empty => None,
        }
    }

    /// Returns true for an empty success.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    /// Decodes the payload into a typed model.
    ///
    /// An empty success decodes as JSON `null`, so `()` and `Option<T>`
    /// targets accept it.
    pub fn decode<T: DeserializeOwned>(self, url: &str) -> Result<T, ClientError> {
        let value = self.into_payload().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ClientError::Parse {
            url: url.to_string(),
            status: None,
            reason: e.to_string(),
        })
    }
}

/// Classifies a raw response.
pub fn classify(url: &str, response: &WireResponse) -> Result<Outcome, ClientError> {
    if response.status == NO_CONTENT {
        return Ok(Outcome::Empty);
    }

    let body: Value = serde_json::from_slice(&response.body).map_err(|e| ClientError::Parse {
        url: url.to_string(),
        status: Some(response.status),
        reason: e.to_string(),
    })?;

    if (200..300).contains(&response.status) {
        return Ok(Outcome::Payload(body));
    }

    let code = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);

    Err(ClientError::Http {
        url: url.to_string(),
        status: response.status,
        code,
        data: Some(body),
    })
}

// ============================================================================
// Tests
// ============================================================================
