//! Request/response plumbing between the config client and whatever
//! actually talks HTTP (a `fetch` bridge in the admin panel, a stub in tests).

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
        }
    }
}

/// A fully built request. `body` is JSON when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigSyncError {
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("could not encode request: {0}")]
    Encode(String),
}

/// Sends one request and waits for its response. No retries, no caching:
/// failures propagate to the admin UI as-is.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConfigSyncError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConfigSyncError> {
        (**self).send(request)
    }
}
