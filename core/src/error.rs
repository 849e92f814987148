//! Error types for the ajax helper.
//!
//! # Design
//! HTTP failures and transport failures are separate variants, but both
//! expose the same `{status, statusText}` shape through `AjaxError::failure`.
//! A transport failure reports status `0` and an empty status text, the way
//! a browser does when a request never gets a response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured failure outcome: the numeric status and the status text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusError {
    pub status: u16,
    pub status_text: String,
}

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Errors returned by `AjaxClient`.
#[derive(Debug, Error)]
pub enum AjaxError {
    /// The method string is not one of the supported verbs.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A relative URL was given and no base URL is configured.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Blob values cannot be carried in a query string.
    #[error("field {0:?} holds a blob, which cannot be sent in a GET query")]
    BlobInQuery(String),

    /// The server answered with a status outside [200, 300) other than 403.
    #[error("HTTP {}: {}", .0.status, .0.status_text)]
    Status(StatusError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body of an otherwise successful response is not valid JSON.
    #[error("failed to parse response body as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AjaxError {
    /// Numeric status of a failed request; `0` for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            AjaxError::Status(e) => Some(e.status),
            AjaxError::Transport(_) => Some(0),
            _ => None,
        }
    }

    /// Status text of a failed request; empty for transport failures.
    pub fn status_text(&self) -> Option<&str> {
        match self {
            AjaxError::Status(e) => Some(&e.status_text),
            AjaxError::Transport(_) => Some(""),
            _ => None,
        }
    }

    /// The structured `{status, statusText}` outcome for HTTP and transport
    /// failures. `None` for local errors raised before or after the request.
    pub fn failure(&self) -> Option<StatusError> {
        Some(StatusError {
            status: self.status()?,
            status_text: self.status_text()?.to_string(),
        })
    }
}
