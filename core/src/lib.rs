//! Single-shot HTTP request helper.
//!
//! # Overview
//! `AjaxClient::send` turns a method, a URL and a flat key-value payload into
//! exactly one network request and resolves with the raw response body.
//! `send_json` does the same and parses the body as JSON.
//!
//! # Design
//! - GET payloads travel as a percent-encoded query string; every other verb
//!   carries them as a multipart/form-data body.
//! - Statuses in [200, 300) and 403 resolve; anything else rejects with the
//!   status and status text.
//! - Request building and response parsing are pure; the network round-trip
//!   sits behind the `Transport` trait, with `ReqwestTransport` as the default.
//! - No retries, timeouts, caching or cancellation. Callers layer those on.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod transport;
pub mod types;

pub use client::AjaxClient;
pub use config::ClientConfig;
pub use error::{AjaxError, StatusError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Blob, FormValue, Payload};
