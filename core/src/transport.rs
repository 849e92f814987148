//! The I/O seam between `AjaxClient` and the network.
//!
//! # Design
//! `Transport` takes a fully built `HttpRequest` and yields the
//! `HttpResponse` as data: HTTP error statuses are not errors at this layer,
//! only failures to obtain a response at all are. `ReqwestTransport` keeps
//! the reason phrase the server actually sent, falling back to the canonical
//! phrase for the status code when the server used that one.

use std::future::Future;

use hyper::ext::ReasonPhrase;
use reqwest::{Client, Method, Response};
use tokio::runtime::Handle;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Default transport backed by a shared `reqwest::Client`.
///
/// Must be polled inside a tokio runtime; elsewhere `execute` resolves to a
/// `TransportError` without touching the network.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_body_bytes: Option<u64>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_default();
        Self {
            client,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let client = self.client.clone();
        let limit = self.max_body_bytes;
        async move {
            if Handle::try_current().is_err() {
                return Err(TransportError(
                    "no tokio runtime available to drive the request".to_string(),
                ));
            }

            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;
            let mut builder = client.request(reqwest_method(method), url.as_str());
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;
            read_response(response, limit).await
        }
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

async fn read_response(
    mut response: Response,
    limit: Option<u64>,
) -> Result<HttpResponse, TransportError> {
    let status = response.status();
    let status_text = match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    };
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| TransportError(format!("failed to read response body: {e}")))?
    {
        if let Some(limit) = limit {
            if (bytes.len() + chunk.len()) as u64 > limit {
                return Err(TransportError(format!(
                    "response body exceeds {limit} bytes"
                )));
            }
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
