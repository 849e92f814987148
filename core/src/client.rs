//! The ajax helper: one request in, one outcome out.
//!
//! # Design
//! `AjaxClient` keeps the host-does-IO split: `build_request` and
//! `parse_response` are pure and deterministic (apart from the multipart
//! boundary), and `send` glues them to a `Transport` for exactly one
//! round-trip. No state is shared between calls.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{AjaxError, StatusError};
use crate::form;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::Payload;

/// Stateless request helper.
#[derive(Debug, Clone)]
pub struct AjaxClient<T = ReqwestTransport> {
    base_url: Option<String>,
    transport: T,
}

impl AjaxClient<ReqwestTransport> {
    /// Client over the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Self {
        let transport = ReqwestTransport::new(&config);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> AjaxClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config
                .base_url
                .map(|base| base.trim_end_matches('/').to_string()),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one request and resolve with the raw response body.
    ///
    /// Resolves for statuses in [200, 300) and for 403; callers interpret a
    /// 403 body themselves.
    pub async fn send(
        &self,
        method: &str,
        url: &str,
        payload: &Payload,
    ) -> Result<String, AjaxError> {
        let method: HttpMethod = method.parse()?;
        let request = self.build_request(method, url, payload)?;
        debug!(method = %request.method, url = %request.url, "dispatching request");

        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "request settled");
        self.parse_response(response)
    }

    /// `send`, then parse the body as JSON.
    pub async fn send_json(
        &self,
        method: &str,
        url: &str,
        payload: &Payload,
    ) -> Result<serde_json::Value, AjaxError> {
        self.send_json_as(method, url, payload).await
    }

    /// `send`, then deserialize the body into `V`.
    pub async fn send_json_as<V: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        payload: &Payload,
    ) -> Result<V, AjaxError> {
        let body = self.send(method, url, payload).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Build the request for `method`: query string for GET, multipart body
    /// for everything else.
    pub fn build_request(
        &self,
        method: HttpMethod,
        url: &str,
        payload: &Payload,
    ) -> Result<HttpRequest, AjaxError> {
        let url = self.resolve_url(url)?;
        if method == HttpMethod::Get {
            let query = form::encode_query(payload)?;
            return Ok(HttpRequest {
                method,
                url: form::append_query(&url, &query),
                headers: Vec::new(),
                body: None,
            });
        }

        let boundary = form::new_boundary();
        Ok(HttpRequest {
            method,
            url,
            headers: vec![(
                "content-type".to_string(),
                form::multipart_content_type(&boundary),
            )],
            body: Some(form::encode_multipart(payload, &boundary)),
        })
    }

    /// Map a response to its outcome. 2xx and 403 yield the body unchanged.
    pub fn parse_response(&self, response: HttpResponse) -> Result<String, AjaxError> {
        if is_deliverable(response.status) {
            return Ok(response.body);
        }
        Err(AjaxError::Status(StatusError {
            status: response.status,
            status_text: response.status_text,
        }))
    }

    fn resolve_url(&self, url: &str) -> Result<String, AjaxError> {
        if has_scheme(url) {
            return Ok(url.to_string());
        }
        let base = self.base_url.as_deref().ok_or_else(|| {
            AjaxError::InvalidUrl(format!("relative URL {url:?} without a base URL"))
        })?;
        if url.starts_with('/') {
            Ok(format!("{base}{url}"))
        } else {
            Ok(format!("{base}/{url}"))
        }
    }
}

/// True when `url` starts with `scheme://`. A `://` later in the path or
/// query does not count.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// 2xx, plus 403 whose body the caller interprets.
fn is_deliverable(status: u16) -> bool {
    (200..300).contains(&status) || status == 403
}
