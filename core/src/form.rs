//! Payload encoders: URL query strings for GET, multipart/form-data for
//! every other verb.

use uuid::Uuid;

use crate::error::AjaxError;
use crate::types::{FormValue, Payload};

/// Encode `payload` as `k=v&k=v` in insertion order.
///
/// Keys and values are percent-encoded; only `A-Z a-z 0-9 - _ . ~` pass
/// through, so a space becomes `%20`.
pub fn encode_query(payload: &Payload) -> Result<String, AjaxError> {
    let mut pairs = Vec::with_capacity(payload.len());
    for (key, value) in payload.iter() {
        let text = value
            .as_text()
            .ok_or_else(|| AjaxError::BlobInQuery(key.to_string()))?;
        pairs.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(&text)
        ));
    }
    Ok(pairs.join("&"))
}

/// Append an encoded query to `url`, respecting an existing `?`.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        let sep = if url.ends_with('?') || url.ends_with('&') { "" } else { "&" };
        format!("{url}{sep}{query}")
    } else {
        format!("{url}?{query}")
    }
}

/// A fresh boundary for one multipart body.
pub fn new_boundary() -> String {
    format!("----AjaxFormBoundary{}", Uuid::new_v4().simple())
}

/// `content-type` header value for a multipart body with `boundary`.
pub fn multipart_content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Encode `payload` as a multipart/form-data body, one part per key.
///
/// Values are written verbatim. Field and file names have `"`, CR and LF
/// escaped as `%22`, `%0D` and `%0A`.
pub fn encode_multipart(payload: &Payload, boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();
    for (key, value) in payload.iter() {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match value {
            FormValue::Blob(blob) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        escape_name(key),
                        escape_name(blob.file_name()),
                        blob.content_type()
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&blob.bytes);
            }
            scalar => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        escape_name(key)
                    )
                    .as_bytes(),
                );
                if let Some(text) = scalar.as_text() {
                    body.extend_from_slice(text.as_bytes());
                }
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

fn escape_name(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
