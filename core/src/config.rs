//! Client configuration.

/// Settings shared by `AjaxClient` and `ReqwestTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for relative URLs such as `/api/items`.
    pub base_url: Option<String>,
    pub user_agent: String,
    /// Optional cap on the response body size; bodies are read whole when
    /// unset.
    pub max_body_bytes: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: format!("ajax-core/{}", env!("CARGO_PKG_VERSION")),
            max_body_bytes: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    /// Defaults, with `base_url` taken from `AJAX_BASE_URL` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with variables resolved through `lookup`.
    ///
    /// `AJAX_MAX_BODY_BYTES` sets the body cap when it parses as a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup("AJAX_BASE_URL").filter(|s| !s.is_empty()),
            max_body_bytes: lookup("AJAX_MAX_BODY_BYTES").and_then(|n| n.parse().ok()),
            ..Self::default()
        }
    }
}
