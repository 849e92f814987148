//! Environment-driven server settings.

use std::path::PathBuf;

/// Where to listen and how loudly to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve on this Unix socket instead of `host:port` when set.
    pub unix_socket: Option<PathBuf>,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            unix_socket: None,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Reads `LISTEN_HOST`, `LISTEN_PORT`, `UNIX_SOCKET` and `DEBUG_MODE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with variables resolved through `lookup`.
    ///
    /// An unparsable port falls back to the default. Any non-empty
    /// `DEBUG_MODE` turns debug logging on.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("LISTEN_HOST")
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.host),
            port: lookup("LISTEN_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            unix_socket: lookup("UNIX_SOCKET")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            debug: lookup("DEBUG_MODE").is_some_and(|v| !v.is_empty()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Human-readable listen location for logs.
    pub fn describe(&self) -> String {
        match &self.unix_socket {
            Some(path) => format!("unix:{}", path.display()),
            None => self.addr(),
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}
