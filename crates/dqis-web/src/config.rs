//! Server configuration

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 8501;

/// Default upload ceiling: 200 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request bodies larger than this are rejected.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read `DQIS_HOST`, `DQIS_PORT` and `DQIS_MAX_UPLOAD_BYTES`, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("DQIS_HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("DQIS_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes: lookup("DQIS_MAX_UPLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
