use std::time::Duration;

/// Backend the client talks to when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TransportSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
