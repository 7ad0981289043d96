//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the Coriolis client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://coriolis.example.com/api`.
    /// Backend-relative request paths are resolved against it.
    pub base_url: String,

    /// Route the client redirects to when the session expires.
    pub login_path: String,

    /// URL fragments that legitimately return 401 without meaning
    /// "session expired"; no login redirect for these.
    pub auth_exempt_paths: Vec<String>,

    /// Per-request timeout applied by the HTTP transport.
    pub request_timeout_secs: u64,

    /// Capacity of the cancelable-request buffer (FIFO eviction).
    pub cancel_buffer_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7667/api".to_string(),
            login_path: "/login".to_string(),
            auth_exempt_paths: vec!["/proxy/".to_string(), "/azure-login".to_string()],
            request_timeout_secs: 30,
            cancel_buffer_capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.cancel_buffer_capacity, 100);
        assert_eq!(
            config.auth_exempt_paths,
            vec!["/proxy/".to_string(), "/azure-login".to_string()]
        );
    }

    #[test]
    fn test_minimal_toml() {
        let config: ClientConfig =
            toml::from_str("base_url = \"https://coriolis.example.com/api\"").unwrap();
        assert_eq!(config.base_url, "https://coriolis.example.com/api");
        // Everything else falls back to defaults.
        assert_eq!(config.request_timeout_secs, 30);
    }
}
