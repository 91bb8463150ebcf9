//! Configuration module for the Redash exporter.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Exporter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the exporter listens on (default: "0.0.0.0:9295")
    pub listen_address: String,
    /// Seconds between status polls (default: 30)
    pub poll_interval_secs: u64,
    /// Target Redash scheme (default: "http")
    pub redash_scheme: String,
    /// Target Redash host (default: "localhost")
    pub redash_host: String,
    /// Target Redash port (default: 5000)
    pub redash_port: u16,
    /// Redash API key. Read only from the environment so it never
    /// appears in process listings.
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:9295".to_string(),
            poll_interval_secs: 30,
            redash_scheme: "http".to_string(),
            redash_host: "localhost".to_string(),
            redash_port: 5000,
            api_key: String::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REDASH_EXPORTER_LISTEN_ADDRESS`: listen address (default: "0.0.0.0:9295")
    /// - `REDASH_EXPORTER_INTERVAL`: poll interval in seconds (default: 30)
    /// - `REDASH_SCHEME`: target scheme (default: "http")
    /// - `REDASH_HOST`: target host (default: "localhost")
    /// - `REDASH_PORT`: target port (default: 5000)
    /// - `REDASH_API_KEY`: API key sent with every status request
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(addr) = env::var("REDASH_EXPORTER_LISTEN_ADDRESS") {
            cfg.listen_address = addr;
        }

        if let Ok(interval_str) = env::var("REDASH_EXPORTER_INTERVAL") {
            if let Ok(interval) = interval_str.parse() {
                cfg.poll_interval_secs = interval;
            }
        }

        if let Ok(scheme) = env::var("REDASH_SCHEME") {
            cfg.redash_scheme = scheme;
        }

        if let Ok(host) = env::var("REDASH_HOST") {
            cfg.redash_host = host;
        }

        if let Ok(port_str) = env::var("REDASH_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.redash_port = port;
            }
        }

        if let Ok(key) = env::var("REDASH_API_KEY") {
            cfg.api_key = key;
        }

        cfg
    }

    /// Base URL of the target Redash instance, without any path or key.
    pub fn redash_base_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.redash_scheme, self.redash_host, self.redash_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_address, "0.0.0.0:9295");
        assert_eq!(cfg.poll_interval_secs, 30);
        assert_eq!(cfg.redash_port, 5000);
    }

    #[test]
    fn test_base_url() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.redash_base_url(), "http://localhost:5000");
    }
}
