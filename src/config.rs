use crate::core_auth::AccessLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub root_dir: String,
    pub max_sessions: usize,
    pub pasv_address: Option<String>, // Public IPv4 announced in PASV replies
    pub pasv_port_min: Option<u16>,
    pub pasv_port_max: Option<u16>,
    pub buffer_size: usize,
    pub data_timeout_secs: u64,
    // Zero disables it. The keepalive is a bare CRLF, which strict clients
    // (Python's ftplib among them) reject as a malformed reply.
    pub keepalive_interval_secs: u64,
    pub idle_timeout_secs: u64,
    pub banner: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: String,
    pub password: String, // Plain text, or a bcrypt hash ("$2...")
    pub access: AccessLevel,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 21,
            root_dir: String::from("/var/ftp"),
            max_sessions: 4,
            pasv_address: None,
            pasv_port_min: None,
            pasv_port_max: None,
            buffer_size: 4 * 1024,
            data_timeout_secs: 10,
            keepalive_interval_secs: 0,
            idle_timeout_secs: 300,
            banner: String::from("microftpd ready."),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: String::from("admin"),
            password: String::new(),
            access: AccessLevel::ReadOnly,
        }
    }
}

impl ServerConfig {
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs.max(1))
    }

    pub fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive_interval_secs > 0).then(|| Duration::from_secs(self.keepalive_interval_secs))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.max(1))
    }

    /// Inclusive passive port range, if both bounds are configured and ordered.
    pub fn pasv_port_range(&self) -> Option<(u16, u16)> {
        match (self.pasv_port_min, self.pasv_port_max) {
            (Some(min), Some(max)) if min > 0 && min <= max => Some((min, max)),
            _ => None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;

        // A zero-sized buffer would turn every transfer into an instant EOF.
        if config.server.buffer_size == 0 {
            config.server.buffer_size = ServerConfig::default().buffer_size;
        }
        if config.server.max_sessions == 0 {
            config.server.max_sessions = 1;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = Config::from_toml(
            r#"
            [server]
            root_dir = "/srv/ftp"

            [account]
            username = "esp"
            password = "secret"
            access = "full"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.root_dir, "/srv/ftp");
        assert_eq!(config.server.listen_port, 21);
        assert_eq!(config.server.max_sessions, 4);
        assert_eq!(config.server.buffer_size, 4096);
        assert_eq!(config.account.access, AccessLevel::Full);
        assert!(config.server.pasv_port_range().is_none());
        assert_eq!(config.server.keepalive_interval(), None);
    }

    #[test]
    fn keepalive_is_opt_in() {
        let config = Config::from_toml(
            r#"
            [server]
            keepalive_interval_secs = 45
            "#,
        )
        .unwrap();
        assert_eq!(config.server.keepalive_interval(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn zero_buffer_and_sessions_are_corrected() {
        let config = Config::from_toml(
            r#"
            [server]
            buffer_size = 0
            max_sessions = 0
            pasv_port_min = 50000
            pasv_port_max = 50010
            "#,
        )
        .unwrap();

        assert_eq!(config.server.buffer_size, 4096);
        assert_eq!(config.server.max_sessions, 1);
        assert_eq!(config.server.pasv_port_range(), Some((50000, 50010)));
    }

    #[test]
    fn rejects_unknown_access_level() {
        let result = Config::from_toml(
            r#"
            [account]
            access = "root"
            "#,
        );
        assert!(result.is_err());
    }
}
