//! Configuration management for handover.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "handover";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "handover.db";

/// Placeholder secret shipped in the defaults.
pub const DEFAULT_SECRET_KEY: &str = "change_me";

/// Environment variables understood without the `HANDOVER_` prefix, and the
/// config keys they map to.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("secret_key", "server.secret_key"),
    ("mail_server", "mail.server"),
    ("mail_port", "mail.port"),
    ("mail_use_tls", "mail.use_tls"),
    ("mail_username", "mail.username"),
    ("mail_password", "mail.password"),
    ("mail_default_sender", "mail.default_sender"),
];

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables prefixed with `HANDOVER_`, nested with `__`
/// 2. The unprefixed `SECRET_KEY` and `MAIL_*` variables
/// 3. TOML config file at `~/.config/handover/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Notification mail configuration.
    pub mail: MailConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Application secret.
    pub secret_key: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/handover/handover.db`
    pub database_path: Option<PathBuf>,
}

/// Notification mail configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Send notifications at all.
    pub enabled: bool,
    /// SMTP relay host.
    pub server: String,
    /// SMTP relay port.
    pub port: u16,
    /// Upgrade the connection with STARTTLS.
    pub use_tls: bool,
    /// Relay login.
    pub username: Option<String>,
    /// Relay password.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// From address. Falls back to `username`.
    pub default_sender: Option<String>,
    /// Addresses that receive a notification for every submission.
    ///
    /// Accepts a list, a single address, or a comma-separated string, so
    /// `HANDOVER_MAIL__RECIPIENTS=it@example.com` works without brackets.
    #[serde(deserialize_with = "address_list")]
    pub recipients: Vec<String>,
    /// Subject line of notification mails.
    pub subject: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressList {
    One(String),
    Many(Vec<String>),
}

fn address_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match AddressList::deserialize(deserializer)? {
        AddressList::One(entry) => vec![entry],
        AddressList::Many(entries) => entries,
    };
    Ok(entries
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server: "smtp.office365.com".to_string(),
            port: 587,
            use_tls: true,
            username: None,
            password: None,
            default_sender: None,
            recipients: Vec::new(),
            subject: "New IT Asset Handover Form Submitted".to_string(),
        }
    }
}

impl MailConfig {
    /// The address notifications are sent from, if one can be determined.
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.default_sender
            .as_deref()
            .or(self.username.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Whether a notification would actually be attempted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.recipients.is_empty()
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::raw().filter_map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(name, _)| key == *name)
                    .map(|(_, path)| (*path).into())
            }))
            .merge(Env::prefixed("HANDOVER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.mail.port == 0 {
            return Err(Error::config("mail.port must be greater than 0"));
        }

        if self.mail.is_active() {
            if self.mail.server.trim().is_empty() {
                return Err(Error::config(
                    "mail.server must be set when recipients are configured",
                ));
            }
            if self.mail.sender().is_none() {
                return Err(Error::config(
                    "mail.default_sender or mail.username must be set when recipients are configured",
                ));
            }
        }

        Ok(())
    }

    /// Parse the bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| Error::config(format!("invalid bind address: {}", self.server.bind)))
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Whether the secret is still the shipped placeholder.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.server.secret_key == DEFAULT_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert!(config.uses_default_secret());
        assert!(config.mail.enabled);
        assert!(config.mail.use_tls);
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.mail.server, "smtp.office365.com");
        assert!(config.mail.recipients.is_empty());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_bind() {
        let mut config = Config::default();
        config.server.bind = "not an address".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid bind address"));
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.mail.port = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("mail.port"));
    }

    #[test]
    fn test_validate_recipients_need_sender() {
        let mut config = Config::default();
        config.mail.recipients = vec!["it@example.com".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_sender"));

        config.mail.username = Some("forms@example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sender_prefers_default_sender() {
        let mut mail = MailConfig {
            username: Some("login@example.com".to_string()),
            ..MailConfig::default()
        };
        assert_eq!(mail.sender(), Some("login@example.com"));

        mail.default_sender = Some("forms@example.com".to_string());
        assert_eq!(mail.sender(), Some("forms@example.com"));
    }

    #[test]
    fn test_mail_inactive_without_recipients() {
        let mut mail = MailConfig::default();
        assert!(!mail.is_active());

        mail.recipients = vec!["it@example.com".to_string()];
        assert!(mail.is_active());

        mail.enabled = false;
        assert!(!mail.is_active());
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("handover.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("handover"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let mail = MailConfig {
            password: Some("hunter2".to_string()),
            ..MailConfig::default()
        };
        let json = serde_json::to_string(&mail).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "handover.toml",
                r#"
                [server]
                bind = "0.0.0.0:8080"

                [storage]
                database_path = "/srv/forms/handover.db"

                [mail]
                username = "forms@example.com"
                recipients = ["it@example.com", "ops@example.com"]
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("handover.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.bind, "0.0.0.0:8080");
            assert_eq!(
                config.database_path(),
                PathBuf::from("/srv/forms/handover.db")
            );
            assert_eq!(config.mail.recipients, ["it@example.com", "ops@example.com"]);
            assert!(config.mail.is_active());
            assert_eq!(config.mail.port, 587);
            Ok(())
        });
    }

    #[test]
    fn test_legacy_mail_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("MAIL_SERVER", "relay.example.com");
            jail.set_env("MAIL_PORT", "2525");
            jail.set_env("MAIL_USE_TLS", "false");
            jail.set_env("MAIL_USERNAME", "forms@example.com");
            jail.set_env("SECRET_KEY", "s3cret");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.mail.server, "relay.example.com");
            assert_eq!(config.mail.port, 2525);
            assert!(!config.mail.use_tls);
            assert_eq!(config.mail.sender(), Some("forms@example.com"));
            assert!(!config.uses_default_secret());
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_environment_overrides_legacy() {
        Jail::expect_with(|jail| {
            jail.set_env("MAIL_PORT", "2525");
            jail.set_env("HANDOVER_MAIL__PORT", "465");
            jail.set_env("HANDOVER_STORAGE__DATABASE_PATH", "/srv/handover.db");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.mail.port, 465);
            assert_eq!(config.database_path(), PathBuf::from("/srv/handover.db"));
            Ok(())
        });
    }

    #[test]
    fn test_recipients_from_single_address() {
        Jail::expect_with(|jail| {
            jail.set_env("HANDOVER_MAIL__USERNAME", "forms@example.com");
            jail.set_env("HANDOVER_MAIL__RECIPIENTS", "it@example.com");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.mail.recipients, ["it@example.com"]);
            Ok(())
        });
    }

    #[test]
    fn test_recipients_from_comma_separated_list() {
        Jail::expect_with(|jail| {
            jail.set_env("HANDOVER_MAIL__USERNAME", "forms@example.com");
            jail.set_env(
                "HANDOVER_MAIL__RECIPIENTS",
                "it@example.com, ops@example.com,",
            );

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.mail.recipients, ["it@example.com", "ops@example.com"]);
            Ok(())
        });
    }

    #[test]
    fn test_recipients_from_toml_string() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "handover.toml",
                r#"
                [mail]
                username = "forms@example.com"
                recipients = "it@example.com"
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("handover.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.mail.recipients, ["it@example.com"]);
            Ok(())
        });
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }
}
