//! Configuration loading for stichtag-server.
//!
//! Configuration comes from three places, in order of precedence:
//!
//! 1. CLI arguments (listen address override)
//! 2. The TOML configuration file
//! 3. The `DATABASE_URL` environment variable (connection string only)
//!
//! The loader also takes care of the bootstrap admin password: if the
//! file carries it in plaintext, it is hashed and the file is rewritten
//! atomically so the plaintext never survives the first boot.

pub mod file;
pub mod runtime;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::password;
use file::{FileConfig, MissingContactSetting};
use runtime::{
    AuthConfig, EnrollmentConfig, MailConfig, MissingContactPolicy, ServerConfig, SharedConfig,
    SweepConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("config validation failed: {0}")]
    ValidationError(String),

    #[error("failed to hash bootstrap password: {0}")]
    HashError(String),

    #[error("DATABASE_URL environment variable is required when not running --in-memory")]
    MissingDatabaseUrl,
}

/// Bootstrap admin account with the password already hashed.
#[derive(Debug, Clone)]
pub struct BootstrapAccount {
    pub username: String,
    pub password_hash: String,
}

/// Fully validated configuration, ready to run with.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub enrollment: EnrollmentConfig,
    pub sweep: SweepConfig,
    pub mail: Option<MailConfig>,
    pub bootstrap: Option<BootstrapAccount>,
}

impl LoadedConfig {
    /// Wrap each section for shared, reloadable access.
    ///
    /// The bootstrap account is deliberately left out: it is consumed
    /// once at startup and never reloaded.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            server: Arc::new(RwLock::new(self.server)),
            auth: Arc::new(RwLock::new(self.auth)),
            enrollment: Arc::new(RwLock::new(self.enrollment)),
            sweep: Arc::new(RwLock::new(self.sweep)),
            mail: Arc::new(RwLock::new(self.mail)),
        }
    }
}

/// Loads and validates configuration, and can do it again on SIGHUP.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: &Path, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            listen_override,
        }
    }

    /// Load the configuration file, validate it, and hash the bootstrap
    /// password if it is still plaintext (rewriting the file in place).
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        if !file_config.is_bootstrap_password_hashed() {
            if let Some(bootstrap) = file_config.bootstrap.as_mut() {
                bootstrap.password = password::hash_password(&bootstrap.password)
                    .map_err(|e| ConfigError::HashError(e.to_string()))?;
            }
            self.rewrite_config(&file_config)?;
            tracing::info!("Bootstrap password hashed and config file rewritten");
        }

        Ok(build_loaded_config(file_config))
    }

    /// Reload for SIGHUP. Same path, same validation.
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    /// Atomically replace the config file: write a sibling temp file,
    /// then rename over the original.
    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let serialized = toml::to_string_pretty(config)?;
        let tmp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, serialized)?;
        std::fs::rename(&tmp_path, &self.config_path)?;
        Ok(())
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.auth.secret.len() < 16 {
        return Err(ConfigError::ValidationError(
            "auth.secret must be at least 16 bytes".to_string(),
        ));
    }
    if config.auth.token_ttl_minutes <= 0 {
        return Err(ConfigError::ValidationError(
            "auth.token_ttl_minutes must be positive".to_string(),
        ));
    }
    if let Some(bootstrap) = &config.bootstrap {
        if bootstrap.username.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bootstrap.username must not be empty".to_string(),
            ));
        }
        if bootstrap.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "bootstrap.password must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        auth: AuthConfig::new(
            file_config.auth.secret.into_bytes(),
            file_config.auth.token_ttl_minutes,
        ),
        enrollment: EnrollmentConfig {
            missing_contact: match file_config.enrollment.missing_contact {
                MissingContactSetting::Reject => MissingContactPolicy::Reject,
                MissingContactSetting::SkipNotification => MissingContactPolicy::SkipNotification,
            },
        },
        sweep: SweepConfig {
            interval_secs: file_config.sweep.interval_secs,
        },
        mail: file_config.mail.map(|mail| MailConfig {
            endpoint: mail.endpoint,
            api_token: mail.api_token,
            sender_name: mail.sender_name,
            sender_address: mail.sender_address,
            timeout_secs: mail.timeout_secs,
        }),
        bootstrap: file_config.bootstrap.map(|bootstrap| BootstrapAccount {
            username: bootstrap.username,
            password_hash: bootstrap.password,
        }),
    }
}

/// Database connection string, from the environment only.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("stichtag-config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_hashes_bootstrap_password_and_rewrites_file() {
        let dir = std::env::temp_dir().join(format!("stichtag-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = write_config(
            &dir,
            r#"
                [auth]
                secret = "a-long-enough-signing-secret"

                [bootstrap]
                username = "admin"
                password = "change-me"
            "#,
        );

        let loader = ConfigLoader::new(&path, None);
        let loaded = loader.load().unwrap();

        let bootstrap = loaded.bootstrap.unwrap();
        assert!(bootstrap.password_hash.starts_with("$argon2"));
        assert!(password::verify_password("change-me", &bootstrap.password_hash));

        // The plaintext must be gone from disk, and a second load must
        // not rewrite again.
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("change-me"));
        let reloaded: FileConfig = toml::from_str(&on_disk).unwrap();
        assert!(reloaded.is_bootstrap_password_hashed());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn listen_override_wins_over_file() {
        let dir = std::env::temp_dir().join(format!("stichtag-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = write_config(
            &dir,
            r#"
                [server]
                listen = "127.0.0.1:3000"

                [auth]
                secret = "a-long-enough-signing-secret"
            "#,
        );

        let loader = ConfigLoader::new(&path, Some("127.0.0.1:4000".parse().unwrap()));
        let loaded = loader.load().unwrap();
        assert_eq!(loaded.server.listen.port(), 4000);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn short_secret_is_rejected() {
        let dir = std::env::temp_dir().join(format!("stichtag-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = write_config(
            &dir,
            r#"
                [auth]
                secret = "short"
            "#,
        );

        let loader = ConfigLoader::new(&path, None);
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
