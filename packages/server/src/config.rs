use config::{Config, ConfigError, Environment, File};
use std::time::Duration;

use htmlive_common::UploadLimits;
use htmlive_common::memory::LockoutPolicy;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens. Default: 7 days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Failed sign-ins before an email is locked out. Default: 5.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    /// Seconds a lockout lasts, counted from the first failure. Default: 900.
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
}

impl AuthConfig {
    pub fn lockout(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_failed_attempts: self.max_failed_attempts,
            window: Duration::from_secs(self.lockout_secs),
        }
    }
}

fn default_token_ttl_days() -> i64 {
    7
}
fn default_max_failed_attempts() -> u32 {
    htmlive_common::memory::DEFAULT_MAX_FAILED_ATTEMPTS
}
fn default_lockout_secs() -> u64 {
    htmlive_common::memory::DEFAULT_LOCKOUT_WINDOW.as_secs()
}

/// Limits applied to submitted and previewed bundles.
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum number of files per bundle. Default: 200.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum summed size of a bundle in bytes. Default: 8 MB.
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

fn default_max_files() -> usize {
    htmlive_common::upload::DEFAULT_MAX_FILES
}
fn default_max_total_bytes() -> u64 {
    htmlive_common::upload::DEFAULT_MAX_TOTAL_BYTES
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

impl UploadConfig {
    pub fn limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: self.max_files,
            max_total_bytes: self.max_total_bytes,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., HTMLIVE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("HTMLIVE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
