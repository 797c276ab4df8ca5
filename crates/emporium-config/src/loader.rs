//! Configuration loader with layered sources.

use crate::{AppConfig, CacheBackendKind};
use config::{Config, ConfigError, Environment, File};
use emporium_core::EmporiumError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Environment variable naming the active environment.
pub const ENVIRONMENT_VAR: &str = "EMPORIUM_ENVIRONMENT";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
    environment: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Sources are applied in order, later ones overriding earlier ones:
    /// 1. `{config_dir}/default.toml`
    /// 2. `{config_dir}/{environment}.toml`
    /// 3. `{config_dir}/local.toml`
    /// 4. Environment variables such as `EMPORIUM__CACHE__BACKEND`
    ///
    /// The environment name comes from `EMPORIUM_ENVIRONMENT` and defaults to
    /// `development`.
    pub fn new(config_dir: impl Into<String>) -> Result<Self, EmporiumError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }
        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        Self::for_environment(config_dir, environment)
    }

    /// Creates a loader for an explicit environment name.
    pub fn for_environment(
        config_dir: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self, EmporiumError> {
        let config_dir = config_dir.into();
        let environment = environment.into();
        let config = Self::load_config(&config_dir, &environment)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
            environment,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, EmporiumError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), EmporiumError> {
        let new_config = Self::load_config(&self.config_dir, &self.environment)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str, environment: &str) -> Result<AppConfig, EmporiumError> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder()
            .set_default("app.environment", environment)
            .map_err(config_error_to_emporium_error)?;

        for layer in ["default", environment, "local"] {
            let path = format!("{config_dir}/{layer}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config layer from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("EMPORIUM")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_emporium_error)?;

        validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Gets a specific configuration value by dotted key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

/// Rejects configurations the server cannot start with.
pub fn validate_config(config: &AppConfig) -> Result<(), EmporiumError> {
    if config.database.url.trim().is_empty() {
        return Err(EmporiumError::Configuration(
            "Database URL is required".to_string(),
        ));
    }

    if !config.database.is_in_memory()
        && config.database.max_connections < config.database.min_connections
    {
        return Err(EmporiumError::Configuration(
            "database.max_connections must be >= database.min_connections".to_string(),
        ));
    }

    if config.cache.operation_timeout_ms == 0 {
        return Err(EmporiumError::Configuration(
            "cache.operation_timeout_ms must be greater than zero".to_string(),
        ));
    }

    if config.cache.backend == CacheBackendKind::Redis {
        if config.cache.redis_url.trim().is_empty() {
            return Err(EmporiumError::Configuration(
                "cache.redis_url is required when cache.backend is redis".to_string(),
            ));
        }
        if config.cache.pool_size == 0 {
            return Err(EmporiumError::Configuration(
                "cache.pool_size must be greater than zero".to_string(),
            ));
        }
    }

    if config.app.environment == "production" && config.database.is_in_memory() {
        warn!("In-memory store configured in production; data will not survive restarts");
    }

    Ok(())
}

fn config_error_to_emporium_error(err: ConfigError) -> EmporiumError {
    EmporiumError::Configuration(err.to_string())
}
