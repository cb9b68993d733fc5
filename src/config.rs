use serde::{Deserialize, Serialize};

use crate::billing::PlanId;
use crate::error::{LeasekitError, Result};
use crate::storage::{StorageBackend, StorageConfig};
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};

/// Main configuration for leasekit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Subscription lifecycle settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionConfig {
    /// Store key holding the subscription record
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Length of the default trial
    #[serde(default = "default_trial_days")]
    pub trial_days: u32,
    /// Length of the default subscription term
    #[serde(default = "default_term_days")]
    pub term_days: u32,
    /// Plan given to a new trial
    #[serde(default = "default_plan")]
    pub default_plan: PlanId,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            trial_days: default_trial_days(),
            term_days: default_term_days(),
            default_plan: default_plan(),
        }
    }
}

/// Longest accepted trial or term, about a century.
pub const MAX_TERM_DAYS: u32 = 36_500;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_storage_key() -> String {
    "subscription".to_string()
}

fn default_trial_days() -> u32 {
    14
}

fn default_term_days() -> u32 {
    365
}

fn default_plan() -> PlanId {
    PlanId::Professional
}

impl SubscriptionConfig {
    /// Load subscription settings from environment variables
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(key) = get_env_with_prefix("SUBSCRIPTION_KEY") {
            config.storage_key = key;
        }
        if let Some(days) = parse_env_with_prefix("TRIAL_DAYS") {
            config.trial_days = days;
        }
        if let Some(days) = parse_env_with_prefix("TERM_DAYS") {
            config.term_days = days;
        }
        if let Some(plan) = parse_env_with_prefix("DEFAULT_PLAN") {
            config.default_plan = plan;
        }

        config
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage.backend = backend;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.storage.data_dir = Some(dir.into());
        self
    }

    pub fn with_subscription(mut self, subscription: SubscriptionConfig) -> Self {
        self.config.subscription = subscription;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.config.subscription.storage_key = key.into();
        self
    }

    pub fn with_trial_days(mut self, days: u32) -> Self {
        self.config.subscription.trial_days = days;
        self
    }

    pub fn with_term_days(mut self, days: u32) -> Self {
        self.config.subscription.term_days = days;
        self
    }

    pub fn with_default_plan(mut self, plan: PlanId) -> Self {
        self.config.subscription.default_plan = plan;
        self
    }

    /// Load configuration from environment variables with LEASEKIT_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = parse_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json;
        }

        self.config.storage = StorageConfig::from_env();
        self.config.subscription = SubscriptionConfig::from_env();

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns [`LeasekitError::InvalidConfig`] if:
    /// - the log level is not recognized
    /// - the subscription storage key is empty
    /// - `term_days` is 0, longer than [`MAX_TERM_DAYS`] or shorter than `trial_days`
    /// - the file backend has no data directory
    pub fn build(self) -> Result<Config> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(LeasekitError::invalid_config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let subscription = &self.config.subscription;
        if subscription.storage_key.trim().is_empty() {
            return Err(LeasekitError::invalid_config(
                "Subscription storage key must not be empty",
            ));
        }

        if subscription.term_days == 0 {
            return Err(LeasekitError::invalid_config(
                "Subscription term_days must be greater than 0",
            ));
        }

        if subscription.term_days > MAX_TERM_DAYS {
            return Err(LeasekitError::invalid_config(format!(
                "Subscription term_days ({}) must not exceed {}",
                subscription.term_days, MAX_TERM_DAYS
            )));
        }

        if subscription.trial_days > subscription.term_days {
            return Err(LeasekitError::invalid_config(format!(
                "Subscription trial_days ({}) must not exceed term_days ({})",
                subscription.trial_days, subscription.term_days
            )));
        }

        if self.config.storage.backend == StorageBackend::File
            && self.config.storage.data_dir.is_none()
        {
            return Err(LeasekitError::invalid_config(
                "File storage requires a data directory",
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
