//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton holding
//! the values the command-line driver reads from the environment. The
//! execution core never reads it; callers pass an explicit
//! [`ExecutionConfig`](crate::execution_config::ExecutionConfig) and
//! [`LanguageCatalog`](crate::languages::LanguageCatalog) instead.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    /// Root of the task/program store.
    pub data_dir: String,
    /// Optional language catalog file replacing the built-in one.
    pub languages_file: Option<String>,
    /// Optional execution config JSON.
    pub execution_config: Option<String>,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    /// Every value has a default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "expressiveness-bench".into()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "bench=info,code_runner=info,marker=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "bench.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
            languages_file: env::var("LANGUAGES_FILE").ok().filter(|s| !s.is_empty()),
            execution_config: env::var("EXECUTION_CONFIG").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Reloads the configuration from the environment. Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_data_dir(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.data_dir = value.into());
    }

    pub fn set_languages_file(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.languages_file = value);
    }

    pub fn set_execution_config(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.execution_config = value);
    }
}

// --- Accessors ---

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn data_dir() -> String {
    AppConfig::global().data_dir.clone()
}

pub fn languages_file() -> Option<String> {
    AppConfig::global().languages_file.clone()
}

pub fn execution_config() -> Option<String> {
    AppConfig::global().execution_config.clone()
}
