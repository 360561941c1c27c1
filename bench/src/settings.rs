use anyhow::{Result, anyhow};
use std::path::Path;
use util::config;
use util::execution_config::ExecutionConfig;
use util::languages::LanguageCatalog;
use util::paths::languages_dir;

const CATALOG_FILE: &str = "languages.json";

/// `LANGUAGES_FILE` if set, else `{DATA_DIR}/languages/languages.json` if present,
/// else the built-in catalog.
pub fn load_catalog() -> Result<LanguageCatalog> {
    if let Some(file) = config::languages_file() {
        return LanguageCatalog::load(Path::new(&file)).map_err(|e| anyhow!(e));
    }
    let stored = languages_dir().join(CATALOG_FILE);
    if stored.is_file() {
        tracing::debug!(path = %stored.display(), "using stored language catalog");
        return LanguageCatalog::load(&stored).map_err(|e| anyhow!(e));
    }
    Ok(LanguageCatalog::default())
}

/// `EXECUTION_CONFIG` if set, else the defaults.
pub fn load_execution_config() -> Result<ExecutionConfig> {
    match config::execution_config() {
        Some(file) => ExecutionConfig::load(Path::new(&file)).map_err(|e| anyhow!(e)),
        None => Ok(ExecutionConfig::default_config()),
    }
}
