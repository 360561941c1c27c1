//! Language Dispatcher
//!
//! Maps a language id to its execution family using a catalog handed in at
//! construction. Lookup is pure: an unknown id is rejected before anything is
//! materialized, written or spawned.

use crate::error::RunnerError;
use util::languages::{LanguageCatalog, LanguageFamily};

pub struct Dispatcher<'a> {
    catalog: &'a LanguageCatalog,
}

impl<'a> Dispatcher<'a> {
    pub fn new(catalog: &'a LanguageCatalog) -> Self {
        Self { catalog }
    }

    pub fn dispatch(&self, language_id: &str) -> Result<LanguageFamily, RunnerError> {
        let language = self
            .catalog
            .get(language_id)
            .ok_or_else(|| RunnerError::UnsupportedLanguage(language_id.to_string()))?;
        let family = language.family();
        tracing::debug!(language = language_id, family = family.label(), "dispatched");
        Ok(family)
    }
}
