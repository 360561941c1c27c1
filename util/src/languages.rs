use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// The three execution strategies a program can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    /// Scripting dialects run by an external interpreter process.
    /// `tabular` decides whether relations arrive as data frames or raw records.
    EmbeddedInterpreter { tabular: bool },
    /// Query languages run against an in-memory relational engine.
    Relational,
    /// Declarative rule languages run by an external evaluator.
    Logic,
}

impl LanguageFamily {
    /// Short name used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            LanguageFamily::EmbeddedInterpreter { .. } => "interpreter",
            LanguageFamily::Relational => "relational",
            LanguageFamily::Logic => "logic",
        }
    }

    /// Name of the program file written into a working directory.
    pub fn program_file_name(&self) -> &'static str {
        match self {
            LanguageFamily::EmbeddedInterpreter { .. } => "program.py",
            LanguageFamily::Relational => "program.sql",
            LanguageFamily::Logic => "program.dl",
        }
    }
}

/// Family tag as written in catalog files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    #[serde(alias = "embedded-interpreter")]
    Interpreter,
    #[serde(alias = "sql")]
    Relational,
    #[serde(alias = "datalog")]
    Logic,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub family: FamilyKind,
    /// Only meaningful for interpreter languages.
    #[serde(default)]
    pub tabular: bool,
}

impl Language {
    pub fn new(id: &str, name: &str, family: FamilyKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            family,
            tabular: false,
        }
    }

    pub fn tabular(mut self) -> Self {
        self.tabular = true;
        self
    }

    pub fn family(&self) -> LanguageFamily {
        match self.family {
            FamilyKind::Interpreter => LanguageFamily::EmbeddedInterpreter {
                tabular: self.tabular,
            },
            FamilyKind::Relational => LanguageFamily::Relational,
            FamilyKind::Logic => LanguageFamily::Logic,
        }
    }
}

/// The set of recognized languages, keyed by id, in registration order.
///
/// Passed explicitly to whoever needs it; there is no process-wide registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: IndexMap<String, Language>,
}

impl Default for LanguageCatalog {
    /// The five languages of the benchmark.
    fn default() -> Self {
        Self::from_languages(vec![
            Language::new("python-imperative", "Python (Imperative)", FamilyKind::Interpreter),
            Language::new("python-functional", "Python (Functional)", FamilyKind::Interpreter),
            Language::new("python-pandas", "Python (Pandas)", FamilyKind::Interpreter).tabular(),
            Language::new("sql", "SQL", FamilyKind::Relational),
            Language::new("datalog", "Datalog", FamilyKind::Logic),
        ])
    }
}

impl LanguageCatalog {
    /// Later entries with a duplicate id replace earlier ones.
    pub fn from_languages(languages: Vec<Language>) -> Self {
        Self {
            languages: languages.into_iter().map(|l| (l.id.clone(), l)).collect(),
        }
    }

    /// Parses a catalog file: a JSON array of `{id, name, family, tabular?}`.
    pub fn from_json_str(s: &str) -> Result<Self, String> {
        let languages: Vec<Language> =
            serde_json::from_str(s).map_err(|e| format!("Invalid language catalog JSON: {e}"))?;
        Ok(Self::from_languages(languages))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let s = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read language catalog {path:?}: {e}"))?;
        Self::from_json_str(&s)
    }

    pub fn get(&self, id: &str) -> Option<&Language> {
        self.languages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.languages.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.values()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
