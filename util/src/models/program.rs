use crate::languages::LanguageCatalog;
use crate::paths::programs_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Span of source text that realizes one plan step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceRange {
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

/// A source-text solution to a task in a declared language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Program {
    pub task: String,
    pub language: String,
    #[serde(default)]
    pub plan: IndexMap<String, Vec<SourceRange>>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub implementation: String,
}

impl Program {
    pub fn new(task: &str, language: &str, source: &str) -> Self {
        Self {
            task: task.to_string(),
            language: language.to_string(),
            plan: IndexMap::new(),
            source: source.to_string(),
            author: String::new(),
            implementation: String::new(),
        }
    }

    /// `<language>_<implementation>_<author>.json`
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.json", self.language, self.implementation, self.author)
    }

    pub fn validate(&self, catalog: &LanguageCatalog) -> Result<(), String> {
        if self.author.is_empty() {
            return Err("Author must not be empty".to_string());
        }
        if self.source.is_empty() {
            return Err("Source must not be empty".to_string());
        }
        if !catalog.contains(&self.language) {
            return Err(format!("{} is not a valid language", self.language));
        }
        Ok(())
    }

    pub fn from_path(path: &Path) -> Result<Self, String> {
        let s = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read program file {path:?} ({})", e.kind()))?;
        serde_json::from_str::<Program>(&s)
            .map_err(|e| format!("Invalid program JSON in {path:?}: {e}"))
    }
}

/// Every program stored for `task_id`, ordered by file name.
///
/// A task with no programs directory has no programs.
pub fn load_programs_for(task_id: &str) -> Result<Vec<Program>, String> {
    let dir = programs_dir(task_id);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = fs::read_dir(&dir)
        .map_err(|_| format!("Failed to read programs dir at {dir:?}"))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    tracing::debug!(task = task_id, count = paths.len(), "loading programs");

    paths.iter().map(|p| Program::from_path(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{setup_test_data_root, write_program_file};
    use serial_test::serial;

    fn authored(language: &str) -> Program {
        let mut p = Program::new("total", language, "SELECT SUM(x) FROM t");
        p.author = "ann".to_string();
        p.implementation = "basic".to_string();
        p
    }

    #[test]
    fn test_file_name() {
        assert_eq!(authored("sql").file_name(), "sql_basic_ann.json");
    }

    #[test]
    fn test_validate() {
        let catalog = LanguageCatalog::default();
        assert!(authored("sql").validate(&catalog).is_ok());

        let err = authored("cobol").validate(&catalog).unwrap_err();
        assert_eq!(err, "cobol is not a valid language");

        let mut anonymous = authored("sql");
        anonymous.author.clear();
        assert_eq!(
            anonymous.validate(&catalog).unwrap_err(),
            "Author must not be empty"
        );
    }

    #[test]
    #[serial]
    fn test_load_programs_for_task() {
        let tmp = setup_test_data_root();
        write_program_file(
            tmp.path(),
            "total",
            "sql_basic_ann.json",
            r#"{"task": "total", "language": "sql", "source": "SELECT SUM(x) FROM t", "author": "ann", "implementation": "basic",
                "plan": {"sum": [{"line": 0, "start": 7, "end": 13}]}}"#,
        );
        write_program_file(
            tmp.path(),
            "total",
            "datalog_basic_ann.json",
            r#"{"task": "total", "language": "datalog", "source": "total(0).", "author": "ann", "implementation": "basic"}"#,
        );
        write_program_file(tmp.path(), "total", "notes.txt", "ignored");

        let programs = load_programs_for("total").unwrap();
        let langs: Vec<&str> = programs.iter().map(|p| p.language.as_str()).collect();
        assert_eq!(langs, vec!["datalog", "sql"]);
        assert_eq!(programs[1].plan["sum"][0].end, 13);

        assert!(load_programs_for("nothing").unwrap().is_empty());
    }
}
