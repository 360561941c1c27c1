use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Limits applied to every backend run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionLimits {
    /// Max wall time for an external process. The child is killed when it expires.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Parent directory for disposable working directories. `None` uses the system temp dir.
    #[serde(default)]
    pub work_root: Option<PathBuf>,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            work_root: None,
        }
    }
}

impl ExecutionLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How interpreter-family snippets are run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterpreterOptions {
    #[serde(default = "default_interpreter_program")]
    pub program: String,

    /// Helper bindings placed ahead of every snippet.
    #[serde(default = "default_prelude")]
    pub prelude: Vec<String>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            program: default_interpreter_program(),
            prelude: default_prelude(),
        }
    }
}

/// How logic programs are evaluated.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogicOptions {
    #[serde(default = "default_logic_program")]
    pub program: String,

    /// Placed before the fact/output directory flags and the program file.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for LogicOptions {
    fn default() -> Self {
        Self {
            program: default_logic_program(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub execution: ExecutionLimits,

    #[serde(default)]
    pub interpreter: InterpreterOptions,

    #[serde(default)]
    pub logic: LogicOptions,
}

impl ExecutionConfig {
    pub fn default_config() -> Self {
        ExecutionConfig {
            execution: ExecutionLimits::default(),
            interpreter: InterpreterOptions::default(),
            logic: LogicOptions::default(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| format!("Invalid execution config JSON: {e}"))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|_| format!("Failed to read execution config at {path:?}"))?;
        Self::from_json_str(&contents)
    }
}

//Default Functions

fn default_timeout_secs() -> u64 {
    30
}

fn default_interpreter_program() -> String {
    "python3".to_string()
}

fn default_prelude() -> Vec<String> {
    vec![
        "import pandas as pd".to_string(),
        "import numpy as np".to_string(),
        "from collections import defaultdict".to_string(),
    ]
}

fn default_logic_program() -> String {
    "souffle".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let cfg = ExecutionConfig::default_config();
        assert_eq!(cfg.execution.timeout_secs, 30);
        assert_eq!(cfg.execution.timeout(), Duration::from_secs(30));
        assert!(cfg.execution.work_root.is_none());
        assert_eq!(cfg.interpreter.program, "python3");
        assert_eq!(cfg.interpreter.prelude.len(), 3);
        assert_eq!(cfg.logic.program, "souffle");
        assert!(cfg.logic.args.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg = ExecutionConfig::from_json_str(
            r#"{ "execution": { "timeout_secs": 5 }, "logic": { "program": "/opt/souffle/bin/souffle" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.execution.timeout_secs, 5);
        assert_eq!(cfg.logic.program, "/opt/souffle/bin/souffle");
        assert_eq!(cfg.interpreter.program, "python3");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("execution.json");
        fs::write(&path, r#"{ "interpreter": { "prelude": [] } }"#).unwrap();
        let cfg = ExecutionConfig::load(&path).unwrap();
        assert!(cfg.interpreter.prelude.is_empty());

        let missing = ExecutionConfig::load(&dir.path().join("nope.json"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = ExecutionConfig::from_json_str(r#"{ "execution": { "timeout_secs": "oops" } }"#)
            .unwrap_err();
        assert!(err.starts_with("Invalid execution config JSON"));
    }
}
