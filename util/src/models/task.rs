use crate::paths::task_path;
use crate::relation::{Output, SampleInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path};

/// One step of a task's reference plan.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Plan {
    pub id: String,
    pub description: String,
}

/// A named problem with sample input relations and one expected answer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plan: Vec<Plan>,
    #[serde(default)]
    pub sample_input: SampleInput,
    /// Any JSON shape; see [`Output::from_json`].
    #[serde(default)]
    pub sample_output: Value,
}

impl Task {
    pub fn new(id: &str, sample_input: SampleInput, sample_output: Value) -> Self {
        Self {
            id: id.to_string(),
            category: String::new(),
            description: String::new(),
            plan: Vec::new(),
            sample_input,
            sample_output,
        }
    }

    /// The expected answer in its tagged shape.
    pub fn expected_output(&self) -> Output {
        Output::from_json(self.sample_output.clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Task id must not be empty".to_string());
        }
        if self.sample_output.is_null() {
            return Err(format!("Task '{}' has no sample output", self.id));
        }
        Ok(())
    }

    /// Reads `{DATA_DIR}/tasks/{id}.json`.
    pub fn load(id: &str) -> Result<Self, String> {
        Self::from_path(&task_path(id))
    }

    pub fn from_path(path: &Path) -> Result<Self, String> {
        use std::io::ErrorKind;

        let s = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => format!("Task file not found: {path:?}"),
            ErrorKind::PermissionDenied => format!("Permission denied reading {path:?}"),
            _ => format!("Failed to read task file {path:?} ({})", e.kind()),
        })?;
        serde_json::from_str::<Task>(&s).map_err(|e| format!("Invalid task JSON in {path:?}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Scalar;
    use crate::test_helpers::{setup_test_data_root, write_task_file};
    use serial_test::serial;

    const SUM_TASK: &str = r#"{
        "id": "total",
        "category": "aggregation",
        "description": "Sum every x",
        "plan": [{"id": "sum", "description": "add them up"}],
        "sample_input": {"t": [{"x": 1}, {"x": 2}, {"x": 3}]},
        "sample_output": 6
    }"#;

    #[test]
    #[serial]
    fn test_load_task_from_data_root() {
        let tmp = setup_test_data_root();
        write_task_file(tmp.path(), "total", SUM_TASK);

        let task = Task::load("total").unwrap();
        assert_eq!(task.id, "total");
        assert_eq!(task.plan.len(), 1);
        assert_eq!(task.sample_input["t"][2]["x"], Scalar::Int(3));
        assert_eq!(task.expected_output(), Output::Scalar(Scalar::Int(6)));
        assert!(task.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_missing_task_file() {
        let _tmp = setup_test_data_root();
        let err = Task::load("ghost").unwrap_err();
        assert!(err.starts_with("Task file not found"));
    }

    #[test]
    fn test_validate_requires_sample_output() {
        let task: Task = serde_json::from_str(r#"{"id": "t", "sample_input": {}}"#).unwrap();
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_relation_order_is_preserved() {
        let task: Task = serde_json::from_str(
            r#"{"id": "t", "sample_input": {"zeta": [], "alpha": []}, "sample_output": []}"#,
        )
        .unwrap();
        let names: Vec<&str> = task.sample_input.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
