use crate::config::AppConfig;
use std::{fs, path::Path};
use tempfile::TempDir;

/// Creates a unique temporary directory and points the data root at it for
/// the duration of the test. The directory is removed when the returned
/// `TempDir` is dropped.
///
/// Keep the returned `TempDir` in scope for as long as you need the files.
pub fn setup_test_data_root() -> TempDir {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let abs = tmp
        .path()
        .canonicalize()
        .unwrap_or_else(|_| tmp.path().to_path_buf());
    AppConfig::set_data_dir(abs.to_string_lossy().into_owned());
    tmp
}

/// Writes `{root}/tasks/{id}.json`.
pub fn write_task_file(root: &Path, id: &str, json: &str) {
    let dir = root.join("tasks");
    fs::create_dir_all(&dir).expect("failed to create tasks dir");
    fs::write(dir.join(format!("{id}.json")), json).expect("failed to write task file");
}

/// Writes `{root}/programs/{task}/{file_name}`.
pub fn write_program_file(root: &Path, task: &str, file_name: &str, json: &str) {
    let dir = root.join("programs").join(task);
    fs::create_dir_all(&dir).expect("failed to create programs dir");
    fs::write(dir.join(file_name), json).expect("failed to write program file");
}
