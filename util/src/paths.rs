use crate::config;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Data root (absolute), from `config::data_dir()`.
/// If relative in env, resolve against current_dir().
pub fn data_root() -> PathBuf {
    let p = PathBuf::from(config::data_dir());
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

// ─── Tasks ──────────────────────────────────────────────────────────

// {DATA_DIR}/tasks
pub fn tasks_dir() -> PathBuf {
    data_root().join("tasks")
}

// {DATA_DIR}/tasks/{task_id}.json
pub fn task_path(task_id: &str) -> PathBuf {
    tasks_dir().join(format!("{task_id}.json"))
}

// ─── Programs ───────────────────────────────────────────────────────

// {DATA_DIR}/programs/{task_id}
pub fn programs_dir(task_id: &str) -> PathBuf {
    data_root().join("programs").join(task_id)
}

// {DATA_DIR}/programs/{task_id}/{file_name}
pub fn program_path(task_id: &str, file_name: &str) -> PathBuf {
    programs_dir(task_id).join(file_name)
}

// ─── Languages ──────────────────────────────────────────────────────

// {DATA_DIR}/languages
pub fn languages_dir() -> PathBuf {
    data_root().join("languages")
}
