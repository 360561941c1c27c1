use bench::commands::{Verdict, show, verify_task};
use serial_test::serial;
use std::fs;
use util::execution_config::ExecutionConfig;
use util::languages::LanguageCatalog;
use util::relation::{Relation, Scalar};
use util::test_helpers::{setup_test_data_root, write_program_file, write_task_file};

const TASK: &str = r#"{
    "id": "total",
    "category": "aggregation",
    "description": "Sum of all x",
    "plan": [{"id": "sum", "description": "add up x"}],
    "sample_input": {"t": [{"x": 1}, {"x": 2}, {"x": 3}]},
    "sample_output": 6
}"#;

fn program(language: &str, implementation: &str, author: &str, source: &str) -> String {
    serde_json::json!({
        "task": "total",
        "language": language,
        "implementation": implementation,
        "author": author,
        "source": source,
        "plan": {"sum": [{"line": 0, "start": 7, "end": 13}]}
    })
    .to_string()
}

#[tokio::test]
#[serial]
async fn test_verify_stored_programs() {
    let root = setup_test_data_root();
    write_task_file(root.path(), "total", TASK);
    write_program_file(
        root.path(),
        "total",
        "sql_basic_ann.json",
        &program("sql", "basic", "ann", "SELECT SUM(x) FROM t"),
    );
    write_program_file(
        root.path(),
        "total",
        "sql_wrong_bob.json",
        &program("sql", "wrong", "bob", "SELECT MAX(x) FROM t"),
    );
    write_program_file(
        root.path(),
        "total",
        "sql_anon_.json",
        &program("sql", "anon", "", "SELECT SUM(x) FROM t"),
    );
    write_program_file(
        root.path(),
        "total",
        "cobol_x_dan.json",
        &program("cobol", "x", "dan", "ADD X TO TOTAL."),
    );

    let outcomes = verify_task(
        "total",
        &[],
        &LanguageCatalog::default(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();

    let verdicts: Vec<(&str, Verdict)> = outcomes
        .iter()
        .map(|o| (o.program.as_str(), o.verdict))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("cobol_x_dan.json", Verdict::Error),
            ("sql_anon_.json", Verdict::Error),
            ("sql_basic_ann.json", Verdict::Pass),
            ("sql_wrong_bob.json", Verdict::Fail),
        ]
    );

    assert_eq!(outcomes[0].message.as_deref(), Some("cobol is not a valid language"));
    assert_eq!(outcomes[1].message.as_deref(), Some("Author must not be empty"));
    assert_eq!(
        outcomes[3].actual,
        Some(Relation::single_column("0", vec![Scalar::Int(3)]))
    );
    assert!(outcomes[3].message.as_deref().unwrap().contains("expected 6, got 3"));
}

#[tokio::test]
#[serial]
async fn test_verify_explicit_program_file() {
    let root = setup_test_data_root();
    write_task_file(root.path(), "total", TASK);
    let path = root.path().join("mine.json");
    fs::write(&path, program("sql", "basic", "eve", "SELECT SUM(x) FROM t")).unwrap();

    let outcomes = verify_task(
        "total",
        &[path],
        &LanguageCatalog::default(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].program, "mine.json");
    assert!(outcomes[0].passed());
}

#[tokio::test]
#[serial]
async fn test_verify_missing_task() {
    let _root = setup_test_data_root();
    let err = verify_task(
        "nope",
        &[],
        &LanguageCatalog::default(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Task file not found"));
}

#[tokio::test]
#[serial]
async fn test_show_prints_unverified_result() {
    let root = setup_test_data_root();
    write_task_file(root.path(), "total", TASK);
    let path = root.path().join("rows.json");
    fs::write(&path, program("sql", "rows", "eve", "SELECT x, x * x AS sq FROM t")).unwrap();

    let table = show(
        "total",
        &path,
        &LanguageCatalog::default(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();

    assert_eq!(table.columns(), ["x", "sq"]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows()[2], vec![Scalar::Int(3), Scalar::Int(9)]);
}
