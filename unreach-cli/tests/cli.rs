//! End-to-end CLI tests: runs the real `unreach` binary against a small
//! on-disk project and index snapshot, exercising argument validation,
//! exit codes, and the two stdout report blocks (§6, §7).

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_project(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("Sources")).unwrap();
    fs::write(
        dir.join("Sources/App.swift"),
        r"
public func used() {}

func dead() {}
",
    )
    .unwrap();
}

fn write_index(index_dir: &std::path::Path, project_dir: &std::path::Path) {
    let source_file = project_dir.join("Sources/App.swift");
    let snapshot = serde_json::json!({
        "occurrences": [
            {
                "target_usr": "s:used",
                "symbol_name": "used()",
                "symbol_kind": "function",
                "file": source_file,
                "line": 2,
                "column": 1,
                "roles": ["definition", "canonical"],
                "relations": []
            },
            {
                "target_usr": "s:dead",
                "symbol_name": "dead()",
                "symbol_kind": "function",
                "file": source_file,
                "line": 4,
                "column": 1,
                "roles": ["definition", "canonical"],
                "relations": []
            }
        ]
    });
    fs::write(
        index_dir.join("index.json"),
        serde_json::to_string(&snapshot).unwrap(),
    )
    .unwrap();
}

#[test]
fn reports_dead_function_and_exits_zero() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let index = tempfile::tempdir().unwrap();
    write_index(index.path(), project.path());

    Command::cargo_bin("unreach")
        .unwrap()
        .arg(project.path())
        .arg("--index-store-path")
        .arg(index.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ Found 1 potentially unused symbols:"))
        .stdout(predicate::str::contains("dead"));
}

#[test]
fn missing_project_path_exits_nonzero() {
    let index = tempfile::tempdir().unwrap();

    Command::cargo_bin("unreach")
        .unwrap()
        .arg("/no/such/project/path")
        .arg("--index-store-path")
        .arg(index.path())
        .assert()
        .failure()
        .code(1);
}

#[test]
fn missing_index_store_path_exits_nonzero() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());

    Command::cargo_bin("unreach")
        .unwrap()
        .arg(project.path())
        .arg("--index-store-path")
        .arg("/no/such/index/path")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn dump_symbols_exits_before_graph_building() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let index = tempfile::tempdir().unwrap();
    write_index(index.path(), project.path());

    Command::cargo_bin("unreach")
        .unwrap()
        .arg(project.path())
        .arg("--index-store-path")
        .arg(index.path())
        .arg("--dump-symbols")
        .assert()
        .success()
        .stdout(predicate::str::contains("used"))
        .stdout(predicate::str::contains("dead"))
        .stdout(predicate::str::contains("-> s:"));
}
