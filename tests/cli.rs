//! Integration tests for the `md2docx` binary.
//!
//! None of these need pandoc: they cover argument handling and the paths
//! that finish before a converter is required.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a CLI command with a clean environment.
fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_md2docx"));
    cmd.env_remove("RUST_LOG").env_remove("PANDOC_PATH");
    cmd
}

#[test]
fn test_only_input_is_a_usage_error() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg(dir.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(
            "Either specify both input and output, or neither",
        ));
}

#[test]
fn test_nonexistent_input_is_reported() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg(dir.path().join("missing"))
        .arg(dir.path().join("out"))
        .arg("--no-progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_default_folders_are_created() {
    let dir = TempDir::new().unwrap();

    cli()
        .current_dir(dir.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("No Markdown files found in folder 'x-INPUT'"));

    assert!(dir.path().join("x-INPUT").is_dir());
    assert!(dir.path().join("x-OUTPUT").is_dir());
}

#[test]
fn test_empty_folder_is_nothing_to_do() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("notes.txt"), "plain").unwrap();

    cli()
        .arg(input.path())
        .arg(output.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("No Markdown files found"))
        .stderr(predicate::str::contains("Output directory for converted documents"));
}

#[test]
fn test_single_non_markdown_file() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let txt = input.path().join("notes.txt");
    fs::write(&txt, "plain").unwrap();

    cli()
        .arg(&txt)
        .arg(output.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("is not a Markdown file."));

    cli()
        .arg(&txt)
        .arg(output.path())
        .args(["--no-progress", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1/1 documents failed to convert"));
}

#[test]
fn test_dry_run_json_shows_rewritten_markdown() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("Local.PNG"), b"png").unwrap();
    fs::write(
        input.path().join("page.md"),
        "![a](https://h/local.png)\n![b](https://h/remote.png)\n",
    )
    .unwrap();

    let assert = cli()
        .arg(input.path())
        .arg(output.path().join("out"))
        .args(["--dry-run", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let doc = &report[0];
    assert_eq!(doc["images"]["embedded"], 1);
    assert_eq!(doc["images"]["placeholders"], 1);
    let markdown = doc["markdown"].as_str().unwrap();
    assert!(markdown.contains("Local.PNG"));
    assert!(markdown.contains("[CLICK TO VIEW ONLINE IMAGE: (b)](https://h/remote.png)"));

    // Dry run converts nothing and creates nothing.
    assert!(!output.path().join("out").exists());
}

#[test]
fn test_help_mentions_placeholder_link() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CLICK TO VIEW ONLINE IMAGE"));
}
