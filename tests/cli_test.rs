use std::fs::{read_dir, write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

fn listing(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = read_dir(directory)
        .expect("Failed to read directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn clips() -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    for i in 1..=3 {
        write(temp_dir.path().join(format!("clip-{i}.mp4")), "x").unwrap();
    }
    temp_dir
}

fn renumber(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("renumber").expect("binary should be built");
    cmd.arg("--config")
        .arg(config_dir.path().join("none.yaml"))
        .arg("--quiet");
    cmd
}

#[test]
fn test_yes_renames_every_group() {
    let media = clips();
    let config_dir = tempdir().unwrap();

    renumber(&config_dir)
        .arg("--yes")
        .arg(media.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary:"))
        .stdout(predicate::str::contains("Files moved:         3"));

    assert_eq!(
        listing(media.path()),
        vec!["clip01.mp4", "clip02.mp4", "clip03.mp4"]
    );
}

#[test]
fn test_dry_run_leaves_files_alone() {
    let media = clips();
    let config_dir = tempdir().unwrap();

    renumber(&config_dir)
        .args(["--yes", "--dry"])
        .arg(media.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned renames:"))
        .stdout(predicate::str::contains("clip03.mp4"));

    assert_eq!(
        listing(media.path()),
        vec!["clip-1.mp4", "clip-2.mp4", "clip-3.mp4"]
    );
}

#[test]
fn test_prompt_answers_come_from_stdin() {
    let media = clips();
    let config_dir = tempdir().unwrap();

    renumber(&config_dir)
        .args(["--example", "a", "--append"])
        .arg(media.path())
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Groups renamed:      1"));

    assert_eq!(
        listing(media.path()),
        vec!["clipa.mp4", "clipb.mp4", "clipc.mp4"]
    );
}

#[test]
fn test_skipping_at_the_prompt() {
    let media = clips();
    let config_dir = tempdir().unwrap();

    renumber(&config_dir)
        .arg(media.path())
        .write_stdin("s\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Groups skipped:      1"));

    assert_eq!(listing(media.path()).len(), 3);
    assert!(listing(media.path()).contains(&"clip-1.mp4".to_string()));
}

#[test]
fn test_inverted_window_is_rejected() {
    let media = clips();
    let config_dir = tempdir().unwrap();

    renumber(&config_dir)
        .args(["--yes", "--min", "5"])
        .arg(media.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("search_window"));

    assert_eq!(listing(media.path()).len(), 3);
}

#[test]
fn test_unknown_example_is_rejected() {
    let config_dir = tempdir().unwrap();

    renumber(&config_dir)
        .args(["--yes", "--example", "1a", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output example"));
}
