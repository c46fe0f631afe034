//! Drives the `gitloader` binary end to end.
//!
//! Argument and validation checks run everywhere. Tests that talk to a
//! remote use a local bare repository and return early without `git`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn gitloader() -> Command {
    let mut cmd = Command::cargo_bin("gitloader").expect("gitloader binary");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn bare_remote(root: &Path) -> PathBuf {
    let remote = root.join("remote.git");
    fs::create_dir_all(&remote).unwrap();
    git(&remote, &["init", "--bare", "--quiet"]);
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    remote
}

fn source_folder(root: &Path) -> PathBuf {
    let source = root.join("proj");
    fs::create_dir_all(source.join("src")).unwrap();
    fs::write(source.join("README.md"), "# proj\n").unwrap();
    fs::write(source.join("src/main.txt"), "body\n").unwrap();
    source
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn push_without_token_names_the_missing_field() {
    let work = TempDir::new().unwrap();
    gitloader()
        .arg("push")
        .arg(work.path())
        .args(["--remote", "https://example.invalid/r.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please fill all fields"))
        .stderr(predicate::str::contains("token"));
}

#[test]
fn push_from_missing_folder_is_rejected() {
    let work = TempDir::new().unwrap();
    gitloader()
        .arg("push")
        .arg(work.path().join("nope"))
        .args(["--remote", "https://example.invalid/r.git", "--token", "T"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn unknown_mode_is_a_usage_error() {
    let work = TempDir::new().unwrap();
    gitloader()
        .arg("push")
        .arg(work.path())
        .args(["--remote", "r", "--token", "T", "--mode", "merge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode 'merge'"));
}

#[test]
fn clone_without_url_is_rejected() {
    let work = TempDir::new().unwrap();
    gitloader()
        .arg("clone")
        .arg("")
        .arg(work.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote"));
}

// ---------------------------------------------------------------------------
// Against a bare remote
// ---------------------------------------------------------------------------

#[test]
fn push_then_repeat_reports_no_changes() {
    if !git_available() {
        return;
    }
    let work = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let remote = bare_remote(work.path());
    let source = source_folder(work.path());

    gitloader()
        .arg("--scratch-dir")
        .arg(scratch.path())
        .arg("push")
        .arg(&source)
        .arg("--remote")
        .arg(&remote)
        .args(["--token", "T"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloning repository..."))
        .stdout(predicate::str::contains("Push successful!"));

    let tree = git(&remote, &["ls-tree", "-r", "--name-only", "main"]);
    assert_eq!(tree.lines().collect::<Vec<_>>(), vec!["README.md", "src/main.txt"]);
    assert!(fs::read_dir(scratch.path()).unwrap().next().is_none());

    gitloader()
        .arg("--scratch-dir")
        .arg(scratch.path())
        .arg("push")
        .arg(&source)
        .arg("--remote")
        .arg(&remote)
        .args(["--token", "T"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes to commit."))
        .stdout(predicate::str::contains("Push successful!").not());
}

#[test]
fn json_output_streams_events_then_outcome() {
    if !git_available() {
        return;
    }
    let work = TempDir::new().unwrap();
    let remote = bare_remote(work.path());
    let source = source_folder(work.path());

    let output = gitloader()
        .arg("push")
        .arg(&source)
        .arg("--remote")
        .arg(&remote)
        .args(["--token-stdin", "--replace", "--json"])
        .write_stdin("T\n")
        .output()
        .expect("run gitloader");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let lines: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    let phases: Vec<&str> = lines
        .iter()
        .filter_map(|v| v["phase"].as_str())
        .collect();
    assert_eq!(phases.first(), Some(&"preparing"));
    assert!(phases.contains(&"replacing"));
    assert_eq!(phases.last(), Some(&"done"));

    let outcome = lines.last().unwrap();
    assert_eq!(outcome["outcome"], "pushed");
    assert_eq!(outcome["commit_message"], "Pushed folder proj via Git Loader");
}

#[test]
fn push_to_missing_remote_fails_with_git_error() {
    if !git_available() {
        return;
    }
    let work = TempDir::new().unwrap();
    let source = source_folder(work.path());

    gitloader()
        .arg("push")
        .arg(&source)
        .arg("--remote")
        .arg(work.path().join("absent.git"))
        .args(["--token", "T"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Git error occurred."));
}

#[test]
fn clone_writes_checkout() {
    if !git_available() {
        return;
    }
    let work = TempDir::new().unwrap();
    let remote = bare_remote(work.path());
    let dest = work.path().join("checkout");

    gitloader()
        .arg("clone")
        .arg(&remote)
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Clone successful!"));
    assert!(dest.join(".git").is_dir());
}
