//! `ctxb bundle` against a shell script standing in for gopls.
//!
//! Kept as a single test: writing an executable while another test thread
//! forks can make the exec fail with ETXTBSY.
#![cfg(unix)]

mod util;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;
use util::{make_go_fixture, write_fake_gopls};

const FULL_TEXT: &str = "package main

func main() { sum := add(3, 4); fmt.Println(sum) }

// --- dependencies (2) ---

// Adds two numbers
func add(a, b int) int { return a + b }

// Println formats using the default formats.
func Println(a ...any) (n int, err error) {
\treturn Fprintln(os.Stdout, a...)
}
";

fn ctxb(tmp: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ctxb").expect("bin");
    cmd.current_dir(tmp.path());
    cmd
}

#[test]
fn bundle_through_fake_gopls() {
    // Resolvable: both dependencies, plain text
    let full = make_go_fixture();
    let script = write_fake_gopls(&full, true);
    full.child("ctxbundle.toml")
        .write_str(&format!("[oracle]\nprogram = \"{}\"\n", script.display()))
        .expect("write config");

    ctxb(&full)
        .args(["--no-color", "bundle", "--file", "main.go", "--function", "main"])
        .assert()
        .success()
        .stdout(FULL_TEXT)
        .stderr(predicate::str::contains("skipped").not());

    // Println unresolvable: skipped with a diagnostic, JSON still produced
    let partial = make_go_fixture();
    let script = write_fake_gopls(&partial, false);

    let out = ctxb(&partial)
        .env("CTXBUNDLE__ORACLE__PROGRAM", &script)
        .args(["--no-color", "bundle", "-f", "main.go", "-n", "main", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped fmt.Println"))
        .get_output()
        .stdout
        .clone();

    let v: Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(v["namespace"], "main");
    assert_eq!(v["target"]["name"], "main");
    assert_eq!(v["dependencies"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(v["diagnostics"][0]["site"], "fmt.Println");
    assert_eq!(v["diagnostics"][0]["code"], "ctxbundle::resolution");

    // --quiet silences the diagnostic
    ctxb(&partial)
        .env("CTXBUNDLE__ORACLE__PROGRAM", &script)
        .args(["--quiet", "--no-color", "bundle", "-f", "main.go", "-n", "main"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
