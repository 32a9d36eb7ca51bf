//! Shared test utilities for integration tests
//!
//! Provides Go fixtures and a scripted oracle used across multiple test
//! files. Not every helper is used by every test binary.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use assert_fs::prelude::*;
use camino::{Utf8Path, Utf8PathBuf};
use ctxbundle::infra::{CancelToken, OracleError, SourceOracle};

pub const MAIN_GO: &str = "package main

import \"fmt\"

// Adds two numbers
func add(a, b int) int { return a + b }

func main() { sum := add(3, 4); fmt.Println(sum) }
";

pub const PRINT_GO: &str = "package fmt

// Println formats using the default formats.
func Println(a ...any) (n int, err error) {
\treturn Fprintln(os.Stdout, a...)
}
";

/// main.go at the root, fmt/print.go below it
pub fn make_go_fixture() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("main.go")
        .write_str(MAIN_GO)
        .expect("write main.go");
    tmp.child("fmt/print.go")
        .write_str(PRINT_GO)
        .expect("write print.go");
    tmp
}

pub fn utf8(path: &std::path::Path) -> Utf8PathBuf
{
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("utf8 path")
}

/// In-memory oracle: definitions keyed by the `line:col` tail of the
/// request, folding ranges keyed by path. Records every query.
#[derive(Default)]
pub struct ScriptedOracle
{
    definitions: HashMap<String, String>,
    folds: HashMap<Utf8PathBuf, String>,
    pub definition_calls: Mutex<Vec<String>>,
    pub folding_calls: Mutex<Vec<Utf8PathBuf>>,
}

impl ScriptedOracle
{
    pub fn define(
        mut self,
        at: &str,
        answer: impl Into<String>,
    ) -> Self
    {
        self.definitions
            .insert(at.to_string(), answer.into());
        self
    }

    pub fn fold(
        mut self,
        path: &Utf8Path,
        ranges: &str,
    ) -> Self
    {
        self.folds
            .insert(path.to_path_buf(), ranges.to_string());
        self
    }

    pub fn folding_call_count(&self) -> usize
    {
        self.folding_calls
            .lock()
            .unwrap()
            .len()
    }

    pub fn definition_call_count(&self) -> usize
    {
        self.definition_calls
            .lock()
            .unwrap()
            .len()
    }
}

fn line_col(request: &str) -> String
{
    let mut parts: Vec<&str> = request
        .rsplitn(3, ':')
        .take(2)
        .collect();
    parts.reverse();
    parts.join(":")
}

impl SourceOracle for ScriptedOracle
{
    fn definition(
        &self,
        request: &str,
        _cancel: &CancelToken,
    ) -> Result<String, OracleError>
    {
        self.definition_calls
            .lock()
            .unwrap()
            .push(request.to_string());

        self.definitions
            .get(&line_col(request))
            .cloned()
            .ok_or_else(|| OracleError::Exit {
                program: "gopls definition".into(),
                status: "exit status: 1".into(),
                stderr: "no identifier found".into(),
            })
    }

    fn folding_ranges(
        &self,
        path: &Utf8Path,
        _cancel: &CancelToken,
    ) -> Result<String, OracleError>
    {
        self.folding_calls
            .lock()
            .unwrap()
            .push(path.to_path_buf());
        Ok(self
            .folds
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}

/// Shell script standing in for gopls; answers for the MAIN_GO fixture.
/// `println` controls whether `fmt.Println` resolves.
#[cfg(unix)]
pub fn write_fake_gopls(
    tmp: &assert_fs::TempDir,
    println: bool,
) -> std::path::PathBuf
{
    use std::os::unix::fs::PermissionsExt;

    let main = tmp
        .path()
        .join("main.go");
    let print = tmp
        .path()
        .join("fmt/print.go");
    let println_arm = if println
    {
        format!(
            "    *:8:37) echo \"{}:4:6-13: defined here as func fmt.Println(a ...any) (n int, err error)\" ;;\n",
            print.display()
        )
    }
    else
    {
        String::new()
    };

    let script = format!(
        "#!/bin/sh
case \"$1\" in
definition)
  case \"$2\" in
    *:8:22) echo \"{main}:6:6-9: defined here as func add(a int, b int) int\" ;;
{println_arm}    *) echo \"gopls: no identifier found\" >&2; exit 1 ;;
  esac ;;
folding_ranges)
  case \"$2\" in
    *print.go) echo \"4:42-6:1\" ;;
    *) echo \"8:13-8:50\" ;;
  esac ;;
*) exit 2 ;;
esac
",
        main = main.display(),
    );

    let path = tmp
        .path()
        .join("fake-gopls");
    std::fs::write(&path, script).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}
