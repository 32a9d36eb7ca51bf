//! Boundary to the external point/range resolution tool.
//!
//! `SourceOracle` is the seam the engine depends on; `GoplsOracle` drives the
//! real language server CLI through `run_with_deadline`.

use std::process::Command;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument};

use crate::infra::config::OracleConfig;
use crate::infra::process::{CancelToken, OracleError, run_with_deadline};

/// Textual query/response protocol of the resolution tool
pub trait SourceOracle: Send + Sync {
    /// `request` is `<path>:<line>:<column>` (1-based); returns the raw
    /// single-line answer `<path>:<line>:<colStart>-<colEnd>: <text>`
    fn definition(&self, request: &str, cancel: &CancelToken) -> Result<String, OracleError>;

    /// Newline separated `<rowStart>:<colStart>-<rowEnd>:<colEnd>` entries
    fn folding_ranges(&self, path: &Utf8Path, cancel: &CancelToken)
    -> Result<String, OracleError>;
}

/// `gopls definition` / `gopls folding_ranges` as subprocesses
#[derive(Debug, Clone)]
pub struct GoplsOracle {
    program: String,
    definition_subcommand: String,
    folding_subcommand: String,
    timeout: Duration,
    workdir: Option<Utf8PathBuf>,
}

impl GoplsOracle {
    pub fn from_config(cfg: &OracleConfig) -> Self {
        Self {
            program: cfg.program_path(),
            definition_subcommand: cfg.definition_subcommand.clone(),
            folding_subcommand: cfg.folding_subcommand.clone(),
            timeout: Duration::from_millis(cfg.timeout_ms),
            workdir: None,
        }
    }

    /// Run queries from inside the project so the module gets indexed
    pub fn with_workdir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    fn query(&self, subcommand: &str, arg: &str, cancel: &CancelToken) -> Result<String, OracleError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand).arg(arg);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        debug!("{} {} {}", self.program, subcommand, arg);
        let out = run_with_deadline(cmd, self.timeout, cancel)?;

        if !out.status.success() {
            return Err(OracleError::Exit {
                program: format!("{} {}", self.program, subcommand),
                status: out.status.to_string(),
                stderr: out.stderr.trim().to_string(),
            });
        }

        Ok(out.stdout)
    }
}

impl SourceOracle for GoplsOracle {
    #[instrument(skip(self, cancel))]
    fn definition(&self, request: &str, cancel: &CancelToken) -> Result<String, OracleError> {
        self.query(&self.definition_subcommand, request, cancel)
    }

    #[instrument(skip(self, cancel))]
    fn folding_ranges(
        &self,
        path: &Utf8Path,
        cancel: &CancelToken,
    ) -> Result<String, OracleError> {
        self.query(&self.folding_subcommand, path.as_str(), cancel)
    }
}
