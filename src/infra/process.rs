//! Subprocess execution with a deadline and cooperative cancellation.
//!
//! The child is polled with `try_wait`; on expiry or cancellation it is
//! killed and reaped. stdout/stderr are drained on helper threads so a chatty
//! child never blocks on a full pipe. The same deadline bounds the pipe
//! reads, since a backgrounded grandchild can hold them open after the
//! child exits.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared flag checked between call sites and while waiting on a child
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why an external query produced no usable stdout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("failed to start {program}: {detail}")]
    Spawn { program: String, detail: String },

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} timed out after {}ms", .after.as_millis())]
    Timeout { program: String, after: Duration },

    #[error("{program} was cancelled")]
    Cancelled { program: String },
}

/// Captured result of a finished child
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `cmd` to completion, killing it when `timeout` passes or `cancel` fires
pub fn run_with_deadline(
    mut cmd: Command,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<ProcessOutput, OracleError> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| OracleError::Spawn {
            program: program.clone(),
            detail: e.to_string(),
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                reap(&mut child, &program);
                return Err(OracleError::Spawn {
                    program,
                    detail: e.to_string(),
                });
            }
        }

        if cancel.is_cancelled() {
            debug!("cancelling {program}");
            reap(&mut child, &program);
            return Err(OracleError::Cancelled { program });
        }

        if Instant::now() >= deadline {
            warn!("{program} exceeded {}ms, killing", timeout.as_millis());
            reap(&mut child, &program);
            return Err(OracleError::Timeout {
                program,
                after: timeout,
            });
        }

        thread::sleep(POLL_INTERVAL);
    };

    let (Some(stdout), Some(stderr)) = (collect(stdout, deadline), collect(stderr, deadline))
    else {
        warn!(
            "{program} exited but its output stayed open past {}ms",
            timeout.as_millis()
        );
        return Err(OracleError::Timeout {
            program,
            after: timeout,
        });
    };

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut r| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = r.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// `None` when the pipe is still open at `deadline`
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<String> {
    let Some(rx) = rx else {
        return Some(String::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(String::from_utf8_lossy(&buf).into_owned()),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn reap(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        debug!("kill {program}: {e}");
    }
    let _ = child.wait();
}
