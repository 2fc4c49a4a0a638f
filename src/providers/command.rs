use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{FacterError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run an external utility and return its stdout. The child is killed if
/// it has not exited within `timeout`; a non-zero exit is an error.
pub fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let cmdline = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };
    trace!(command = %cmdline, "Running command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| FacterError::CommandExecution(format!("failed to start {}: {}", cmdline, e)))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| FacterError::CommandExecution(format!("no stdout for {}", cmdline)))?;

    // Drain stdout on a separate thread so the child never blocks on a full pipe
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        buf
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return Err(FacterError::CommandTimeout {
                    command: cmdline,
                    timeout_secs: timeout.as_secs_f64(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(FacterError::CommandExecution(format!(
                    "error waiting for {}: {}",
                    cmdline, e
                )));
            }
        }
    };

    let output = reader
        .join()
        .map_err(|_| FacterError::CommandExecution(format!("reader thread panicked for {}", cmdline)))?;

    if !status.success() {
        return Err(FacterError::CommandExecution(format!(
            "{} exited with {}",
            cmdline, status
        )));
    }

    Ok(String::from_utf8_lossy(&output).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = run_command("echo", &["hello"], Duration::from_secs(5)).unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let err = run_command("false", &[], Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FacterError::CommandExecution(_)));
    }

    #[test]
    fn test_missing_program_is_error() {
        let err = run_command("definitely-not-a-real-binary-1234", &[], Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FacterError::CommandExecution(_)));
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let err = run_command("sleep", &["10"], Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, FacterError::CommandTimeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
