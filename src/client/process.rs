//! Blocking subprocess execution with an optional wall-clock limit.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output is still collected after a timed-out child is killed
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Captured result of a finished (or killed) child process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the process was killed or ended by a signal
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    /// Last few lines of stderr, for error messages
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Render a command line for logs and artifacts
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| {
        let arg = a.to_string_lossy();
        if arg.contains(char::is_whitespace) {
            format!("{:?}", arg)
        } else {
            arg.into_owned()
        }
    }));
    parts.join(" ")
}

/// Run a command to completion, killing it once `timeout` elapses
///
/// Errors only when the process cannot be spawned or waited on. A timeout or
/// non-zero exit is reported through [`ProcessOutput`].
pub fn run(cmd: &mut Command, timeout: Option<Duration>) -> Result<ProcessOutput> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let started = Instant::now();

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;

    // Drain both pipes on their own threads so a chatty child can't block on a full pipe
    let stdout_reader = PipeReader::spawn(child.stdout.take());
    let stderr_reader = PipeReader::spawn(child.stderr.take());

    let (exit_code, timed_out) = wait(&mut child, timeout, started)
        .with_context(|| format!("Failed to wait for {}", program))?;
    let elapsed = started.elapsed();

    // A killed child's own children may still hold the pipes open, so after a
    // timeout only wait briefly and keep what has arrived.
    let deadline = if timed_out {
        Some(Instant::now() + DRAIN_GRACE)
    } else {
        None
    };
    let stdout = PipeReader::finish(stdout_reader, deadline);
    let stderr = PipeReader::finish(stderr_reader, deadline);

    tracing::debug!(
        program = %program,
        ?exit_code,
        timed_out,
        elapsed_ms = elapsed.as_millis() as u64,
        "process finished"
    );

    Ok(ProcessOutput {
        stdout,
        stderr,
        exit_code,
        timed_out,
        elapsed,
    })
}

fn wait(child: &mut Child, timeout: Option<Duration>, started: Instant) -> Result<(Option<i32>, bool)> {
    let Some(limit) = timeout else {
        let status = child.wait()?;
        return Ok((status.code(), false));
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status.code(), false));
        }
        if started.elapsed() >= limit {
            // kill fails only if the child already exited; wait reaps it either way
            let _ = child.kill();
            child.wait()?;
            return Ok((None, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Background reader that appends a pipe's bytes to a shared buffer
struct PipeReader {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Self> {
        pipe.map(|mut pipe| {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&buf);
            let handle = thread::spawn(move || {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
                    }
                }
            });
            Self { buf, handle }
        })
    }

    /// Collect the output, joining the reader unless `deadline` passes first
    ///
    /// A reader still blocked at the deadline is detached; it exits once the
    /// last process holding the pipe does.
    fn finish(reader: Option<Self>, deadline: Option<Instant>) -> String {
        let Some(reader) = reader else {
            return String::new();
        };
        match deadline {
            None => {
                let _ = reader.handle.join();
            }
            Some(deadline) => {
                while !reader.handle.is_finished() && Instant::now() < deadline {
                    thread::sleep(POLL_INTERVAL);
                }
                if reader.handle.is_finished() {
                    let _ = reader.handle.join();
                }
            }
        }
        let bytes = reader.buf.lock();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout_and_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo hello; echo oops >&2; exit 3"]);
        let out = run(&mut cmd, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr_tail(1), "oops");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.timed_out);
        assert!(!out.success());
    }

    #[test]
    fn test_run_kills_on_timeout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);
        let started = Instant::now();
        let out = run(&mut cmd, Some(Duration::from_millis(200))).unwrap();
        assert!(out.timed_out);
        assert_eq!(out.exit_code, None);
        assert!(out.elapsed < Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_timeout_not_held_open_by_grandchild() {
        // The shell forks `sleep`, which keeps stdout open after the shell is killed
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo early; sleep 4; echo late"]);
        let started = Instant::now();
        let out = run(&mut cmd, Some(Duration::from_millis(200))).unwrap();
        assert!(out.timed_out);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(out.stdout.trim(), "early");
    }

    #[test]
    fn test_run_without_timeout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf done"]);
        let out = run(&mut cmd, None).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "done");
    }

    #[test]
    fn test_run_missing_binary_is_error() {
        let mut cmd = Command::new("/nonexistent/definitely-not-a-binary");
        let err = run(&mut cmd, None).unwrap_err();
        assert!(err.to_string().contains("Failed to start"));
    }

    #[test]
    fn test_describe_quotes_whitespace() {
        let mut cmd = Command::new("llama");
        cmd.args(["-p", "two words", "-s", "2025"]);
        assert_eq!(describe(&cmd), "llama -p \"two words\" -s 2025");
    }
}
