//! Process execution with a deadline.
//!
//! Every external tool auscout calls (ffprobe, avprobe, mediainfo, ffmpeg)
//! goes through [`run_with_timeout`]. Both output pipes are drained on
//! reader threads while the caller polls for exit, so a chatty tool can never
//! block on a full pipe.

use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};

/// Interval between `try_wait` polls.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Renders a command as a single shell-like line for logs and errors.
pub fn describe_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            // A read error just truncates what we keep.
            let _ = source.read_to_end(&mut buf);
        }
        buf
    })
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Failed to kill child process: {}", e);
    }
    if let Err(e) = child.wait() {
        log::debug!("Failed to reap child process: {}", e);
    }
}

/// Runs `cmd` to completion, killing it if it outlives `timeout`.
///
/// Stdout and stderr are captured. A non-zero exit status is reported as
/// [`CoreError::CommandFailed`] carrying the captured stderr; a missed
/// deadline as [`CoreError::CommandTimeout`], with whatever output had been
/// collected discarded.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> CoreResult<Output> {
    let cmd_line = describe_command(cmd);
    let program = cmd.get_program().to_string_lossy().into_owned();
    log::debug!("Running: {}", cmd_line);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::DependencyNotFound(program)
            } else {
                command_start_error(cmd_line.clone(), e)
            }
        })?;

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    log::warn!("Command timed out after {:?}: {}", timeout, cmd_line);
                    kill_and_reap(&mut child);
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Err(CoreError::CommandTimeout(cmd_line, timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_and_reap(&mut child);
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(command_wait_error(cmd_line, e));
            }
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    if !status.success() {
        let stderr_text = String::from_utf8_lossy(&stderr).trim().to_string();
        log::debug!("Command failed ({}): {}", status, cmd_line);
        return Err(command_failed_error(cmd_line, status, stderr_text));
    }

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}
