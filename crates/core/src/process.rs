//! Shared helper for running external tools.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Failure to obtain any exit status from a tool.
#[derive(Debug)]
pub(crate) enum ToolRunError {
    /// The binary could not be found.
    NotFound,
    /// The tool ran past its deadline and was killed.
    Timeout,
    /// Any other spawn or wait failure.
    Io(std::io::Error),
}

/// Turns a configured seconds value into an optional limit; zero means unlimited.
pub(crate) fn limit_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Runs `program` to completion, capturing stdout and stderr.
///
/// The child is killed when the deadline passes.
pub(crate) async fn run_tool<I, S>(
    program: &Path,
    args: I,
    limit: Option<Duration>,
) -> Result<Output, ToolRunError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let run = command.output();
    let result = match limit {
        Some(limit) => match timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => return Err(ToolRunError::Timeout),
        },
        None => run.await,
    };

    result.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolRunError::NotFound
        } else {
            ToolRunError::Io(e)
        }
    })
}

/// Last few lines of a tool's stderr, for error messages.
pub(crate) fn stderr_tail(stderr: &[u8], max_lines: usize) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let start = lines.len().saturating_sub(max_lines);
    Some(lines[start..].join("\n"))
}
