// thumbpick/src/sources/process.rs
use crate::core::ctx::RequestCtx;
use crate::core::{Result, ThumbError};
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on any single external generation; a hung tool must not
/// block the caller indefinitely.
pub const PROCESS_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Locates `name` on the search path. Absence is tolerated here and
/// reported lazily on first use instead of failing startup.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            log::info!("{} found at {}", name, candidate.display());
            return Some(candidate);
        }
    }
    log::warn!("{} not found on PATH", name);
    None
}

fn drain(mut reader: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        // A read failure here surfaces as truncated output and is
        // caught by the caller's parsing.
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn kill(child: &mut Child, tool: &'static str) {
    if let Err(err) = child.kill() {
        log::warn!("failed to kill {}: {}", tool, err);
    }
    let _ = child.wait();
}

/// Runs an external tool to completion, bounded by the request context
/// and by `PROCESS_TIMEOUT`, and returns its standard output. Non-zero
/// exits come back as a single descriptive error carrying the exit code
/// and captured stderr.
pub fn run<I, S>(ctx: &RequestCtx, tool: &'static str, binary: &Path, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let timeout = ctx
        .remaining()
        .map_or(PROCESS_TIMEOUT, |left| left.min(PROCESS_TIMEOUT));

    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .map(drain)
        .ok_or_else(|| ThumbError::Io(format!("{}: no stdout pipe", tool)))?;
    let stderr = child
        .stderr
        .take()
        .map(drain)
        .ok_or_else(|| ThumbError::Io(format!("{}: no stderr pipe", tool)))?;

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if ctx.is_cancelled() {
            kill(&mut child, tool);
            return Err(ThumbError::Cancelled);
        }
        if start.elapsed() >= timeout {
            kill(&mut child, tool);
            return Err(ThumbError::ProcessTimeout {
                tool,
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let out = stdout
        .join()
        .map_err(|_| ThumbError::Io(format!("{}: stdout reader panicked", tool)))?;
    let err = stderr
        .join()
        .map_err(|_| ThumbError::Io(format!("{}: stderr reader panicked", tool)))?;

    if !status.success() {
        return Err(ThumbError::ProcessFailed {
            tool,
            code: status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&err).trim().to_string(),
        });
    }

    Ok(out)
}
