//! Process isolation for timeout-eligible parses (§4.4, §9 "Process
//! isolation for timeouts"). Killing an in-process parser thread is
//! unsafe, so a timeout-eligible file is parsed by re-executing the
//! current binary in a child process that communicates its one result
//! over a pipe; the parent enforces the wall-clock bound.
//!
//! The calling binary (CLI entry point, outside this crate's scope per §1)
//! is expected to call [`run_as_child_if_requested`] near the top of
//! `main`, before it does anything else expensive — if this process was
//! launched as a parse child, that call parses the one requested file and
//! exits, never returning.

use super::registry::ParserRegistry;
use chunkhound_core::errors::ParseError;
use chunkhound_core::types::{FileId, Language, ParsedFileResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

pub const CHILD_ENV_VAR: &str = "CHUNKHOUND_PARSE_CHILD";
pub const PATH_ENV_VAR: &str = "CHUNKHOUND_PARSE_PATH";
pub const FILE_ID_ENV_VAR: &str = "CHUNKHOUND_PARSE_FILE_ID";
pub const LANGUAGE_ENV_VAR: &str = "CHUNKHOUND_PARSE_LANGUAGE";

/// If this process was launched as a parse child (the three `CHUNKHOUND_
/// PARSE_*` env vars are set), parses the named file with `registry`,
/// writes the `ParsedFileResult` to stdout as one JSON line, and exits.
/// Otherwise returns `false` immediately.
pub fn run_as_child_if_requested(registry: &dyn ParserRegistry) -> bool {
    let (Ok(path), Ok(file_id_raw), Ok(language_raw)) = (
        std::env::var(PATH_ENV_VAR),
        std::env::var(FILE_ID_ENV_VAR),
        std::env::var(LANGUAGE_ENV_VAR),
    ) else {
        return false;
    };
    if std::env::var(CHILD_ENV_VAR).as_deref() != Ok("1") {
        return false;
    }

    let path = PathBuf::from(path);
    let file_id = FileId(file_id_raw.parse().unwrap_or(0));
    let language: Language = serde_json::from_str(&language_raw).unwrap_or(Language::Other);

    let result = parse_in_current_process(&path, file_id, language, registry);
    let line = serde_json::to_string(&result).unwrap_or_else(|e| {
        serde_json::to_string(&ParsedFileResult::error(path, result.size, result.mtime, e.to_string())).unwrap()
    });
    println!("{line}");
    std::process::exit(0);
}

fn stat(path: &Path) -> (u64, f64) {
    let metadata = std::fs::metadata(path).ok();
    let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
    let mtime = metadata
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    (size, mtime)
}

fn parse_in_current_process(
    path: &Path,
    file_id: FileId,
    language: Language,
    registry: &dyn ParserRegistry,
) -> ParsedFileResult {
    let (size, mtime) = stat(path);
    let Some(parser) = registry.get(language) else {
        return ParsedFileResult::skipped(path.to_path_buf(), size, mtime, "unknown");
    };
    let source = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return ParsedFileResult::error(path.to_path_buf(), size, mtime, e.to_string()),
    };
    match parser.parse_file(path, &source, file_id) {
        Ok(chunks) => ParsedFileResult::success(path.to_path_buf(), language, chunks, size, mtime),
        Err(e) => ParsedFileResult::error(path.to_path_buf(), size, mtime, e.to_string()),
    }
}

/// Spawns the current binary as a parse child for `path` and waits up to
/// `timeout`, polling rather than blocking so the wall-clock bound is
/// exact. A timeout kills the child and returns `skipped("timeout")`; the
/// child's own parse errors propagate as `ParseError::ParserFailed` via the
/// JSON payload it printed before exiting (if any).
pub fn parse_in_child(
    path: &Path,
    file_id: FileId,
    language: Language,
    timeout: Duration,
    size: u64,
    mtime: f64,
) -> Result<ParsedFileResult, ParseError> {
    let current_exe = std::env::current_exe().map_err(|e| ParseError::WorkerCrashed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let language_json = serde_json::to_string(&language).unwrap_or_else(|_| "\"other\"".to_string());

    let mut child = Command::new(current_exe)
        .env(CHILD_ENV_VAR, "1")
        .env(PATH_ENV_VAR, path)
        .env(FILE_ID_ENV_VAR, file_id.0.to_string())
        .env(LANGUAGE_ENV_VAR, language_json)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| ParseError::WorkerCrashed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let start = Instant::now();
    let poll_interval = Duration::from_millis(20);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let mut stdout = String::new();
                if let Some(mut out) = child.stdout.take() {
                    let _ = out.read_to_string(&mut stdout);
                }
                if !status.success() {
                    return Err(ParseError::WorkerCrashed {
                        path: path.to_path_buf(),
                        message: format!("child exited with {status}"),
                    });
                }
                return serde_json::from_str(stdout.trim()).map_err(|e| ParseError::WorkerCrashed {
                    path: path.to_path_buf(),
                    message: format!("malformed child output: {e}"),
                });
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(ParsedFileResult::skipped(
                        path.to_path_buf(),
                        size,
                        mtime,
                        "timeout",
                    ));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(ParseError::WorkerCrashed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }
    }
}
