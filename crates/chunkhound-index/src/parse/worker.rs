//! Parse worker (§4.4): one file, in five steps — stat, resolve language,
//! gate oversized structured-config files, isolate timeout-eligible
//! parses in a child process, attach the resulting chunks.

use super::isolated::parse_in_child;
use super::registry::ParserRegistry;
use chunkhound_core::types::{FileId, Language, LanguageClass, ParsedFileResult};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ParseWorkerConfig {
    pub per_file_timeout_seconds: f64,
    pub per_file_timeout_min_size_kb: u64,
    pub config_file_size_threshold_kb: u64,
}

impl ParseWorkerConfig {
    fn timeouts_enabled(&self) -> bool {
        self.per_file_timeout_seconds > 0.0
    }
}

/// Parses one file per §4.4's five steps. `registry` is only consulted for
/// in-process parses; isolated parses re-invoke the current binary, which
/// must consult an equivalent registry via
/// [`super::isolated::run_as_child_if_requested`] at startup.
pub fn parse_one(path: &Path, file_id: FileId, registry: &dyn ParserRegistry, cfg: &ParseWorkerConfig) -> ParsedFileResult {
    let metadata = match path.metadata() {
        Ok(m) => m,
        Err(e) => return ParsedFileResult::error(path.to_path_buf(), 0, 0.0, format!("stat failed: {e}")),
    };
    let size = metadata.len();
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let Some(language) = Language::from_extension(path.extension().and_then(|e| e.to_str())) else {
        return ParsedFileResult::skipped(path.to_path_buf(), size, mtime, "unknown");
    };

    if language.class() == LanguageClass::StructuredConfig {
        let size_kb = size / 1024;
        if size_kb > cfg.config_file_size_threshold_kb {
            return ParsedFileResult::skipped(path.to_path_buf(), size, mtime, "large_config_file");
        }
    }

    let size_kb = size / 1024;
    if cfg.timeouts_enabled() && size_kb >= cfg.per_file_timeout_min_size_kb {
        let timeout = Duration::from_secs_f64(cfg.per_file_timeout_seconds);
        return match parse_in_child(path, file_id, language, timeout, size, mtime) {
            Ok(result) => result,
            Err(e) => ParsedFileResult::error(path.to_path_buf(), size, mtime, e.to_string()),
        };
    }

    parse_in_process(path, file_id, language, size, mtime, registry)
}

fn parse_in_process(
    path: &Path,
    file_id: FileId,
    language: Language,
    size: u64,
    mtime: f64,
    registry: &dyn ParserRegistry,
) -> ParsedFileResult {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chunkhound_core::testing::LineChunkParser;
    use chunkhound_core::types::FileStatus;

    fn registry() -> super::super::registry::MapParserRegistry {
        let mut reg = super::super::registry::MapParserRegistry::new();
        reg.register(Language::Python, Box::new(LineChunkParser::default()));
        reg
    }

    fn cfg() -> ParseWorkerConfig {
        ParseWorkerConfig {
            per_file_timeout_seconds: 0.0,
            per_file_timeout_min_size_kb: 128,
            config_file_size_threshold_kb: 20,
        }
    }

    #[test]
    fn unknown_extension_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xyz");
        std::fs::write(&path, "contents").unwrap();
        let result = parse_one(&path, FileId(1), &registry(), &cfg());
        assert_eq!(result.status, FileStatus::Skipped);
        assert_eq!(result.reason.as_deref(), Some("unknown"));
    }

    #[test]
    fn oversized_structured_config_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        std::fs::write(&path, "x".repeat(21 * 1024)).unwrap();
        let mut c = cfg();
        c.config_file_size_threshold_kb = 20;
        let result = parse_one(&path, FileId(1), &registry(), &c);
        assert_eq!(result.status, FileStatus::Skipped);
        assert_eq!(result.reason.as_deref(), Some("large_config_file"));
    }

    #[test]
    fn known_language_without_registered_parser_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "def f(): return 1\n").unwrap();
        let empty = super::super::registry::MapParserRegistry::new();
        let result = parse_one(&path, FileId(1), &empty, &cfg());
        assert_eq!(result.status, FileStatus::Skipped);
        assert_eq!(result.reason.as_deref(), Some("unknown"));
    }

    #[test]
    fn successful_parse_attaches_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "def f(): return 1\n").unwrap();
        let result = parse_one(&path, FileId(1), &registry(), &cfg());
        assert_eq!(result.status, FileStatus::Success);
        assert_eq!(result.chunks.len(), 1);
    }
}
