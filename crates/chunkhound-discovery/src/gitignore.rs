//! `.gitignore` translation into this crate's pattern dialect (§4.1).
//!
//! Negation (`!`) is intentionally unsupported — out of scope per the
//! gitignore-exactness design note. Anything else a gitignore file can
//! express (anchoring, directory-only, plain recursive patterns) is
//! translated into the three dialects `pattern.rs` compiles.

use std::fs;
use std::path::Path;

/// Read one `.gitignore` file and translate every line, anchoring
/// relative patterns to `anchor_dir` — the ignore file's own directory,
/// relative to the discovery root, forward-slash, no trailing slash
/// (empty string for the root's own `.gitignore`).
pub fn load_gitignore(path: &Path, anchor_dir: &str) -> Vec<String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .filter_map(parse_line)
        .flat_map(|pattern| translate(&pattern, anchor_dir))
        .collect()
}

fn parse_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }
    Some(trimmed.to_string())
}

/// Translate one raw gitignore pattern into zero or more dialect patterns.
fn translate(pattern: &str, anchor_dir: &str) -> Vec<String> {
    let mut pat = pattern;
    let anchored = pat.starts_with('/');
    if anchored {
        pat = &pat[1..];
    }
    let dir_only = pat.len() > 1 && pat.ends_with('/');
    if dir_only {
        pat = &pat[..pat.len() - 1];
    }

    if anchored {
        let full = if anchor_dir.is_empty() {
            pat.to_string()
        } else {
            format!("{anchor_dir}/{pat}")
        };
        if dir_only {
            vec![full.clone(), format!("{full}/**")]
        } else {
            vec![full]
        }
    } else if dir_only {
        vec![format!("**/{pat}"), format!("**/{pat}/**")]
    } else {
        vec![format!("**/{pat}"), format!("{pat}/**")]
    }
}
