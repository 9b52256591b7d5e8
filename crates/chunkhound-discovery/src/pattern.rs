//! Pattern matcher (§4.1): three glob dialects over forward-slash relative
//! paths. Each matcher holds a pattern cache mapping glob string to a
//! compiled form, compiled once and reused across the whole traversal —
//! grounded on the teacher's `ParseCache` keyed-cache idiom
//! (`drift-analysis/src/parsers/cache.rs`), here keyed by pattern text
//! instead of content hash.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One compiled dialect. Which variant a pattern compiles to is decided
/// once, by its shape, in [`compile`].
enum Compiled {
    /// `**/NAME/**` — matches any path with a segment equal to `NAME`.
    SegmentWildcard { segment: Regex },
    /// `**/REST` — matches the full path, REST alone against the full
    /// path, and REST alone against the filename.
    RootPrefix {
        full: Regex,
        tail: Regex,
        filename: Regex,
    },
    /// Any other pattern — matches the full relative path or the filename.
    Generic { full: Regex, filename: Regex },
}

pub struct PatternMatcher {
    cache: Mutex<HashMap<String, Arc<Compiled>>>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// No include patterns means everything is included (§4.2: discovery
    /// only needs to escape exclude/gitignore patterns in that case).
    pub fn included(&self, path: &str, patterns: &[String]) -> bool {
        patterns.is_empty() || patterns.iter().any(|p| self.matches(p, path))
    }

    pub fn excluded(&self, path: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|p| self.matches(p, path))
    }

    /// Used for subtree pruning: `dir` is the directory's own relative
    /// path, tested the same way a file path would be.
    pub fn excluded_dir(&self, dir: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|p| self.matches(p, dir))
    }

    fn matches(&self, pattern: &str, path: &str) -> bool {
        let filename = path.rsplit('/').next().unwrap_or(path);
        let compiled = self.compiled(pattern);
        match &*compiled {
            Compiled::SegmentWildcard { segment } => path.split('/').any(|seg| segment.is_match(seg)),
            Compiled::RootPrefix { full, tail, filename: fname_re } => {
                full.is_match(path) || tail.is_match(path) || fname_re.is_match(filename)
            }
            Compiled::Generic { full, filename: fname_re } => full.is_match(path) || fname_re.is_match(filename),
        }
    }

    fn compiled(&self, pattern: &str) -> Arc<Compiled> {
        if let Some(hit) = self.cache.lock().unwrap().get(pattern) {
            return hit.clone();
        }
        let compiled = Arc::new(compile(pattern));
        self.cache.lock().unwrap().insert(pattern.to_string(), compiled.clone());
        compiled
    }
}

fn compile(pattern: &str) -> Compiled {
    if let Some(name) = segment_wildcard_name(pattern) {
        return Compiled::SegmentWildcard {
            segment: glob_to_regex(&name),
        };
    }
    if let Some(rest) = pattern.strip_prefix("**/") {
        return Compiled::RootPrefix {
            full: glob_to_regex(pattern),
            tail: glob_to_regex(rest),
            filename: glob_to_regex(rest),
        };
    }
    Compiled::Generic {
        full: glob_to_regex(pattern),
        filename: glob_to_regex(pattern),
    }
}

/// Recognizes the `**/NAME/**` shape, where `NAME` is a single path
/// segment (no further `/`).
fn segment_wildcard_name(pattern: &str) -> Option<String> {
    let rest = pattern.strip_prefix("**/")?;
    let name = rest.strip_suffix("/**")?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name.to_string())
}

/// Glob → fullmatch regex: `**` matches any sequence including `/`, `*`
/// matches any sequence excluding `/`, `?` matches one non-`/` character,
/// everything else is escaped literally.
fn glob_to_regex(glob: &str) -> Regex {
    let mut out = String::from("^");
    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 1;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    Regex::new(&out).unwrap_or_else(|_| Regex::new(r"\A\z").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_wildcard_matches_any_depth() {
        let m = PatternMatcher::new();
        let patterns = vec!["**/build/**".to_string()];
        assert!(m.excluded("build/out.o", &patterns));
        assert!(m.excluded("src/build/out.o", &patterns));
        assert!(!m.excluded("src/builder/out.o", &patterns));
    }

    #[test]
    fn root_prefix_matches_full_path_tail_and_filename() {
        let m = PatternMatcher::new();
        let patterns = vec!["**/*.pyc".to_string()];
        assert!(m.excluded("a.pyc", &patterns));
        assert!(m.excluded("pkg/sub/a.pyc", &patterns));
        assert!(!m.excluded("pkg/sub/a.py", &patterns));
    }

    #[test]
    fn generic_pattern_matches_full_path_or_filename() {
        let m = PatternMatcher::new();
        let patterns = vec!["*.md".to_string()];
        assert!(m.excluded("README.md", &patterns));
        assert!(m.excluded("docs/guide.md", &patterns));
    }

    #[test]
    fn empty_include_patterns_include_everything() {
        let m = PatternMatcher::new();
        assert!(m.included("anything.rs", &[]));
    }

    #[test]
    fn excluded_dir_prunes_by_directory_path() {
        let m = PatternMatcher::new();
        let patterns = vec!["**/node_modules/**".to_string()];
        assert!(m.excluded_dir("node_modules", &patterns));
        assert!(m.excluded_dir("pkg/node_modules", &patterns));
        assert!(!m.excluded_dir("pkg/src", &patterns));
    }
}
