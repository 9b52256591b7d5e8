//! Extension → language classification.
//!
//! The coordinator only needs to know *which* language a path belongs to
//! well enough to route it to the language-parser collaborator and to
//! decide whether it is a structured-config language for the size-gate in
//! §4.4 item 3. It never interprets a parser's output beyond that — the
//! per-language tree-sitter grammars themselves are an external
//! collaborator (§1, §6).

/// Coarse language classification, mirroring the teacher's
/// `scanner::language_detect::Language` extension-sniffing approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    CSharp,
    Ruby,
    Php,
    Kotlin,
    Cpp,
    C,
    Swift,
    Scala,
    Json,
    Yaml,
    Toml,
    Markdown,
    PlainText,
    Other,
}

/// Broad role a language plays for size-gating and chunk-kind defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageClass {
    /// Source code, parsed into function/class/method-shaped chunks.
    Source,
    /// JSON/YAML/TOML/etc — parsed into key/block-shaped chunks, subject to
    /// the `config_file_size_threshold_kb` gate (§4.4 item 3).
    StructuredConfig,
    /// Prose, parsed into paragraph-shaped chunks.
    Text,
}

impl Language {
    /// Resolve a language from a lowercased file extension (without the dot).
    /// Returns `None` for extensions with no known mapping (§4.4 item 2:
    /// "unknown → skipped(\"unknown\")").
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        let ext = ext?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "rs" => Self::Rust,
            "py" | "pyi" => Self::Python,
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "go" => Self::Go,
            "java" => Self::Java,
            "cs" => Self::CSharp,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "kt" | "kts" => Self::Kotlin,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Self::Cpp,
            "c" | "h" => Self::C,
            "swift" => Self::Swift,
            "scala" => Self::Scala,
            "json" | "jsonc" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "md" | "markdown" => Self::Markdown,
            "txt" => Self::PlainText,
            _ => return None,
        })
    }

    /// §4.4 item 3 classification: which languages are subject to the
    /// structured-config size gate.
    pub fn class(self) -> LanguageClass {
        match self {
            Self::Json | Self::Yaml | Self::Toml => LanguageClass::StructuredConfig,
            Self::Markdown | Self::PlainText => LanguageClass::Text,
            _ => LanguageClass::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Java => "java",
            Self::CSharp => "csharp",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Kotlin => "kotlin",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::Swift => "swift",
            Self::Scala => "scala",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_extensions() {
        assert_eq!(Language::from_extension(Some("rs")), Some(Language::Rust));
        assert_eq!(Language::from_extension(Some("PY")), Some(Language::Python));
        assert_eq!(Language::from_extension(Some("weird")), None);
    }

    #[test]
    fn classifies_structured_config() {
        assert_eq!(Language::Json.class(), LanguageClass::StructuredConfig);
        assert_eq!(Language::Rust.class(), LanguageClass::Source);
    }
}
