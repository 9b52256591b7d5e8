//! A language-parser registry, grounded on the teacher's
//! `ParserManager` (`drift-analysis/src/parsers/manager.rs`) — routing a
//! `Language` to the collaborator object that owns it, rather than hosting
//! per-language logic here.

use chunkhound_core::traits::LanguageParser;
use chunkhound_core::types::Language;
use rustc_hash::FxHashMap;

pub trait ParserRegistry: Send + Sync {
    fn get(&self, language: Language) -> Option<&dyn LanguageParser>;
}

/// The straightforward registry: one boxed parser per language, supplied
/// by whoever wires up the concrete tree-sitter collaborators (§1, §6).
#[derive(Default)]
pub struct MapParserRegistry {
    parsers: FxHashMap<Language, Box<dyn LanguageParser>>,
}

impl MapParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, language: Language, parser: Box<dyn LanguageParser>) {
        self.parsers.insert(language, parser);
    }
}

impl ParserRegistry for MapParserRegistry {
    fn get(&self, language: Language) -> Option<&dyn LanguageParser> {
        self.parsers.get(&language).map(|p| p.as_ref())
    }
}
