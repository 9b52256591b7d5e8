//! # chunkhound-discovery
//!
//! The pattern matcher (§4.1) and discovery walker (§4.2): turns a root
//! directory plus include/exclude patterns into a deterministic, sorted
//! list of files, applying layered `.gitignore` semantics along the way.

pub mod gitignore;
pub mod pattern;
pub mod walker;

pub use pattern::PatternMatcher;
pub use walker::{discover, DiscoveredFile, DiscoveryConfig, DiscoveryReport, SubtreeError};
