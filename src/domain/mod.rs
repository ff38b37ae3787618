//! Domain layer: outline parsing, serialization and mastery aggregation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod document;
pub mod entities;
pub mod error;
pub mod guard;
pub mod mastery;
pub mod scanner;
pub mod schema;

pub use arena::{ConceptArena, ConceptData, ConceptNode};
pub use builder::OutlineParser;
pub use document::{ClassLevel, NodeDocument, OutlineDocument, RenderMode};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use mastery::MasteryLevel;

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~` for the home directory.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
