//! conceptmap: concept-mastery outlines
//!
//! Parses the line-oriented outline format into a concept tree, serializes it
//! as a schema-checked JSON document and aggregates student and class mastery
//! over that document.
//!
//! Layers, innermost first: [`domain`] (pure parsing and aggregation),
//! [`application`] (services over the filesystem boundary),
//! [`infrastructure`] (real I/O and wiring), [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
