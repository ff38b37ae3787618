//! Domain entities: the parsed outline and its palettes

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::arena::ConceptArena;

/// One entry of a class-level or student-level palette.
///
/// Position in the palette is the mastery level index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub color: String,
}

/// Visual attributes of one style-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub shape: String,
    pub style: String,
    pub fillcolor: String,
}

/// Layout direction of the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Orientation {
    /// Only "left to right" is LR; every other direction pair is RL.
    pub fn from_words(from: &str, to: &str) -> Self {
        if from == "left" && to == "right" {
            Self::LeftToRight
        } else {
            Self::RightToLeft
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::LeftToRight => "LR",
            Self::RightToLeft => "RL",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of scanning one outline source: scalar directives, palettes,
/// style table and the concept tree.
#[derive(Debug, Default)]
pub struct Outline {
    pub name: String,
    pub term: String,
    pub orientation: Orientation,
    pub start_date: Option<NaiveDate>,
    pub styles: BTreeMap<String, Style>,
    pub class_levels: Vec<Level>,
    pub student_levels: Vec<Level>,
    pub tree: ConceptArena,
}

impl Outline {
    /// Number of nodes created, root included.
    pub fn count(&self) -> usize {
        self.tree.len()
    }

    /// Start date as `M/D/YYYY` without zero padding, empty when absent.
    pub fn formatted_start_date(&self) -> String {
        self.start_date
            .map(|d| d.format("%-m/%-d/%Y").to_string())
            .unwrap_or_default()
    }
}
