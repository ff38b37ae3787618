//! Mastery assignment over a loaded outline document.
//!
//! Two independent workflows fill the derived `student_level` and
//! `class_level` fields. Neither touches tree structure.
//!
//! - Positional: one digit per leaf in traversal order; internal nodes take
//!   the floor of the mean of their direct children.
//! - Name-keyed: leaves look up a named level by their label; internal class
//!   levels are the true (fractional) mean of their children.

use std::collections::BTreeMap;
use std::fmt;
use std::str::Chars;

use tracing::{debug, instrument};

use crate::domain::document::{ClassLevel, NodeDocument};
use crate::domain::error::{DomainError, DomainResult};

/// Named mastery vocabulary used by mastery payloads, in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MasteryLevel {
    FirstSteps,
    NeedsPractice,
    InProgress,
    AlmostThere,
    Mastered,
}

impl MasteryLevel {
    pub const ALL: [MasteryLevel; 5] = [
        Self::FirstSteps,
        Self::NeedsPractice,
        Self::InProgress,
        Self::AlmostThere,
        Self::Mastered,
    ];

    /// Case-insensitive lookup; anything unrecognized is `FirstSteps`.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.name() == lowered)
            .unwrap_or(Self::FirstSteps)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstSteps => "first steps",
            Self::NeedsPractice => "needs practice",
            Self::InProgress => "in progress",
            Self::AlmostThere => "almost there",
            Self::Mastered => "mastered",
        }
    }

    pub fn index(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that a positional mastery string holds only ASCII digits.
pub fn validate_digits(what: &str, mastery: &str) -> DomainResult<()> {
    if let Some(c) = mastery.chars().find(|c| !c.is_ascii_digit()) {
        return Err(DomainError::InvalidMastery {
            reason: format!("{what} mastery {mastery:?} contains non-digit {c:?}"),
        });
    }
    Ok(())
}

/// Leaf digits consumed in traversal order; exhausted input yields level 0.
struct DigitStream<'a> {
    digits: Chars<'a>,
    level_count: usize,
}

impl DigitStream<'_> {
    fn next_level(&mut self) -> u32 {
        let max = self.level_count.saturating_sub(1) as u32;
        self.digits
            .next()
            .and_then(|c| c.to_digit(10))
            .map_or(0, |d| d.min(max))
    }
}

/// Assign positional mastery levels across the tree rooted at `root`.
///
/// Returns the root's `(student_level, class_level)`.
#[instrument(level = "debug", skip(root))]
pub fn assign_positional(
    root: &mut NodeDocument,
    student_level_count: usize,
    class_level_count: usize,
    student_mastery: &str,
    class_mastery: &str,
) -> DomainResult<(u32, u32)> {
    validate_digits("student", student_mastery)?;
    validate_digits("class", class_mastery)?;

    let mut student = DigitStream {
        digits: student_mastery.chars(),
        level_count: student_level_count,
    };
    let mut class = DigitStream {
        digits: class_mastery.chars(),
        level_count: class_level_count,
    };
    Ok(assign_node_levels(root, &mut student, &mut class))
}

fn assign_node_levels(
    node: &mut NodeDocument,
    student: &mut DigitStream<'_>,
    class: &mut DigitStream<'_>,
) -> (u32, u32) {
    let (student_level, class_level) = if node.is_leaf() {
        (student.next_level(), class.next_level())
    } else {
        let children = node.children.as_deref_mut().unwrap_or(&mut []);
        let levels: Vec<(u32, u32)> = children
            .iter_mut()
            .map(|child| assign_node_levels(child, student, class))
            .collect();
        let n = levels.len() as u32;
        let student_sum: u32 = levels.iter().map(|(s, _)| s).sum();
        let class_sum: u32 = levels.iter().map(|(_, c)| c).sum();
        (student_sum / n, class_sum / n)
    };

    node.student_level = Some(student_level);
    node.class_level = Some(ClassLevel::Index(class_level));
    (student_level, class_level)
}

/// Set every leaf's `student_level` from a label → level-name map.
/// Leaves without an entry get level 0; internal nodes are left alone.
pub fn update_node_mastery(node: &mut NodeDocument, mastery: &BTreeMap<String, String>) {
    if node.is_leaf() {
        let level = mastery
            .get(&node.name)
            .map_or(MasteryLevel::FirstSteps, |name| MasteryLevel::from_name(name));
        node.student_level = Some(level.index());
        return;
    }
    for child in node.children.iter_mut().flatten() {
        update_node_mastery(child, mastery);
    }
}

/// Recompute `class_level` bottom-up as the arithmetic mean of the children.
///
/// A leaf's class level is its own student level. Returns the value stored
/// on `node`.
pub fn calculate_class_level(node: &mut NodeDocument) -> f64 {
    if node.is_leaf() {
        let level = node.student_level.unwrap_or(0);
        node.class_level = Some(ClassLevel::Index(level));
        return f64::from(level);
    }

    let children = node.children.as_deref_mut().unwrap_or(&mut []);
    let levels: Vec<f64> = children.iter_mut().map(calculate_class_level).collect();
    let mean = levels.iter().sum::<f64>() / levels.len() as f64;
    node.class_level = Some(ClassLevel::Mean(mean));
    mean
}

/// Full name-keyed workflow: initialise every node's levels positionally
/// (all zero), apply `mastery` to the leaves, then aggregate class levels.
#[instrument(level = "debug", skip(root, mastery), fields(entries = mastery.len()))]
pub fn apply_mastery_map(
    root: &mut NodeDocument,
    student_level_count: usize,
    class_level_count: usize,
    mastery: &BTreeMap<String, String>,
) -> DomainResult<f64> {
    assign_positional(root, student_level_count, class_level_count, "0", "")?;
    update_node_mastery(root, mastery);
    let mean = calculate_class_level(root);
    debug!(root_class_level = mean, "applied mastery map");
    Ok(mean)
}
