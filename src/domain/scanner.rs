//! Line classifier and per-section line grammars for the outline format.
//!
//! ```text
//! name: CS10
//! term: Fall 2023
//! orientation: left to right
//! start date: 2023 08 23
//! styles:
//!   name: core, shape: box, style: filled, fillcolor: #3A73A5
//! end
//! class levels:
//!   First Steps: #dddddd
//! end
//! student levels:
//!   First Steps: #dddddd
//! end
//! nodes:
//!     Abstraction [core, Week1]
//!         Functions [core, Week2]
//! end
//! ```
//!
//! Directives and section headers are recognized at column 0 only.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::entities::{Level, Orientation, Style};

/// Spaces per nesting level in the `nodes:` section.
pub const INDENT_UNIT: usize = 4;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^name: ([A-Za-z0-9\-_]+)").expect("name regex"));
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^term: ([A-Za-z0-9]+) ([0-9]+)").expect("term regex"));
static ORIENTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^orientation: ([A-Za-z]+) to ([A-Za-z]+)").expect("orientation regex")
});
static START_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^start date: (\d{4}) (\d{2}) (\d{2})").expect("start date regex")
});
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"name: ([A-Za-z0-9]+), shape: ([A-Za-z]+), style: ([A-Za-z]+), fillcolor: #([A-Za-z0-9]+)",
    )
    .expect("style regex")
});
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_\-][A-Za-z_\-\s]*?): #([A-Za-z0-9]+)").expect("level regex")
});
static NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s+)([A-Za-z0-9\-\s\\/]+?) \[([A-Za-z0-9]+), Week([0-9]+)\]")
        .expect("node regex")
});

/// Active section of the scanner state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    None,
    Style,
    ClassLevel,
    StudentLevel,
    Node,
}

/// What a raw source line is, judged by its column-0 prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Name,
    Term,
    Orientation,
    StartDate,
    /// Section header switching the parse mode
    Section(ParseMode),
    /// `end` terminator
    End,
    /// Anything else: a section body line, or ignorable text outside sections
    Body,
}

pub fn classify(line: &str) -> LineKind {
    if line.starts_with("styles:") {
        LineKind::Section(ParseMode::Style)
    } else if line.starts_with("class levels:") {
        LineKind::Section(ParseMode::ClassLevel)
    } else if line.starts_with("student levels:") {
        LineKind::Section(ParseMode::StudentLevel)
    } else if line.starts_with("nodes:") {
        LineKind::Section(ParseMode::Node)
    } else if line.starts_with("end") {
        LineKind::End
    } else if line.starts_with("name:") {
        LineKind::Name
    } else if line.starts_with("term:") {
        LineKind::Term
    } else if line.starts_with("orientation:") {
        LineKind::Orientation
    } else if line.starts_with("start date:") {
        LineKind::StartDate
    } else {
        LineKind::Body
    }
}

pub fn parse_name(line: &str) -> Option<String> {
    NAME_RE.captures(line).map(|c| c[1].to_string())
}

/// `term: Fall 2023` → `"Fall 2023"`
pub fn parse_term(line: &str) -> Option<String> {
    TERM_RE
        .captures(line)
        .map(|c| format!("{} {}", &c[1], &c[2]))
}

pub fn parse_orientation(line: &str) -> Option<Orientation> {
    ORIENTATION_RE
        .captures(line)
        .map(|c| Orientation::from_words(&c[1], &c[2]))
}

/// `start date: 2023 08 23`; None also for impossible calendar dates.
pub fn parse_start_date(line: &str) -> Option<NaiveDate> {
    let caps = START_DATE_RE.captures(line)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_style(line: &str) -> Option<(String, Style)> {
    STYLE_RE.captures(line).map(|c| {
        (
            c[1].to_string(),
            Style {
                shape: c[2].to_string(),
                style: c[3].to_string(),
                fillcolor: format!("#{}", &c[4]),
            },
        )
    })
}

/// `<name>: #<hex>` palette line. The color is not checked for length here;
/// text after the color is ignored.
pub fn parse_level(line: &str) -> Option<Level> {
    LEVEL_RE.captures(line).map(|c| Level {
        name: c[1].to_string(),
        color: format!("#{}", &c[2]),
    })
}

/// One line of the `nodes:` section. Text after the closing `]` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLine {
    /// Leading whitespace in units of [`INDENT_UNIT`], rounded down
    pub depth: usize,
    pub label: String,
    pub style: String,
    pub week: u32,
}

pub fn parse_node(line: &str) -> Option<NodeLine> {
    let caps = NODE_RE.captures(line)?;
    Some(NodeLine {
        depth: caps[1].chars().count() / INDENT_UNIT,
        label: caps[2].to_string(),
        style: caps[3].to_string(),
        week: caps[4].parse().ok()?,
    })
}
