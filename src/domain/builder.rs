//! Outline parse session: drives the scanner state machine and builds the
//! concept tree from indentation depth.

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::ConceptData;
use crate::domain::entities::Outline;
use crate::domain::error::DomainError;
use crate::domain::scanner::{self, LineKind, NodeLine, ParseMode};

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, DomainError>;

/// One parse run over one outline source.
///
/// Owns the node-id counter, so ids restart at 1 for every session. The root
/// sentinel is created on construction and takes id 1.
///
/// Nesting only moves one level per line: a dedent walks the cursor up a
/// single level and leaves it there, an indent descends a single level. A
/// source that dedents by two or more levels at once (other than back to
/// depth 1) attaches the node one level below where its indentation says,
/// and a line indented right after a dedent nests under the node the cursor
/// moved up to, not under the dedented node.
pub struct OutlineParser {
    outline: Outline,
    mode: ParseMode,
    root: Index,
    cursor: Option<Index>,
    cursor_depth: usize,
    next_id: usize,
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineParser {
    pub fn new() -> Self {
        let mut outline = Outline::default();
        let root = outline.tree.insert_node(
            ConceptData {
                id: 1,
                label: String::new(),
                style: "root".to_string(),
                week: 0,
            },
            None,
        );

        Self {
            outline,
            mode: ParseMode::None,
            root,
            cursor: None,
            cursor_depth: 0,
            next_id: 2,
        }
    }

    /// Parse a complete source text into an [`Outline`].
    #[instrument(level = "debug", skip(source), fields(bytes = source.len()))]
    pub fn parse(source: &str) -> ParseResult<Outline> {
        let mut parser = Self::new();
        for (i, line) in source.lines().enumerate() {
            parser.parse_line(i + 1, line)?;
        }
        let outline = parser.finish();
        debug!(
            name = %outline.name,
            count = outline.count(),
            "parsed outline"
        );
        Ok(outline)
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Feed one source line; `line_no` is 1-based and only used in errors.
    pub fn parse_line(&mut self, line_no: usize, line: &str) -> ParseResult<()> {
        match scanner::classify(line) {
            LineKind::Section(mode) => {
                trace!(line_no, ?mode, "enter section");
                self.mode = mode;
                Ok(())
            }
            LineKind::End => {
                trace!(line_no, from = ?self.mode, "end section");
                self.mode = ParseMode::None;
                Ok(())
            }
            kind if self.mode == ParseMode::None => self.parse_directive(line_no, line, kind),
            _ => self.parse_section_line(line_no, line),
        }
    }

    fn parse_directive(&mut self, line_no: usize, line: &str, kind: LineKind) -> ParseResult<()> {
        let invalid = |what: &str| DomainError::format(line_no, line, format!("invalid {what}"));
        match kind {
            LineKind::Name => {
                self.outline.name = scanner::parse_name(line).ok_or_else(|| invalid("name"))?;
            }
            LineKind::Term => {
                self.outline.term = scanner::parse_term(line).ok_or_else(|| invalid("term"))?;
            }
            LineKind::Orientation => {
                self.outline.orientation =
                    scanner::parse_orientation(line).ok_or_else(|| invalid("orientation"))?;
            }
            LineKind::StartDate => {
                self.outline.start_date =
                    Some(scanner::parse_start_date(line).ok_or_else(|| invalid("start date"))?);
            }
            // Outside any section, unrecognized text is ignored
            _ => {}
        }
        Ok(())
    }

    fn parse_section_line(&mut self, line_no: usize, line: &str) -> ParseResult<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        match self.mode {
            ParseMode::Style => {
                let (name, style) = scanner::parse_style(line)
                    .ok_or_else(|| DomainError::format(line_no, line, "invalid style line"))?;
                self.outline.styles.insert(name, style);
            }
            ParseMode::ClassLevel => {
                let level = scanner::parse_level(line)
                    .ok_or_else(|| DomainError::format(line_no, line, "invalid class level"))?;
                self.outline.class_levels.push(level);
            }
            ParseMode::StudentLevel => {
                let level = scanner::parse_level(line)
                    .ok_or_else(|| DomainError::format(line_no, line, "invalid student level"))?;
                self.outline.student_levels.push(level);
            }
            ParseMode::Node => {
                let node = scanner::parse_node(line)
                    .ok_or_else(|| DomainError::format(line_no, line, "invalid node line"))?;
                self.add_node(line_no, line, node)?;
            }
            ParseMode::None => {}
        }
        Ok(())
    }

    fn add_node(&mut self, line_no: usize, line: &str, node: NodeLine) -> ParseResult<()> {
        if node.depth == 0 {
            return Err(DomainError::format(
                line_no,
                line,
                "node indentation below one level",
            ));
        }

        // A dedent leaves the cursor on the node it moved up to
        let (owner, moved_to) = if node.depth == 1 {
            self.cursor_depth = 1;
            (self.root, None)
        } else {
            let cursor = self.cursor.ok_or_else(|| {
                DomainError::format(line_no, line, "nested node before any top-level node")
            })?;
            if node.depth > self.cursor_depth {
                self.cursor_depth += 1;
                (cursor, None)
            } else if node.depth < self.cursor_depth {
                self.cursor_depth -= 1;
                let sibling = self.parent_index(line_no, line, cursor)?;
                (self.parent_index(line_no, line, sibling)?, Some(sibling))
            } else {
                (self.parent_index(line_no, line, cursor)?, None)
            }
        };

        let week = node.week;
        let idx = self.outline.tree.insert_node(
            ConceptData {
                id: self.next_id,
                label: node.label,
                style: node.style,
                week,
            },
            Some(owner),
        );
        self.next_id += 1;
        self.cursor = Some(moved_to.unwrap_or(idx));

        if let Some(root) = self.outline.tree.get_node_mut(self.root) {
            root.data.week = root.data.week.max(week);
        }
        Ok(())
    }

    fn parent_index(&self, line_no: usize, line: &str, idx: Index) -> ParseResult<Index> {
        self.outline
            .tree
            .parent_of(idx)
            .ok_or_else(|| DomainError::format(line_no, line, "dedent past the outline root"))
    }

    /// Close the session. The root takes the outline name as its label.
    pub fn finish(mut self) -> Outline {
        let name = self.outline.name.clone();
        if let Some(root) = self.outline.tree.get_node_mut(self.root) {
            root.data.label = name;
        }
        self.outline
    }
}
