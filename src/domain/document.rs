//! Serialized outline document, as consumed by the tree visualization.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::domain::arena::ConceptArena;
use crate::domain::entities::{Level, Outline};
use crate::domain::error::{DomainError, DomainResult};

/// How leaf nodes are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Leaves omit the `children` key (API payloads)
    #[default]
    Compact,
    /// Every node carries `children`, empty for leaves (tree rendering)
    Render,
}

/// A class level is a palette index for positional assignment and a true
/// mean for name-keyed aggregation; both shapes appear in the same field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLevel {
    Index(u32),
    Mean(f64),
}

impl ClassLevel {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Index(i) => f64::from(i),
            Self::Mean(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePayload {
    pub week: u32,
}

/// One node of the serialized tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: usize,
    pub name: String,
    /// Label of the direct parent; labels are not unique, so this is not a key
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeDocument>>,
    pub data: NodePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_level: Option<ClassLevel>,
}

impl NodeDocument {
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().map_or(true, |c| c.is_empty())
    }

    pub fn children(&self) -> &[NodeDocument] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Pre-order walk of this subtree.
    pub fn walk(&self) -> Vec<&NodeDocument> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in node.children().iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

/// The persisted artifact for one school/course outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineDocument {
    pub name: String,
    pub term: String,
    #[serde(rename = "start date")]
    pub start_date: String,
    #[serde(rename = "class levels")]
    pub class_levels: Vec<Level>,
    #[serde(rename = "student levels")]
    pub student_levels: Vec<Level>,
    pub count: usize,
    pub nodes: NodeDocument,
}

impl OutlineDocument {
    /// Build the document for `outline`. `course_name` is the caller's course
    /// key, not the `name:` directive (which labels the root node).
    pub fn from_outline(
        outline: &Outline,
        course_name: &str,
        mode: RenderMode,
    ) -> DomainResult<Self> {
        let nodes = outline
            .tree
            .root()
            .and_then(|root| node_to_document(&outline.tree, root, mode))
            .ok_or_else(|| DomainError::schema("nodes", "outline has no root"))?;
        Ok(Self {
            name: course_name.to_string(),
            term: outline.term.clone(),
            start_date: outline.formatted_start_date(),
            class_levels: outline.class_levels.clone(),
            student_levels: outline.student_levels.clone(),
            count: outline.count(),
            nodes,
        })
    }

    /// Pretty JSON with 4-space indentation and a fixed key order.
    pub fn to_json_pretty(&self) -> DomainResult<String> {
        to_json_pretty(self)
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::schema("$", e.to_string()))
    }
}

/// Serialize `value` the way outline documents are written.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> DomainResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| DomainError::schema("$", format!("serialize: {e}")))?;
    String::from_utf8(buf).map_err(|e| DomainError::schema("$", format!("serialize: {e}")))
}

fn node_to_document(tree: &ConceptArena, idx: Index, mode: RenderMode) -> Option<NodeDocument> {
    let node = tree.get_node(idx)?;

    let parent = node
        .parent
        .and_then(|p| tree.get_node(p))
        .map(|p| p.data.label.clone());

    let children = if mode == RenderMode::Render || !node.is_leaf() {
        Some(
            node.children
                .iter()
                .filter_map(|&c| node_to_document(tree, c, mode))
                .collect(),
        )
    } else {
        None
    };

    Some(NodeDocument {
        id: node.data.id,
        name: node.data.label.clone(),
        parent,
        children,
        data: NodePayload {
            week: node.data.week,
        },
        student_level: None,
        class_level: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_class_level_shapes_when_serializing_then_index_stays_integral() {
        assert_eq!(serde_json::to_string(&ClassLevel::Index(2)).unwrap(), "2");
        assert_eq!(serde_json::to_string(&ClassLevel::Mean(2.0)).unwrap(), "2.0");
        let parsed: ClassLevel = serde_json::from_str("1.5").unwrap();
        assert_eq!(parsed, ClassLevel::Mean(1.5));
    }

    #[test]
    fn given_value_when_pretty_printing_then_indents_four_spaces() {
        let value = serde_json::json!({"a": [1]});
        assert_eq!(to_json_pretty(&value).unwrap(), "{\n    \"a\": [\n        1\n    ]\n}");
    }
}
