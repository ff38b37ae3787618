//! Structural validation of outline documents before they are persisted.
//!
//! Checks the JSON value rather than the typed document, so a document read
//! back from disk can be checked the same way as a freshly built one.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::document::{OutlineDocument, RenderMode};
use crate::domain::error::{DomainError, DomainResult};

static START_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("start date regex"));
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color regex"));

/// Validate a typed document.
pub fn validate_document(doc: &OutlineDocument, mode: RenderMode) -> DomainResult<()> {
    let value = serde_json::to_value(doc).map_err(|e| DomainError::schema("$", e.to_string()))?;
    validate(&value, mode)
}

/// Validate a document value.
///
/// In [`RenderMode::Render`] every node must carry `children`; in compact form
/// leaves may omit it. Node ids must be unique and within `1..=count`.
pub fn validate(value: &Value, mode: RenderMode) -> DomainResult<()> {
    let doc = as_object(value, "$")?;

    required_string(doc, "$", "name")?;
    required_string(doc, "$", "term")?;
    let start_date = required_string(doc, "$", "start date")?;
    if !START_DATE_RE.is_match(start_date) {
        return Err(DomainError::schema(
            "$.start date",
            format!("{start_date:?} does not match MM/DD/YYYY"),
        ));
    }
    validate_levels(doc, "class levels")?;
    validate_levels(doc, "student levels")?;

    let count = required(doc, "$", "count")?
        .as_u64()
        .ok_or_else(|| DomainError::schema("$.count", "expected a non-negative integer"))?;

    let nodes = required(doc, "$", "nodes")?;
    let mut ids = HashSet::new();
    validate_node(nodes, "$.nodes", mode, &mut ids)?;

    if let Some(id) = ids.iter().find(|&&id| id == 0 || id > count) {
        return Err(DomainError::schema(
            "$.nodes",
            format!("node id {id} outside 1..={count}"),
        ));
    }
    Ok(())
}

fn validate_levels(doc: &Map<String, Value>, key: &str) -> DomainResult<()> {
    let path = format!("$.{key}");
    let levels = required(doc, "$", key)?
        .as_array()
        .ok_or_else(|| DomainError::schema(&path, "expected an array"))?;

    for (i, level) in levels.iter().enumerate() {
        let path = format!("{path}[{i}]");
        let level = as_object(level, &path)?;
        required_string(level, &path, "name")?;
        let color = required_string(level, &path, "color")?;
        if !COLOR_RE.is_match(color) {
            return Err(DomainError::schema(
                format!("{path}.color"),
                format!("{color:?} is not #RRGGBB"),
            ));
        }
    }
    Ok(())
}

fn validate_node(
    value: &Value,
    path: &str,
    mode: RenderMode,
    ids: &mut HashSet<u64>,
) -> DomainResult<()> {
    let node = as_object(value, path)?;

    let id = required(node, path, "id")?
        .as_u64()
        .ok_or_else(|| DomainError::schema(format!("{path}.id"), "expected an integer"))?;
    if !ids.insert(id) {
        return Err(DomainError::schema(
            format!("{path}.id"),
            format!("duplicate id {id}"),
        ));
    }

    required_string(node, path, "name")?;

    match required(node, path, "parent")? {
        Value::String(_) | Value::Null => {}
        _ => {
            return Err(DomainError::schema(
                format!("{path}.parent"),
                "expected a string or null",
            ))
        }
    }

    let data = as_object(required(node, path, "data")?, &format!("{path}.data"))?;
    if !required(data, &format!("{path}.data"), "week")?.is_u64() {
        return Err(DomainError::schema(
            format!("{path}.data.week"),
            "expected a non-negative integer",
        ));
    }

    if let Some(level) = node.get("student_level") {
        if !level.is_u64() {
            return Err(DomainError::schema(
                format!("{path}.student_level"),
                "expected a non-negative integer",
            ));
        }
    }
    if let Some(level) = node.get("class_level") {
        if !level.is_number() {
            return Err(DomainError::schema(
                format!("{path}.class_level"),
                "expected a number",
            ));
        }
    }

    let children = match (node.get("children"), mode) {
        (Some(children), _) => children,
        (None, RenderMode::Compact) => return Ok(()),
        (None, RenderMode::Render) => {
            return Err(DomainError::schema(
                path,
                "missing required field \"children\"",
            ))
        }
    };
    let children = children
        .as_array()
        .ok_or_else(|| DomainError::schema(format!("{path}.children"), "expected an array"))?;
    for (i, child) in children.iter().enumerate() {
        validate_node(child, &format!("{path}.children[{i}]"), mode, ids)?;
    }
    Ok(())
}

fn as_object<'a>(value: &'a Value, path: &str) -> DomainResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| DomainError::schema(path, "expected an object"))
}

fn required<'a>(obj: &'a Map<String, Value>, path: &str, key: &str) -> DomainResult<&'a Value> {
    obj.get(key)
        .ok_or_else(|| DomainError::schema(path, format!("missing required field {key:?}")))
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> DomainResult<&'a str> {
    required(obj, path, key)?
        .as_str()
        .ok_or_else(|| DomainError::schema(format!("{path}.{key}"), "expected a string"))
}
