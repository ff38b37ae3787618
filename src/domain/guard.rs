//! Pre-parse guards over raw outline source.
//!
//! Both run before the scanner sees a single line.

use std::borrow::Cow;

use tracing::warn;

use crate::domain::error::{DomainError, DomainResult};

/// Reject sources larger than `limit` bytes.
pub fn check_size(size: u64, limit: u64) -> DomainResult<()> {
    if size > limit {
        warn!(size, limit, "outline source over size limit");
        return Err(DomainError::SizeLimit { size, limit });
    }
    Ok(())
}

/// Escape markup the way an HTML sanitizer with no allowed tags does.
///
/// Stricter than such a sanitizer: every `&` is escaped, existing entities
/// like `&amp;` included, so any `&` in a source fails [`check_integrity`].
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reject sources the sanitizer would alter; the offending line is reported.
pub fn check_integrity(text: &str) -> DomainResult<()> {
    if let Cow::Owned(_) = sanitize(text) {
        let offending = text
            .lines()
            .find(|line| matches!(sanitize(line), Cow::Owned(_)))
            .unwrap_or_default()
            .trim()
            .to_string();
        warn!(%offending, "outline source contains markup");
        return Err(DomainError::Integrity { offending });
    }
    Ok(())
}
