//! School/course identifiers for outline files
//!
//! Both names pass through filename sanitization before they reach the
//! filesystem:
//! - `UC Berkeley` → `UC_Berkeley`
//! - `../../etc/passwd` → `etc_passwd`
//! - `..` → `` (rejected)

use std::fmt;

/// Reduce `name` to a safe file-name component.
///
/// Drops non-ASCII characters, treats path separators as whitespace, joins
/// whitespace runs with `_`, keeps only `[A-Za-z0-9._-]` and strips leading
/// and trailing `.` and `_`. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Sanitized identity of one outline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutlineKey {
    school: String,
    course: String,
}

impl OutlineKey {
    /// None when either name sanitizes to nothing.
    pub fn new(school: &str, course: &str) -> Option<Self> {
        let school = secure_filename(school);
        let course = secure_filename(course);
        if school.is_empty() || course.is_empty() {
            return None;
        }
        Some(Self { school, course })
    }

    pub fn school(&self) -> &str {
        &self.school
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    /// File stem shared by source and document: `{school}_{course}`
    pub fn stem(&self) -> String {
        format!("{}_{}", self.school, self.course)
    }
}

impl fmt::Display for OutlineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}
