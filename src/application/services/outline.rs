//! Outline service
//!
//! Generates outline documents from source text and runs the two mastery
//! workflows on them. Sources live at `<meta_dir>/{school}_{course}.txt`,
//! documents at `<data_dir>/{school}_{course}.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, OutlineKey};
use crate::config::Settings;
use crate::domain::{guard, mastery, schema};
use crate::domain::{Outline, OutlineDocument, OutlineParser, RenderMode};
use crate::infrastructure::traits::FileSystem;

/// A document that was validated and written to disk.
#[derive(Debug, Clone)]
pub struct GeneratedOutline {
    pub key: OutlineKey,
    pub path: PathBuf,
    pub document: OutlineDocument,
}

/// Service for generating outline documents and applying mastery.
pub struct OutlineService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl OutlineService {
    /// Create a new outline service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn source_path(&self, key: &OutlineKey) -> PathBuf {
        self.settings.meta_dir.join(format!("{}.txt", key.stem()))
    }

    pub fn document_path(&self, key: &OutlineKey) -> PathBuf {
        self.settings.data_dir.join(format!("{}.json", key.stem()))
    }

    /// Guard, parse, serialize and validate one source text.
    ///
    /// Pure with respect to the filesystem; nothing is written.
    pub fn compile(
        &self,
        source: &str,
        course_name: &str,
        mode: RenderMode,
    ) -> ApplicationResult<OutlineDocument> {
        guard::check_size(source.len() as u64, self.settings.max_source_bytes)?;
        guard::check_integrity(source)?;

        let outline = OutlineParser::parse(source)?;
        let document = OutlineDocument::from_outline(&outline, course_name, mode)?;
        schema::validate_document(&document, mode)?;
        Ok(document)
    }

    /// Compile a source file at an arbitrary path without persisting.
    /// The file stem stands in for the course name.
    #[instrument(level = "debug", skip(self))]
    pub fn check(&self, path: &Path, mode: RenderMode) -> ApplicationResult<OutlineDocument> {
        let source = self.read_source(path)?;
        let course = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.compile(&source, &course, mode)
    }

    /// Parse a source file into the in-memory outline, guards included.
    #[instrument(level = "debug", skip(self))]
    pub fn inspect(&self, path: &Path) -> ApplicationResult<Outline> {
        let source = self.read_source(path)?;
        guard::check_integrity(&source)?;
        Ok(OutlineParser::parse(&source)?)
    }

    /// Size-guarded read; the limit is checked before any content is loaded.
    fn read_source(&self, path: &Path) -> ApplicationResult<String> {
        let size = self
            .fs
            .file_size(path)
            .with_path_context("stat outline source", path)?;
        guard::check_size(size, self.settings.max_source_bytes)?;

        self.fs
            .read_to_string(path)
            .with_path_context("read outline source", path)
    }

    /// Regenerate and persist the document for `school`/`course`.
    ///
    /// Returns `Ok(None)` when there is no source for the pair. On any error
    /// the previously persisted document is left untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(
        &self,
        school: &str,
        course: &str,
        mode: RenderMode,
    ) -> ApplicationResult<Option<GeneratedOutline>> {
        let Some(key) = OutlineKey::new(school, course) else {
            debug!("school or course sanitizes to nothing");
            return Ok(None);
        };
        let source_path = self.source_path(&key);
        if !self.fs.is_file(&source_path) {
            debug!(path = %source_path.display(), "no outline source");
            return Ok(None);
        }

        let source = self.read_source(&source_path)?;
        let document = self.compile(&source, key.course(), mode)?;

        let path = self.document_path(&key);
        let json = document.to_json_pretty()?;
        self.fs
            .write_atomic(&path, &json)
            .with_path_context("write outline document", &path)?;
        info!(outline = %key, path = %path.display(), count = document.count, "persisted outline");

        Ok(Some(GeneratedOutline {
            key,
            path,
            document,
        }))
    }

    /// Read a persisted document back. `Ok(None)` when none exists.
    pub fn load(&self, school: &str, course: &str) -> ApplicationResult<Option<OutlineDocument>> {
        let Some(key) = OutlineKey::new(school, course) else {
            return Ok(None);
        };
        let path = self.document_path(&key);
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        let json = self
            .fs
            .read_to_string(&path)
            .with_path_context("read outline document", &path)?;
        Ok(Some(OutlineDocument::from_json(&json)?))
    }

    /// Regenerate in compact form and return the document.
    pub fn parse(&self, school: &str, course: &str) -> ApplicationResult<Option<OutlineDocument>> {
        Ok(self
            .generate(school, course, RenderMode::Compact)?
            .map(|g| g.document))
    }

    /// Regenerate in render form and apply positional mastery.
    ///
    /// `class_mastery` may be empty, which leaves every class level at 0.
    #[instrument(level = "debug", skip(self))]
    pub fn render(
        &self,
        school: &str,
        course: &str,
        student_mastery: &str,
        class_mastery: &str,
    ) -> ApplicationResult<Option<OutlineDocument>> {
        mastery::validate_digits("student", student_mastery)?;
        mastery::validate_digits("class", class_mastery)?;

        let Some(generated) = self.generate(school, course, RenderMode::Render)? else {
            return Ok(None);
        };
        let mut document = generated.document;
        mastery::assign_positional(
            &mut document.nodes,
            document.student_levels.len(),
            document.class_levels.len(),
            student_mastery,
            class_mastery,
        )?;
        Ok(Some(document))
    }

    /// Regenerate in render form and apply a name-keyed mastery payload.
    ///
    /// `payload` must be a JSON object whose values are all strings:
    /// `{"Recursion": "mastered", ...}`.
    #[instrument(level = "debug", skip(self, payload))]
    pub fn update_mastery(
        &self,
        school: &str,
        course: &str,
        payload: &str,
    ) -> ApplicationResult<Option<OutlineDocument>> {
        let mastery_map = parse_mastery_payload(payload)?;

        let Some(generated) = self.generate(school, course, RenderMode::Render)? else {
            return Ok(None);
        };
        let mut document = generated.document;
        mastery::apply_mastery_map(
            &mut document.nodes,
            document.student_levels.len(),
            document.class_levels.len(),
            &mastery_map,
        )?;
        Ok(Some(document))
    }
}

/// Parse a mastery payload: a JSON object mapping concept labels to level names.
pub fn parse_mastery_payload(payload: &str) -> ApplicationResult<BTreeMap<String, String>> {
    serde_json::from_str(payload).map_err(|e| ApplicationError::InvalidPayload {
        message: e.to_string(),
    })
}
