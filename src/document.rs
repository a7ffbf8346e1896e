use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SAMPLE_DOCUMENT: &str = include_str!("../assets/sample_document.yaml");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document has no chapters")]
    Empty,
    #[error("unsupported document format: {0:?} (expected .yaml, .yml, .json or .toml)")]
    UnsupportedFormat(String),
}

/// One unit of content. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, alias = "text")]
    pub paragraphs: Vec<String>,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            paragraphs: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_paragraphs<I, S>(mut self, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paragraphs = paragraphs.into_iter().map(Into::into).collect();
        self
    }

    pub fn first_paragraph(&self) -> Option<&str> {
        self.paragraphs.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(default)]
    pub title: Option<String>,
    /// Credit line shown under the epigraph.
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub epigraph: Option<String>,
}

/// On-disk shape of a document file.
#[derive(Debug, Deserialize)]
struct DocumentFile {
    #[serde(flatten)]
    meta: DocumentMeta,
    chapters: Vec<Chapter>,
}

/// The fixed, ordered chapter list for a session. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    meta: DocumentMeta,
    chapters: Vec<Chapter>,
}

impl Document {
    pub fn new(chapters: Vec<Chapter>) -> Result<Self, DocumentError> {
        Self::with_meta(DocumentMeta::default(), chapters)
    }

    pub fn with_meta(meta: DocumentMeta, chapters: Vec<Chapter>) -> Result<Self, DocumentError> {
        if chapters.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Self { meta, chapters })
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    // A document is never empty; kept so clippy's len_without_is_empty stays quiet.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or("Untitled")
    }

    /// The document compiled into the binary, used when no file is given.
    pub fn sample() -> Result<Self> {
        Self::from_yaml_str(SAMPLE_DOCUMENT).context("Bundled sample document is invalid")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let document = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            "toml" => Self::from_toml_str(&content),
            _ => return Err(DocumentError::UnsupportedFormat(extension).into()),
        }
        .with_context(|| format!("Failed to parse document {}", path.display()))?;

        info!(
            "Loaded document {:?} with {} chapters from {}",
            document.title(),
            document.len(),
            path.display()
        );
        Ok(document)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: DocumentFile = serde_yaml::from_str(content)?;
        Ok(Self::with_meta(file.meta, file.chapters)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: DocumentFile = serde_json::from_str(content)?;
        Ok(Self::with_meta(file.meta, file.chapters)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: DocumentFile = toml::from_str(content)?;
        Ok(Self::with_meta(file.meta, file.chapters)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_rejected() {
        assert_eq!(Document::new(Vec::new()), Err(DocumentError::Empty));
    }

    #[test]
    fn bundled_sample_loads() {
        let doc = Document::sample().unwrap();
        assert!(doc.len() > 1);
        assert!(doc.meta().epigraph.is_some());
    }

    #[test]
    fn yaml_accepts_text_alias_and_missing_subtitle() {
        let yaml = r#"
title: "Diary"
chapters:
  - title: "One"
    text: ["first", "second"]
  - title: "Two"
    subtitle: "later"
"#;
        let doc = Document::from_yaml_str(yaml).unwrap();
        assert_eq!(doc.title(), "Diary");
        assert_eq!(doc.chapter(0).unwrap().paragraphs, vec!["first", "second"]);
        assert_eq!(doc.chapter(1).unwrap().subtitle.as_deref(), Some("later"));
        assert!(doc.chapter(1).unwrap().paragraphs.is_empty());
    }

    #[test]
    fn json_and_toml_sources_parse() {
        let json = r#"{"chapters": [{"title": "Only", "paragraphs": ["p"]}]}"#;
        let doc = Document::from_json_str(json).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.title(), "Untitled");

        let toml = r#"
title = "Notes"
[[chapters]]
title = "A"
paragraphs = ["x"]
[[chapters]]
title = "B"
"#;
        let doc = Document::from_toml_str(toml).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn empty_chapter_list_in_file_fails() {
        let err = Document::from_yaml_str("chapters: []").unwrap_err();
        assert_eq!(
            err.downcast_ref::<DocumentError>(),
            Some(&DocumentError::Empty)
        );
    }

    #[test]
    fn from_path_picks_parser_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"chapters": [{{"title": "Only"}}]}}"#).unwrap();

        let doc = Document::from_path(&path).unwrap();
        assert_eq!(doc.chapter(0).unwrap().title, "Only");

        let bad = dir.path().join("book.txt");
        fs::write(&bad, "whatever").unwrap();
        let err = Document::from_path(&bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocumentError>(),
            Some(DocumentError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }
}
