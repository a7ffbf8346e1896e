use std::any::Any;
use std::sync::{Arc, Mutex};

use log::{debug, error};
use thiserror::Error;

use crate::document::{Chapter, Document};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("Failed to access clipboard: {0}")]
    Unavailable(String),
    #[error("Failed to copy text to clipboard: {0}")]
    WriteFailed(String),
}

/// Where shared snippets go.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ShareError>;
    fn as_any(&self) -> &dyn Any;
}

/// The system clipboard via `arboard`. A fresh handle per write keeps a
/// missing display server from failing startup.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ShareError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ShareError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ShareError::WriteFailed(e.to_string()))?;
        debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// In-memory clipboard for tests and headless runs. `failing()` simulates an
/// inaccessible clipboard.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<String> {
        self.contents.lock().ok()?.last().cloned()
    }

    pub fn writes(&self) -> usize {
        self.contents.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ShareError> {
        if self.fail {
            return Err(ShareError::Unavailable("no clipboard in this session".into()));
        }
        self.contents
            .lock()
            .map_err(|e| ShareError::WriteFailed(e.to_string()))?
            .push(text.to_string());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `"{title} - Chapter {n}: {chapter}\n\n{first paragraph}..."`
pub fn format_snippet(document: &Document, position: usize, chapter: &Chapter) -> String {
    let header = format!(
        "{} - Chapter {}: {}",
        document.title(),
        position + 1,
        chapter.title
    );
    match chapter.first_paragraph() {
        Some(paragraph) => format!("{header}\n\n{paragraph}..."),
        None => header,
    }
}

/// Copy the chapter snippet. Returns the chapter number that was shared.
pub fn share_chapter(
    sink: &mut dyn ClipboardSink,
    document: &Document,
    position: usize,
) -> Result<usize, ShareError> {
    let Some(chapter) = document.chapter(position) else {
        return Err(ShareError::WriteFailed(format!(
            "no chapter at position {position}"
        )));
    };
    let snippet = format_snippet(document, position, chapter);
    sink.set_text(&snippet).inspect_err(|e| {
        error!("Share of chapter {} failed: {e}", position + 1);
    })?;
    Ok(position + 1)
}
