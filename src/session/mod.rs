//! Edit session management.
//!
//! An [`EditSession`] tracks the document a user is editing across a chain
//! of replacements. Every successful edit produces a complete new scratch
//! file and advances `current_path` to it; a failed edit leaves the session
//! exactly where it was. The only state shared between operations is the
//! path, so each edit still gets its own document handle.

use crate::api::{self, ReplaceOptions};
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One completed replacement.
#[derive(Debug, Clone, Serialize)]
pub struct EditRecord {
    /// Text that was replaced
    pub old_text: String,
    /// Text it was replaced with
    pub new_text: String,
    /// Zero-indexed page
    pub page: u32,
    /// When the edit completed
    pub timestamp: DateTime<Utc>,
}

/// A chain of edits over one document.
pub struct EditSession {
    current_path: PathBuf,
    history: Vec<EditRecord>,
    dirty: bool,
}

impl EditSession {
    /// Start a session on an existing document.
    pub fn open<P: AsRef<Path>>(path: P) -> EditSession {
        EditSession {
            current_path: path.as_ref().to_path_buf(),
            history: Vec::new(),
            dirty: false,
        }
    }

    /// Path of the latest document revision.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Completed edits, in completion order.
    pub fn history(&self) -> &[EditRecord] {
        &self.history
    }

    /// Whether any edit has not been saved yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace text with the overlay strategy.
    pub fn replace(&mut self, search: &str, new_text: &str, page: u32) -> Result<()> {
        let next = api::replace_text(&self.current_path, search, new_text, page)?;
        self.commit(next, search, new_text, page);
        Ok(())
    }

    /// Replace text with the overlay strategy and explicit overrides.
    pub fn replace_advanced(
        &mut self,
        search: &str,
        new_text: &str,
        page: u32,
        options: &ReplaceOptions,
    ) -> Result<()> {
        let next = api::replace_text_advanced(&self.current_path, search, new_text, page, options)?;
        self.commit(next, search, new_text, page);
        Ok(())
    }

    /// Replace text by rewriting the content stream in place.
    pub fn replace_exact(&mut self, search: &str, new_text: &str, page: u32) -> Result<()> {
        let next = api::replace_text_exact(&self.current_path, search, new_text, page)?;
        self.commit(next, search, new_text, page);
        Ok(())
    }

    /// Copy the latest revision to `dest` and mark the session clean.
    pub fn save<P: AsRef<Path>>(&mut self, dest: P) -> Result<()> {
        api::save_document(&self.current_path, dest)?;
        self.dirty = false;
        Ok(())
    }

    fn commit(&mut self, next: PathBuf, search: &str, new_text: &str, page: u32) {
        info!(
            "edit committed on page {}: {:?} -> {:?} ({})",
            page,
            search,
            new_text,
            next.display()
        );
        self.current_path = next;
        self.dirty = true;
        self.history.push(EditRecord {
            old_text: search.to_string(),
            new_text: new_text.to_string(),
            page,
            timestamp: Utc::now(),
        });
    }
}
