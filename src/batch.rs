//! Batch files: the JSON hand-off between the orchestrator and the engine.
//!
//! A batch lists the documents taking part in one conversion pass and the
//! assets uploaded for it. Documents are unique by vault path.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{AssetManifest, Document};

/// The batch as a whole.
/// Constructed via `Batch::parse()` or `Batch::from_documents()`; parsing
/// enforces non-empty, unique document paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Batch {
    /// Assets uploaded for this batch. Empty for an export.
    #[serde(default)]
    pub assets: AssetManifest,
    /// Documents in batch order. Order decides remaining resolution ties.
    pub documents: Vec<BatchDocument>,
}

/// One document as it travels in a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchDocument {
    /// Document body, in the format of the pass.
    pub content: String,
    /// Store identifier; absent for a note not yet created in the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Vault-relative path including the note extension.
    pub path: String,
}

impl Batch {
    /// Rebuild a batch from (resolved) documents.
    pub fn from_documents(documents: &[Document], assets: AssetManifest) -> Self {
        let documents = documents
            .iter()
            .map(|d| {
                return BatchDocument {
                    content: d.content.clone(),
                    id: d.stable_id.as_ref().map(|id| return id.0.clone()),
                    path: d.path.clone(),
                };
            })
            .collect();
        return Self { assets, documents };
    }

    /// Split into engine documents and the asset manifest.
    pub fn into_documents(self) -> (Vec<Document>, AssetManifest) {
        let documents = self
            .documents
            .into_iter()
            .map(|d| {
                let document = Document::new(d.path, d.content);
                return match d.id {
                    Some(id) => document.with_stable_id(id),
                    None => document,
                };
            })
            .collect();
        return (documents, self.assets);
    }

    /// Parse a batch from JSON content.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is not a valid batch,
    /// `Error::BatchCorrupt` if a document path is empty,
    /// or `Error::DuplicateDocument` if two documents share a path.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let batch: Self = serde_json::from_str(content)?;
        enforce_batch_document_paths(&batch.documents)?;
        return Ok(batch);
    }

    /// Read and parse a batch from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::BatchNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or any error from `Batch::parse`.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::BatchNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Serialize to pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        return Ok(json);
    }

    /// Write the batch to disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = self.serialize()?;
        std::fs::write(path, content)?;
        return Ok(());
    }
}

/// Validate that every document path is non-empty and unique.
///
/// # Errors
///
/// Returns `Error::BatchCorrupt` for an empty path,
/// or `Error::DuplicateDocument` for the first repeated path.
fn enforce_batch_document_paths(documents: &[BatchDocument]) -> Result<(), Error> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(documents.len());
    for (position, document) in documents.iter().enumerate() {
        if document.path.trim().is_empty() {
            return Err(Error::BatchCorrupt {
                reason: format!("document {position} has an empty path"),
            });
        }
        if !seen.insert(document.path.as_str()) {
            return Err(Error::DuplicateDocument { path: document.path.clone() });
        }
    }
    return Ok(());
}
