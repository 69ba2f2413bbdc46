//! Batch lookup indices: name fragment → candidates, identifier → document.
//!
//! Built once per resolution pass from a snapshot of the batch, so the
//! documents themselves stay free to be rewritten while the index is read.

use std::collections::HashMap;

use crate::paths;
use crate::types::{Document, StableId};

/// What the resolvers need to know about an indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    /// Folder containing the document, `""` for the vault root.
    pub folder: String,
    /// Store identifier.
    pub id: StableId,
    /// Vault-relative path including the note extension.
    pub path: String,
    /// Path with the note extension stripped.
    pub stem_path: String,
}

impl IndexedDocument {
    /// The bare note name: last segment of the stem path.
    pub fn name(&self) -> &str {
        return paths::file_name(&self.stem_path);
    }
}

/// Read-only name and identity indices over one batch.
#[derive(Debug, Default)]
pub struct LookupIndex {
    /// Stable identifier → position in `documents`. First document wins.
    by_id: HashMap<String, usize>,
    /// Lower-cased name fragment → positions in `documents`, batch order.
    by_name: HashMap<String, Vec<usize>>,
    /// Snapshot of every document that has a stable identifier.
    documents: Vec<IndexedDocument>,
}

impl LookupIndex {
    /// Index every document that has a stable identifier.
    ///
    /// Documents without one are not yet in the store and cannot be a link
    /// target; they are left out. A repeated identifier keeps the first
    /// document that carried it.
    pub fn build(batch: &[Document]) -> Self {
        let mut index = Self::default();

        for document in batch {
            let Some(id) = &document.stable_id else {
                tracing::debug!(path = %document.path, "no stable identifier, left out of the index");
                continue;
            };
            let position = index.documents.len();

            if index.by_id.contains_key(&id.0) {
                tracing::warn!(path = %document.path, id = %id, "identifier already indexed, keeping the first document");
            } else {
                index.by_id.insert(id.0.clone(), position);
            }

            for fragment in &document.name_fragments {
                index.by_name.entry(fragment.to_lowercase()).or_default().push(position);
            }

            index.documents.push(IndexedDocument {
                folder: paths::folder_of(&document.path).to_string(),
                id: id.clone(),
                path: document.path.clone(),
                stem_path: paths::strip_note_extension(&document.path).to_string(),
            });
        }

        tracing::debug!(documents = index.documents.len(), "lookup index built");
        return index;
    }

    /// The document carrying `identifier`, if any.
    pub fn by_identifier(&self, identifier: &str) -> Option<&IndexedDocument> {
        let position = *self.by_id.get(identifier)?;
        return self.documents.get(position);
    }

    /// Every document one of whose name fragments equals `name`, ignoring
    /// case, in batch order.
    pub fn candidates(&self, name: &str) -> Vec<&IndexedDocument> {
        let Some(positions) = self.by_name.get(&name.to_lowercase()) else {
            return Vec::new();
        };
        return positions.iter().filter_map(|p| return self.documents.get(*p)).collect();
    }

    /// Whether no document was indexed.
    pub fn is_empty(&self) -> bool {
        return self.documents.is_empty();
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        return self.documents.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<Document> {
        return vec![
            Document::new("Campaign/NPCs/Waterdeep.md", "").with_stable_id("JournalEntry.n1"),
            Document::new("Campaign/Locations/Waterdeep.md", "").with_stable_id("JournalEntry.l1"),
            Document::new("Campaign/Drafts/Unsaved.md", ""),
        ];
    }

    #[test]
    fn excludes_documents_without_identifier() {
        let index = LookupIndex::build(&batch());
        assert_eq!(index.len(), 2);
        assert!(index.candidates("Unsaved").is_empty());
    }

    #[test]
    fn candidates_by_any_fragment_ignoring_case() {
        let index = LookupIndex::build(&batch());
        let all: Vec<&str> = index.candidates("WATERDEEP").into_iter().map(|d| return d.path.as_str()).collect();
        assert_eq!(all, vec!["Campaign/NPCs/Waterdeep.md", "Campaign/Locations/Waterdeep.md"]);

        let partial = index.candidates("locations/waterdeep");
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].id, StableId("JournalEntry.l1".to_string()));
        assert_eq!(partial[0].name(), "Waterdeep");
        assert_eq!(partial[0].folder, "Campaign/Locations");
    }

    #[test]
    fn identity_lookup_first_wins() {
        let mut docs = batch();
        docs.push(Document::new("Elsewhere/Copy.md", "").with_stable_id("JournalEntry.n1"));
        let index = LookupIndex::build(&docs);
        let found = index.by_identifier("JournalEntry.n1").unwrap();
        assert_eq!(found.stem_path, "Campaign/NPCs/Waterdeep");
        assert!(index.by_identifier("JournalEntry.missing").is_none());
    }

    #[test]
    fn empty_batch_builds_empty_index() {
        let index = LookupIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.candidates("anything").is_empty());
    }
}
