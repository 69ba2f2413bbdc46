//! Core domain types: references, placeholders, documents, and the asset manifest.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::paths;
use crate::pipeline::{self, Format};
use crate::placeholder::substitute_placeholders;

/// Format-specific extras attached to a reference. Closed set; every field
/// has a neutral default so the value is never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// `#heading` fragment. Dropped on import, re-emitted on export.
    pub heading: Option<String>,
    /// Image shown as the clickable body of a linked asset.
    pub inner_image: Option<InnerImage>,
    /// The identifier names a page (a cross-document reference) rather than
    /// some other store entity.
    pub page_link: bool,
    /// Written directly against the store format inside vault markup, so the
    /// import resolver reformats it without a name lookup.
    pub target_addressed: bool,
}

/// A vault document, as consumed by extraction, substitution and resolution.
///
/// `content` is rewritten in place: extraction reads it, substitution swaps
/// references for placeholders, resolution swaps placeholders for the
/// destination syntax.
#[derive(Debug, Clone)]
pub struct Document {
    /// Asset references, in order of first appearance.
    pub assets: Vec<Reference>,
    /// Current text of the document.
    pub content: String,
    /// Document cross-references, in order of appearance.
    pub links: Vec<Reference>,
    /// Every suffix of `path` without the note extension, most specific first.
    pub name_fragments: Vec<String>,
    /// Vault-relative path including the note extension.
    pub path: String,
    /// Store identifier, present once the document exists in the store.
    pub stable_id: Option<StableId>,
}

impl Document {
    /// Create a document that does not exist in the store yet.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        return Self {
            assets: Vec::new(),
            content: content.into(),
            links: Vec::new(),
            name_fragments: paths::name_fragments(&path),
            path,
            stable_id: None,
        };
    }

    /// Folder containing this document, `""` for the vault root.
    pub fn folder(&self) -> &str {
        return paths::folder_of(&self.path);
    }

    /// Extract this document's references and swap them for placeholders.
    ///
    /// Replaces `links`, `assets` and `content`. Call once per document per
    /// direction: a second call would find only tokens.
    pub fn prepare(&mut self, format: Format, config: &Config) {
        let extracted = pipeline::extract_references(&self.content, format, &self.path, config);
        let substituted = substitute_placeholders(&self.content, extracted.links, extracted.assets);
        self.assets = substituted.assets;
        self.content = substituted.content;
        self.links = substituted.links;
    }

    /// Record the identifier assigned by the store.
    #[must_use]
    pub fn with_stable_id(mut self, id: impl Into<String>) -> Self {
        self.stable_id = Some(StableId(id.into()));
        return self;
    }
}

/// Output of one extractor run: both reference families, in order found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extracted {
    /// Asset references, deduplicated within the document.
    pub assets: Vec<Reference>,
    /// Document references, one per occurrence.
    pub links: Vec<Reference>,
}

impl Extracted {
    /// Split references found at byte offsets into the two families, in
    /// offset order. An asset whose address and text repeat an earlier one
    /// is dropped; its text is still covered by the earlier reference.
    pub fn from_found(mut found: Vec<(usize, Reference)>) -> Self {
        found.sort_by_key(|(offset, _)| return *offset);
        let mut extracted = Self::default();
        for (_, reference) in found {
            match reference.kind {
                ReferenceKind::Asset => {
                    let repeated = extracted.assets.iter().any(|seen| {
                        return seen.source_address == reference.source_address
                            && seen.target_address == reference.target_address
                            && seen.source_text == reference.source_text;
                    });
                    if !repeated {
                        extracted.assets.push(reference);
                    }
                },
                ReferenceKind::Document => extracted.links.push(reference),
            }
        }
        return extracted;
    }
}

/// An image written inside a link to another asset, e.g. a thumbnail that
/// opens the full-size file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InnerImage {
    /// Image source, carried through unchanged.
    pub address: String,
    /// Alternative text, if any.
    pub alt: Option<String>,
}

/// Positional token that stands in for a reference while the content is
/// converted. The index is the reference's position in its own list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder {
    /// Zero-based position in the owning document's list.
    pub index: usize,
    /// Which of the two independent token families this belongs to.
    pub kind: ReferenceKind,
    /// Distinguishes this document's tokens from token-like text already in
    /// it. Zero when the content has none.
    pub nonce: usize,
}

impl fmt::Display for Placeholder {
    /// `⟦link:N⟧` for documents, `⟦asset:N⟧` for assets, `⟦link:N~K⟧` with a
    /// nonce. The brackets occur in neither markdown nor HTML syntax, and the
    /// closing bracket keeps `⟦link:1⟧` from matching inside `⟦link:10⟧`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = match self.kind {
            ReferenceKind::Asset => "asset",
            ReferenceKind::Document => "link",
        };
        if self.nonce == 0 {
            return write!(f, "\u{27e6}{family}:{}\u{27e7}", self.index);
        }
        return write!(f, "\u{27e6}{family}:{}~{}\u{27e7}", self.index, self.nonce);
    }
}

impl Serialize for Placeholder {
    /// Serialized as its token text.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.collect_str(self);
    }
}

/// One cross-reference or asset mention found in a document.
///
/// At least one of `source_address` / `target_address` is non-empty; the
/// constructors refuse anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Format-specific extras.
    pub attributes: Attributes,
    /// Inline image rather than a clickable link. Meaningful for assets.
    pub is_embedded: bool,
    /// Document cross-reference or asset.
    pub kind: ReferenceKind,
    /// Display text. Resolution falls back to the address when absent.
    pub label: Option<String>,
    /// Assigned by the substitutor.
    pub placeholder: Option<Placeholder>,
    /// Vault-side address; empty when the reference was written in store syntax.
    pub source_address: String,
    /// Exact matched text. Substitution key and failure fallback.
    pub source_text: String,
    /// Store-side address: stable identifier or asset data path.
    pub target_address: Option<String>,
}

impl Reference {
    /// An asset reference. Returns `None` if it would not be addressable.
    pub fn asset(
        source_text: impl Into<String>,
        source_address: impl Into<String>,
        target_address: Option<String>,
    ) -> Option<Self> {
        return Self::build(ReferenceKind::Asset, source_text.into(), source_address.into(), target_address);
    }

    /// Shared constructor enforcing the addressability invariant.
    fn build(
        kind: ReferenceKind,
        source_text: String,
        source_address: String,
        target_address: Option<String>,
    ) -> Option<Self> {
        let target_address = target_address.filter(|t| return !t.is_empty());
        if source_text.is_empty() || (source_address.is_empty() && target_address.is_none()) {
            return None;
        }
        return Some(Self {
            attributes: Attributes::default(),
            is_embedded: false,
            kind,
            label: None,
            placeholder: None,
            source_address,
            source_text,
            target_address,
        });
    }

    /// The address shown when no label was written: the vault address if
    /// there is one, otherwise the store address.
    pub fn display_address(&self) -> &str {
        if !self.source_address.is_empty() {
            return &self.source_address;
        }
        return self.target_address.as_deref().unwrap_or_default();
    }

    /// A document cross-reference. Returns `None` if it would not be addressable.
    pub fn document(
        source_text: impl Into<String>,
        source_address: impl Into<String>,
        target_address: Option<String>,
    ) -> Option<Self> {
        return Self::build(ReferenceKind::Document, source_text.into(), source_address.into(), target_address);
    }

    /// Label to render: the written label, or the display address.
    pub fn label_or_address(&self) -> &str {
        return self.label.as_deref().unwrap_or_else(|| return self.display_address());
    }

    /// Set the embedded flag.
    #[must_use]
    pub fn embedded(mut self, is_embedded: bool) -> Self {
        self.is_embedded = is_embedded;
        return self;
    }

    /// Set the label. Blank labels count as absent.
    #[must_use]
    pub fn labelled(mut self, label: Option<String>) -> Self {
        self.label = label.filter(|l| return !l.trim().is_empty());
        return self;
    }
}

/// Tagged variant distinguishing the two reference families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Image or file embedded in or linked from a document.
    Asset,
    /// Link to another document.
    Document,
}

/// The store's opaque, permanent identifier for a document.
/// Newtype prevents mixing with paths and labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StableId(
    /// The identifier string as issued by the store.
    pub String,
);

impl fmt::Display for StableId {
    /// Writes the raw identifier.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// One uploaded asset: where it lived in the vault and where the store put it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Store-managed data path.
    pub data_path: String,
    /// Path relative to the vault (or its parent), `/`-separated.
    pub relative_path: String,
}

/// Assets uploaded for a batch, produced by the asset-upload collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    /// Upload records in upload order.
    pub entries: Vec<UploadedAsset>,
}

impl AssetManifest {
    /// Build a manifest from `(relative_path, data_path)` pairs.
    pub fn from_pairs<I, R, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, D)>,
        R: Into<String>,
        D: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(relative, data)| {
                return UploadedAsset { data_path: data.into(), relative_path: relative.into() };
            })
            .collect();
        return Self { entries };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_unaddressable_reference() {
        assert!(Reference::document("[[]]", "", None).is_none());
        assert!(Reference::document("[[]]", "", Some(String::new())).is_none());
        assert!(Reference::asset("", "a.png", None).is_none());
    }

    #[test]
    fn label_falls_back_to_address() {
        let plain = Reference::document("[[Waterdeep]]", "Waterdeep", None).unwrap();
        assert_eq!(plain.label_or_address(), "Waterdeep");

        let stored = Reference::document("@UUID[Actor.x1]", "", Some("Actor.x1".to_string())).unwrap();
        assert_eq!(stored.label_or_address(), "Actor.x1");

        let blank = plain.labelled(Some("  ".to_string()));
        assert_eq!(blank.label, None);
    }

    #[test]
    fn placeholder_tokens_are_distinct_per_family() {
        let link = Placeholder { index: 3, kind: ReferenceKind::Document, nonce: 0 };
        let asset = Placeholder { index: 3, kind: ReferenceKind::Asset, nonce: 0 };
        assert_eq!(link.to_string(), "\u{27e6}link:3\u{27e7}");
        assert_eq!(asset.to_string(), "\u{27e6}asset:3\u{27e7}");
        assert_eq!(Placeholder { nonce: 2, ..link }.to_string(), "\u{27e6}link:3~2\u{27e7}");
    }

    #[test]
    fn document_precomputes_fragments() {
        let doc = Document::new("Campaign/NPCs/Villain.md", "").with_stable_id("JournalEntry.v1");
        assert_eq!(doc.name_fragments, vec!["Villain", "NPCs/Villain", "Campaign/NPCs/Villain"]);
        assert_eq!(doc.folder(), "Campaign/NPCs");
        assert_eq!(doc.stable_id, Some(StableId("JournalEntry.v1".to_string())));
    }
}
