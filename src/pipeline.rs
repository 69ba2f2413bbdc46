//! One conversion pass: extract, protect, convert, resolve.
//!
//! The content converter (markdown ⇄ HTML) lives outside this crate. It
//! plugs in through [`ContentConverter`] and only ever sees content whose
//! references are already swapped for placeholder tokens.

use serde::Serialize;

use crate::config::Config;
use crate::markup;
use crate::report::ResolutionReport;
use crate::resolve_export::resolve_for_export;
use crate::resolve_import::resolve_for_import;
use crate::storage;
use crate::types::{AssetManifest, Document, Extracted};

/// Seam for the external content converter.
///
/// Implementations must copy placeholder tokens through unchanged; the
/// token brackets occur in neither markdown nor HTML, so a converter that
/// treats them as plain text does.
pub trait ContentConverter {
    /// Convert one document body.
    fn convert(&self, content: &str) -> String;
}

/// Syntax family a document's content is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Vault markdown: wiki-links, markdown links and images.
    Markup,
    /// Store HTML: content links, link tags, image tags.
    Storage,
}

/// Converter that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ContentConverter for Passthrough {
    /// Copy the content as-is.
    fn convert(&self, content: &str) -> String {
        return content.to_string();
    }
}

/// Extract every reference from content in the given format.
///
/// `source_path` is the vault path of the document the content belongs to;
/// relative markup addresses resolve against its folder. The storage format
/// ignores it.
pub fn extract_references(content: &str, format: Format, source_path: &str, config: &Config) -> Extracted {
    return match format {
        Format::Markup => markup::extract_references(content, source_path),
        Format::Storage => storage::extract_references(content, config),
    };
}

/// Store-to-vault pass over a batch whose documents hold store content.
pub fn run_export(documents: &mut [Document], converter: &dyn ContentConverter, config: &Config) -> ResolutionReport {
    protect_and_convert(documents, Format::Storage, converter, config);
    return resolve_for_export(documents);
}

/// Vault-to-store pass over a batch whose documents hold vault content.
///
/// Every document must already carry the identifier the store assigned it.
pub fn run_import(
    documents: &mut [Document],
    manifest: &AssetManifest,
    converter: &dyn ContentConverter,
    config: &Config,
) -> ResolutionReport {
    protect_and_convert(documents, Format::Markup, converter, config);
    return resolve_for_import(documents, manifest);
}

/// Prepare each document, then run its protected content through the converter.
fn protect_and_convert(documents: &mut [Document], format: Format, converter: &dyn ContentConverter, config: &Config) {
    for document in documents.iter_mut() {
        document.prepare(format, config);
        document.content = converter.convert(&document.content);
        tracing::debug!(
            path = %document.path,
            links = document.links.len(),
            assets = document.assets.len(),
            "document prepared"
        );
    }
}
