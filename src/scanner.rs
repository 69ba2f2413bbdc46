use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;
use crate::markup;
use crate::types::Document;

/// Scan every note under `root` and extract its references.
/// Applies the config's include/exclude filters to the vault-relative path.
/// Hidden files and folders (`.obsidian`, `.trash`) are skipped.
/// Returns documents sorted by path, with `links` and `assets` filled and
/// `content` untouched.
///
/// # Errors
///
/// Returns `Error::Io` if the vault cannot be walked or a note cannot be read.
pub fn scan(root: &Path, config: &Config) -> Result<Vec<Document>, Error> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| return !is_hidden(e)) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !is_note(&entry) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else { continue };
        let vault_path = vault_path_of(relative);
        if !config.should_scan(&vault_path) {
            tracing::debug!(path = %vault_path, "excluded by config");
            continue;
        }

        let content = std::fs::read_to_string(entry.path())?;
        let extracted = markup::extract_references(&content, &vault_path);
        let mut document = Document::new(vault_path, content);
        document.links = extracted.links;
        document.assets = extracted.assets;
        documents.push(document);
    }

    documents.sort_by(|a, b| return a.path.cmp(&b.path));
    tracing::info!(notes = documents.len(), "vault scanned");
    return Ok(documents);
}

/// Whether a walk entry below the root starts with a dot.
fn is_hidden(entry: &DirEntry) -> bool {
    return entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
}

/// Whether a walk entry is a note (`.md`, any case).
fn is_note(entry: &DirEntry) -> bool {
    return entry.path().extension().is_some_and(|ext| return ext.eq_ignore_ascii_case("md"));
}

/// Join path components with `/` regardless of platform.
fn vault_path_of(relative: &Path) -> String {
    return relative
        .components()
        .map(|c| return c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
}
