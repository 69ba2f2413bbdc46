//! Reference extraction from vault markup: wiki-links, markdown images and
//! links, and store links already written into a note.

use std::ops::Range;

use regex::{Captures, Regex};

use crate::paths;
use crate::syntax;
use crate::types::{Extracted, Reference};

/// Matchers for one extraction run. Built fresh per call, never shared
/// across documents.
struct MarkupPatterns {
    /// Markdown `[text](dest)` / `![alt](dest)`.
    markdown_link: Regex,
    /// `@UUID[identifier]{label}`.
    store_link: Regex,
    /// `[[target]]` / `![[target]]`.
    wikilink: Regex,
}

impl MarkupPatterns {
    /// Compile the markup patterns.
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded pattern is invalid (compile-time invariant).
    fn compile() -> Self {
        return Self {
            markdown_link: Regex::new(syntax::MARKDOWN_LINK_PATTERN).expect("valid regex"),
            store_link: Regex::new(syntax::STORE_LINK_PATTERN).expect("valid regex"),
            wikilink: Regex::new(syntax::WIKILINK_PATTERN).expect("valid regex"),
        };
    }
}

/// Extract every document and asset reference from a vault note.
///
/// `source_path` is the note's vault path; `./` and `../` destinations are
/// resolved against its folder. External URLs, inline data, and same-note
/// anchors are skipped. Never fails: empty content yields empty lists.
pub fn extract_references(content: &str, source_path: &str) -> Extracted {
    let patterns = MarkupPatterns::compile();
    let folder = paths::folder_of(source_path);
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut found: Vec<(usize, Reference)> = Vec::new();

    for cap in patterns.wikilink.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        claimed.push(whole.range());
        if let Some(reference) = parse_wikilink_capture(&cap, folder) {
            found.push((whole.start(), reference));
        }
    }

    for cap in patterns.markdown_link.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        if overlaps_claimed(&claimed, &whole.range()) {
            continue;
        }
        claimed.push(whole.range());
        if let Some(reference) = parse_markdown_link_capture(&cap, folder) {
            found.push((whole.start(), reference));
        }
    }

    for cap in patterns.store_link.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        if overlaps_claimed(&claimed, &whole.range()) {
            continue;
        }
        if let Some(reference) = parse_store_link_capture(&cap) {
            found.push((whole.start(), reference));
        }
    }

    return Extracted::from_found(found);
}

/// Obsidian reuses the alias slot for image sizes: `300` or `300x200`.
fn is_dimension(alias: &str) -> bool {
    let mut parts = alias.trim().splitn(2, 'x');
    let width_ok = parts.next().is_some_and(|w| return !w.is_empty() && w.chars().all(|c| return c.is_ascii_digit()));
    let height_ok = parts.next().is_none_or(|h| return !h.is_empty() && h.chars().all(|c| return c.is_ascii_digit()));
    return width_ok && height_ok;
}

/// Whether a match range intersects one already taken by another syntax.
fn overlaps_claimed(claimed: &[Range<usize>], range: &Range<usize>) -> bool {
    return claimed.iter().any(|c| return c.start < range.end && range.start < c.end);
}

/// Parse a markdown link or image capture.
/// Returns `None` for external URLs, anchors, and empty destinations.
fn parse_markdown_link_capture(cap: &Captures<'_>, folder: &str) -> Option<Reference> {
    let text = cap.get(0)?.as_str();
    let embedded = cap.get(1).is_some_and(|m| return m.as_str() == "!");
    let label = cap.get(2).map(|m| return m.as_str().trim().to_string());
    let raw_destination = cap.get(3)?.as_str();
    let destination = raw_destination
        .strip_prefix('<')
        .and_then(|d| return d.strip_suffix('>'))
        .unwrap_or(raw_destination);

    if destination.starts_with('#') || paths::is_external(destination) {
        return None;
    }

    let (raw_path, heading) = split_heading(destination);
    let decoded = paths::decode_destination(raw_path);
    let address = vault_address(folder, decoded.trim());
    if address.is_empty() {
        return None;
    }

    if paths::is_note_target(&address) {
        let mut reference = Reference::document(text, paths::strip_note_extension(&address), None)?
            .embedded(embedded)
            .labelled(label);
        reference.attributes.heading = heading.map(|h| return paths::decode_destination(h));
        return Some(reference);
    }

    return Some(Reference::asset(text, address, None)?.embedded(embedded).labelled(label));
}

/// Parse a store link written directly in a note. It already carries its
/// destination address, so it is flagged as target-addressed.
fn parse_store_link_capture(cap: &Captures<'_>) -> Option<Reference> {
    let text = cap.get(0)?.as_str();
    let (identifier, heading) = split_heading(cap.get(1)?.as_str().trim());
    let label = cap.get(2).map(|m| return m.as_str().to_string());

    let mut reference = Reference::document(text, "", Some(identifier.to_string()))?.labelled(label);
    reference.attributes.heading = heading.map(str::to_string);
    reference.attributes.target_addressed = true;
    return Some(reference);
}

/// Parse a wiki-link capture: `[[target#heading|alias]]`, optionally embedded.
/// Returns `None` for same-note anchors (`[[#Heading]]`) and external targets.
fn parse_wikilink_capture(cap: &Captures<'_>, folder: &str) -> Option<Reference> {
    let text = cap.get(0)?.as_str();
    let embedded = cap.get(1).is_some_and(|m| return m.as_str() == "!");
    let inner = cap.get(2)?.as_str();

    // Inside tables the alias pipe is written `\|`.
    let (target_part, alias) = match inner.split_once('|') {
        None => (inner, None),
        Some((target, alias)) => (target.strip_suffix('\\').unwrap_or(target), Some(alias.trim().to_string())),
    };
    let (target, heading) = split_heading(target_part);
    let target = target.trim();
    if target.is_empty() || paths::is_external(target) {
        return None;
    }

    let address = vault_address(folder, target);
    if paths::is_note_target(&address) {
        let mut reference = Reference::document(text, paths::strip_note_extension(&address), None)?
            .embedded(embedded)
            .labelled(alias);
        reference.attributes.heading = heading.map(|h| return h.trim().to_string());
        return Some(reference);
    }

    let alias = alias.filter(|a| return !is_dimension(a));
    return Some(Reference::asset(text, address, None)?.embedded(embedded).labelled(alias));
}

/// Split `target#heading` at the first `#`. An empty heading counts as none.
fn split_heading(target: &str) -> (&str, Option<&str>) {
    return match target.split_once('#') {
        None => (target, None),
        Some((path, heading)) => (path, Some(heading).filter(|h| return !h.trim().is_empty())),
    };
}

/// Vault address for a written target: `./` and `../` resolve against the
/// note's folder, a leading `/` means the vault root, anything else is kept
/// as written (names and partial paths resolve by suffix later).
fn vault_address(folder: &str, target: &str) -> String {
    if target.starts_with("./") || target.starts_with("../") {
        return paths::join_normalized(folder, target);
    }
    return target.trim_start_matches('/').to_string();
}
