//! Reference extraction from store content: `@UUID[...]` content links,
//! `data-uuid` anchors, and `<img>` / `<a href>` asset tags.

use std::collections::HashMap;
use std::ops::Range;

use regex::Regex;

use crate::config::Config;
use crate::paths;
use crate::syntax;
use crate::types::{Extracted, InnerImage, Reference};

/// Matchers for one extraction run. Built fresh per call.
struct StoragePatterns {
    /// `<a ...>label</a>`.
    anchor: Regex,
    /// `name="value"`, `name='value'` or `name=value` inside a tag.
    attribute: Regex,
    /// `<img ...>`.
    image: Regex,
    /// `@UUID[identifier]{label}`.
    store_link: Regex,
    /// Any tag, stripped from anchor labels.
    tag: Regex,
}

impl StoragePatterns {
    /// Compile the storage patterns.
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded pattern is invalid (compile-time invariant).
    fn compile() -> Self {
        return Self {
            anchor: Regex::new(syntax::HTML_ANCHOR_PATTERN).expect("valid regex"),
            attribute: Regex::new(syntax::HTML_ATTRIBUTE_PATTERN).expect("valid regex"),
            image: Regex::new(syntax::HTML_IMAGE_PATTERN).expect("valid regex"),
            store_link: Regex::new(syntax::STORE_LINK_PATTERN).expect("valid regex"),
            tag: Regex::new(syntax::HTML_TAG_PATTERN).expect("valid regex"),
        };
    }

    /// Parse the attributes of a tag into a lower-cased name → decoded value map.
    fn attributes(&self, attribute_text: &str) -> HashMap<String, String> {
        return self
            .attribute
            .captures_iter(attribute_text)
            .filter_map(|cap| {
                let name = cap.get(1)?.as_str().to_ascii_lowercase();
                let value = cap.get(2).or_else(|| return cap.get(3)).or_else(|| return cap.get(4))?.as_str();
                return Some((name, syntax::unescape_html(value)));
            })
            .collect();
    }

    /// The first image with a source inside an anchor body.
    fn inner_image(&self, body: &str) -> Option<InnerImage> {
        return self.image.captures_iter(body).find_map(|cap| {
            let mut attributes = self.attributes(cap.get(1).map_or("", |m| return m.as_str()));
            let address = attributes.remove("src").filter(|src| return !src.trim().is_empty())?;
            let alt = attributes.remove("alt").filter(|alt| return !alt.trim().is_empty());
            return Some(InnerImage { address, alt });
        });
    }

    /// Flatten an anchor body to plain text.
    fn label_text(&self, body: &str) -> Option<String> {
        let text = syntax::unescape_html(self.tag.replace_all(body, "").trim());
        return (!text.is_empty()).then_some(text);
    }
}

/// Extract every document and asset reference from store content.
///
/// Document references keep the identifier as their target address and are
/// flagged `page_link` when the identifier's entity type is a configured
/// page type. Anchors carrying `data-uuid` are document references and never
/// assets. An image inside an asset anchor belongs to that anchor rather than
/// standing alone. External URLs, `data:` URIs and `#` anchors are skipped.
/// Never fails: empty content yields empty lists.
pub fn extract_references(content: &str, config: &Config) -> Extracted {
    let patterns = StoragePatterns::compile();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut found: Vec<(usize, Reference)> = Vec::new();

    for cap in patterns.anchor.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        let attributes = patterns.attributes(cap.get(1).map_or("", |m| return m.as_str()));
        let body = cap.get(2).map_or("", |m| return m.as_str());
        let label = patterns.label_text(body);

        if let Some(identifier) = attributes.get("data-uuid") {
            claimed.push(whole.range());
            if let Some(reference) = store_document_reference(whole.as_str(), identifier, label, config) {
                found.push((whole.start(), reference));
            }
            continue;
        }

        let Some(href) = attributes.get("href") else { continue };
        if !is_store_asset_address(href) {
            continue;
        }
        claimed.push(whole.range());
        let Some(reference) = Reference::asset(whole.as_str(), "", Some(href.clone())) else { continue };
        let mut reference = reference.labelled(label);
        reference.attributes.inner_image = patterns.inner_image(body);
        found.push((whole.start(), reference));
    }

    for cap in patterns.image.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        if claimed.iter().any(|c| return c.start < whole.end() && whole.start() < c.end) {
            continue;
        }
        let attributes = patterns.attributes(cap.get(1).map_or("", |m| return m.as_str()));
        let Some(src) = attributes.get("src") else { continue };
        if !is_store_asset_address(src) {
            continue;
        }
        let alt = attributes.get("alt").cloned();
        if let Some(reference) = Reference::asset(whole.as_str(), "", Some(src.clone())) {
            found.push((whole.start(), reference.embedded(true).labelled(alt)));
        }
    }

    for cap in patterns.store_link.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        if claimed.iter().any(|c| return c.start < whole.end() && whole.start() < c.end) {
            continue;
        }
        let Some(identifier) = cap.get(1) else { continue };
        let label = cap.get(2).map(|m| return m.as_str().to_string());
        if let Some(reference) = store_document_reference(whole.as_str(), identifier.as_str(), label, config) {
            found.push((whole.start(), reference));
        }
    }

    return Extracted::from_found(found);
}

/// Whether an `href`/`src` names a store-managed asset: not external, not a
/// same-page anchor, and not a content link in disguise.
fn is_store_asset_address(address: &str) -> bool {
    let address = address.trim();
    return !address.is_empty()
        && !address.starts_with('#')
        && !address.starts_with("@UUID")
        && !paths::is_external(address);
}

/// Build a document reference addressed by store identifier.
/// A `#fragment` on the identifier becomes the heading attribute.
fn store_document_reference(
    source_text: &str,
    identifier: &str,
    label: Option<String>,
    config: &Config,
) -> Option<Reference> {
    let (identifier, heading) = match identifier.trim().split_once('#') {
        None => (identifier.trim(), None),
        Some((id, fragment)) => (id, Some(fragment.to_string()).filter(|f| return !f.is_empty())),
    };
    let mut reference = Reference::document(source_text, "", Some(identifier.to_string()))?.labelled(label);
    reference.attributes.heading = heading;
    reference.attributes.page_link = config.is_page_identifier(identifier);
    return Some(reference);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReferenceKind;

    #[test]
    fn extracts_content_link() {
        let extracted = extract_references("<p>Meet @UUID[JournalEntry.w1]{Waterdeep}.</p>", &Config::default());
        assert_eq!(extracted.links.len(), 1);
        let link = &extracted.links[0];
        assert_eq!(link.source_text, "@UUID[JournalEntry.w1]{Waterdeep}");
        assert_eq!(link.target_address.as_deref(), Some("JournalEntry.w1"));
        assert_eq!(link.source_address, "");
        assert_eq!(link.label.as_deref(), Some("Waterdeep"));
        assert!(link.attributes.page_link);
    }

    #[test]
    fn non_page_entity_is_flagged() {
        let extracted = extract_references("@UUID[Actor.k2]{Korvash} @UUID[Item.s3]", &Config::default());
        assert_eq!(extracted.links.len(), 2);
        assert!(extracted.links.iter().all(|l| return !l.attributes.page_link));
        assert_eq!(extracted.links[1].label, None);
    }

    #[test]
    fn identifier_fragment_becomes_heading() {
        let extracted = extract_references("@UUID[JournalEntry.w1.JournalEntryPage.p2#docks]{Docks}", &Config::default());
        let link = &extracted.links[0];
        assert_eq!(link.target_address.as_deref(), Some("JournalEntry.w1.JournalEntryPage.p2"));
        assert_eq!(link.attributes.heading.as_deref(), Some("docks"));
    }

    #[test]
    fn data_uuid_anchor_is_document_not_asset() {
        let content = r##"<a class="content-link" data-uuid="JournalEntry.w1" href="#"><i class="fas fa-book"></i>Waterdeep</a>"##;
        let extracted = extract_references(content, &Config::default());
        assert!(extracted.assets.is_empty());
        assert_eq!(extracted.links.len(), 1);
        assert_eq!(extracted.links[0].label.as_deref(), Some("Waterdeep"));
        assert_eq!(extracted.links[0].source_text, content);
    }

    #[test]
    fn images_and_asset_anchors() {
        let content = r#"<img src="worlds/w/assets/dragon.png" alt="Red &amp; gold"><a href='worlds/w/handouts/map.pdf'>Map</a>"#;
        let extracted = extract_references(content, &Config::default());
        assert_eq!(extracted.assets.len(), 2);
        let image = &extracted.assets[0];
        assert!(image.is_embedded);
        assert_eq!(image.kind, ReferenceKind::Asset);
        assert_eq!(image.target_address.as_deref(), Some("worlds/w/assets/dragon.png"));
        assert_eq!(image.label.as_deref(), Some("Red & gold"));
        let anchor = &extracted.assets[1];
        assert!(!anchor.is_embedded);
        assert_eq!(anchor.label.as_deref(), Some("Map"));
    }

    #[test]
    fn skips_external_and_inline_images() {
        let content = r##"<img src="https://cdn.example.com/x.png"><img src="data:image/png;base64,AAAA"><a href="https://example.com">site</a><a href="#top">top</a>"##;
        let extracted = extract_references(content, &Config::default());
        assert_eq!(extracted, Extracted::default());
    }

    #[test]
    fn image_inside_asset_anchor_belongs_to_anchor() {
        let content = r#"<a href="worlds/w/big.png"><img src="worlds/w/thumb.png" alt="Thumb"></a>"#;
        let extracted = extract_references(content, &Config::default());
        assert_eq!(extracted.assets.len(), 1);
        let anchor = &extracted.assets[0];
        assert_eq!(anchor.source_text, content);
        assert_eq!(anchor.target_address.as_deref(), Some("worlds/w/big.png"));
        assert_eq!(anchor.label, None);
        assert_eq!(
            anchor.attributes.inner_image,
            Some(InnerImage { address: "worlds/w/thumb.png".to_string(), alt: Some("Thumb".to_string()) })
        );
    }

    #[test]
    fn unquoted_attribute_values() {
        let content = "<img src=worlds/w/dragon.png alt=Dragon><a href=worlds/w/map.pdf>Map</a>";
        let extracted = extract_references(content, &Config::default());
        assert_eq!(extracted.assets.len(), 2);
        assert_eq!(extracted.assets[0].target_address.as_deref(), Some("worlds/w/dragon.png"));
        assert_eq!(extracted.assets[0].label.as_deref(), Some("Dragon"));
        assert_eq!(extracted.assets[1].target_address.as_deref(), Some("worlds/w/map.pdf"));
    }

    #[test]
    fn repeated_image_collapses() {
        let content = r#"<img src="a.png"> and again <img src="a.png">"#;
        let extracted = extract_references(content, &Config::default());
        assert_eq!(extracted.assets.len(), 1);
    }

    #[test]
    fn empty_content_yields_nothing() {
        assert_eq!(extract_references("", &Config::default()), Extracted::default());
    }
}
