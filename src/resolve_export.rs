//! Export direction: store identifiers and data paths → vault syntax.

use crate::index::{IndexedDocument, LookupIndex};
use crate::paths;
use crate::placeholder::replace_token;
use crate::report::{ResolutionReport, Warning};
use crate::syntax;
use crate::types::{Document, Reference};

/// What an exported document reference becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExportedLink {
    /// A page link whose identifier names no document in the batch. Kept in
    /// store syntax so a later import can recover it.
    Preserved(String),
    /// Rewritten to vault syntax, or deliberately kept in store syntax.
    Rendered(String),
    /// Carries no identifier at all; left as written.
    Unaddressed,
}

/// Resolve every placeholder in a prepared batch for export.
///
/// Page links become wiki-links addressed by vault path. Links to other
/// entities, and page links whose target is not in the batch, keep their
/// identifier in store syntax; the latter are reported. Assets become
/// markdown images or links to the data path fixed at upload time.
pub fn resolve_for_export(documents: &mut [Document]) -> ResolutionReport {
    let index = LookupIndex::build(documents);
    let mut report = ResolutionReport::default();

    for document in documents.iter_mut() {
        resolve_document_for_export(document, &index, &mut report);
    }

    tracing::info!(
        documents = documents.len(),
        links = report.resolved_links,
        assets = report.resolved_assets,
        warnings = report.warnings.len(),
        "export resolution finished"
    );
    return report;
}

/// Vault address of `target` as written from a note in `folder`: the bare
/// name when both share a folder, else the full path without extension.
fn vault_address_for<'a>(target: &'a IndexedDocument, folder: &str) -> &'a str {
    if target.folder == folder {
        return target.name();
    }
    return &target.stem_path;
}

/// Vault syntax for an asset: image or link to its carried address. A link
/// wrapping an image keeps the image as its clickable body.
fn export_asset(asset: &Reference) -> String {
    let address = asset.target_address.as_deref().unwrap_or(&asset.source_address);
    if let Some(image) = &asset.attributes.inner_image {
        return syntax::markdown_linked_image(address, &image.address, image.alt.as_deref(), asset.label.as_deref());
    }
    return syntax::markdown_asset(address, asset.label.as_deref(), asset.is_embedded);
}

/// Decide what a document reference becomes in the vault.
fn export_link(link: &Reference, folder: &str, index: &LookupIndex) -> ExportedLink {
    let Some(identifier) = link.target_address.as_deref() else {
        return ExportedLink::Unaddressed;
    };
    let heading = link.attributes.heading.as_deref();
    let store_form = syntax::store_link(identifier, heading, link.label.as_deref());

    if !link.attributes.page_link {
        return ExportedLink::Rendered(store_form);
    }
    let Some(target) = index.by_identifier(identifier) else {
        return ExportedLink::Preserved(store_form);
    };
    let address = vault_address_for(target, folder);
    return ExportedLink::Rendered(syntax::wikilink(address, heading, link.label.as_deref()));
}

/// Rewrite one document's placeholders.
fn resolve_document_for_export(document: &mut Document, index: &LookupIndex, report: &mut ResolutionReport) {
    let folder = paths::folder_of(&document.path);

    for link in &document.links {
        let Some(placeholder) = link.placeholder else { continue };
        match export_link(link, folder, index) {
            ExportedLink::Preserved(text) => {
                if replace_token(&mut document.content, placeholder, &text) {
                    report.warn(Warning::UnknownIdentifier {
                        document: document.path.clone(),
                        identifier: link.target_address.clone().unwrap_or_default(),
                        source_text: link.source_text.clone(),
                    });
                }
            },
            ExportedLink::Rendered(text) => {
                if replace_token(&mut document.content, placeholder, &text) {
                    report.record_link();
                }
            },
            ExportedLink::Unaddressed => {
                if replace_token(&mut document.content, placeholder, &link.source_text) {
                    report.warn(Warning::UnresolvedLink {
                        address: link.display_address().to_string(),
                        document: document.path.clone(),
                        source_text: link.source_text.clone(),
                    });
                }
            },
        }
    }

    for asset in &document.assets {
        let Some(placeholder) = asset.placeholder else { continue };
        if replace_token(&mut document.content, placeholder, &export_asset(asset)) {
            report.record_asset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::placeholder::substitute_placeholders;
    use crate::storage;
    use crate::types::{Placeholder, ReferenceKind};

    fn prepared(path: &str, content: &str, id: &str) -> Document {
        let extracted = storage::extract_references(content, &Config::default());
        let substituted = substitute_placeholders(content, extracted.links, extracted.assets);
        let mut document = Document::new(path, substituted.content).with_stable_id(id);
        document.links = substituted.links;
        document.assets = substituted.assets;
        return document;
    }

    fn batch_with(path: &str, content: &str) -> Vec<Document> {
        return vec![
            prepared(path, content, "JournalEntry.src"),
            prepared("Campaign/NPCs/Waterdeep.md", "", "JournalEntry.npc"),
            prepared("Campaign/Locations/Waterdeep.md", "", "JournalEntry.loc"),
            prepared("Welcome.md", "", "JournalEntry.root"),
        ];
    }

    #[test]
    fn same_folder_uses_bare_name() {
        let mut batch = batch_with("Campaign/NPCs/Villain.md", "<p>Rules @UUID[JournalEntry.npc]{Waterdeep}.</p>");
        let report = resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "<p>Rules [[Waterdeep]].</p>");
        assert_eq!(report.resolved_links, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn other_folder_uses_full_path() {
        let mut batch = batch_with("Campaign/NPCs/Villain.md", "@UUID[JournalEntry.loc]{the city} @UUID[JournalEntry.loc]");
        resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "[[Campaign/Locations/Waterdeep|the city]] [[Campaign/Locations/Waterdeep]]");
    }

    #[test]
    fn heading_is_re_emitted() {
        let mut batch = batch_with("Welcome2.md", "@UUID[JournalEntry.root#Getting started]{Start here}");
        resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "[[Welcome#Getting started|Start here]]");
    }

    #[test]
    fn data_uuid_anchor_exports_as_wikilink() {
        let content = r#"<a class="content-link" data-uuid="JournalEntry.loc"><i class="fas fa-book"></i>Waterdeep</a>"#;
        let mut batch = batch_with("Campaign/Locations/Docks.md", content);
        resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "[[Waterdeep]]");
    }

    #[test]
    fn unknown_page_keeps_identifier_and_warns() {
        let mut batch = batch_with("Campaign/Plan.md", "Visit @UUID[JournalEntry.gone]{Old Tower}.");
        let report = resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "Visit @UUID[JournalEntry.gone]{Old Tower}.");
        assert_eq!(
            report.warnings,
            vec![Warning::UnknownIdentifier {
                document: "Campaign/Plan.md".to_string(),
                identifier: "JournalEntry.gone".to_string(),
                source_text: "@UUID[JournalEntry.gone]{Old Tower}".to_string(),
            }]
        );
    }

    #[test]
    fn non_page_entities_stay_in_store_syntax() {
        let content = r#"@UUID[Actor.k2]{Korvash} wields <a data-uuid="Item.s3">Sunsword</a>"#;
        let mut batch = batch_with("Campaign/NPCs/Villain.md", content);
        let report = resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "@UUID[Actor.k2]{Korvash} wields @UUID[Item.s3]{Sunsword}");
        assert!(report.is_clean());
        assert_eq!(report.resolved_links, 2);
    }

    #[test]
    fn assets_become_markdown() {
        let content = r#"<img src="worlds/w/assets/red dragon.png" alt="Dragon"> <a href="worlds/w/handouts/map.pdf">Map</a> <img src="worlds/w/x.webp">"#;
        let mut batch = batch_with("Bestiary.md", content);
        let report = resolve_for_export(&mut batch);
        assert_eq!(
            batch[0].content,
            "![Dragon](worlds/w/assets/red%20dragon.png) [Map](worlds/w/handouts/map.pdf) ![](worlds/w/x.webp)"
        );
        assert_eq!(report.resolved_assets, 3);
    }

    #[test]
    fn thumbnail_inside_asset_link_survives() {
        let content = r#"<p><a href="worlds/w/big.png"><img src="worlds/w/thumb.png" alt="Thumb"></a></p>"#;
        let mut batch = batch_with("Bestiary.md", content);
        let report = resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "<p>[![Thumb](worlds/w/thumb.png)](worlds/w/big.png)</p>");
        assert_eq!(report.resolved_assets, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn label_with_link_syntax_stays_inside_the_wikilink() {
        let mut batch = batch_with("Campaign/NPCs/Villain.md", "@UUID[JournalEntry.npc]{a]] or |x}");
        resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "[[Waterdeep|a or x]]");
    }

    #[test]
    fn unaddressed_link_is_left_as_written() {
        let mut document = Document::new("A.md", "\u{27e6}link:0\u{27e7}");
        let mut link = Reference::document("[[B]]", "B", None).unwrap();
        link.placeholder = Some(Placeholder { index: 0, kind: ReferenceKind::Document, nonce: 0 });
        document.links.push(link);
        let mut batch = vec![document];
        let report = resolve_for_export(&mut batch);
        assert_eq!(batch[0].content, "[[B]]");
        assert_eq!(report.warnings.len(), 1);
    }
}
