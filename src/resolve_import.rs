//! Import direction: vault names → store identifiers and data paths.

use crate::index::{IndexedDocument, LookupIndex};
use crate::paths;
use crate::placeholder::replace_token;
use crate::report::{ResolutionReport, Warning};
use crate::syntax;
use crate::types::{AssetManifest, Document, Reference, UploadedAsset};

/// Resolve every placeholder in a prepared batch for import.
///
/// Document references resolve by name against the batch, assets against the
/// upload manifest. Anything that cannot be resolved is reverted to its
/// original text and reported; the call itself never fails.
///
/// Every document that may be a link target must already carry its stable
/// identifier; documents without one are invisible to the lookup.
pub fn resolve_for_import(documents: &mut [Document], manifest: &AssetManifest) -> ResolutionReport {
    let index = LookupIndex::build(documents);
    let mut report = ResolutionReport::default();

    for document in documents.iter_mut() {
        resolve_document_for_import(document, &index, manifest, &mut report);
    }

    tracing::info!(
        documents = documents.len(),
        links = report.resolved_links,
        assets = report.resolved_assets,
        warnings = report.warnings.len(),
        "import resolution finished"
    );
    return report;
}

/// Pick the link target for `address` as seen from a note in `folder`.
///
/// Candidates in the same folder win, then those in the nearest ancestor
/// folder up to the vault root, then everything. Within a tier the shortest
/// path wins, and the earliest in batch order breaks a remaining tie.
pub fn select_link_target<'a>(index: &'a LookupIndex, address: &str, folder: &str) -> Option<&'a IndexedDocument> {
    let candidates = index.candidates(address);
    if candidates.len() > 1 {
        tracing::debug!(address, candidates = candidates.len(), "ambiguous name, applying folder priority");
    }

    let tiers = std::iter::once(folder).chain(paths::ancestor_folders(folder));
    for tier in tiers {
        let in_tier = candidates.iter().copied().filter(|c| return c.folder == tier);
        if let Some(found) = shortest_path(in_tier) {
            return Some(found);
        }
    }
    return shortest_path(candidates.into_iter());
}

/// Find the uploaded asset for a vault address: exact relative path first,
/// else the shortest path ending in the address on a segment boundary.
/// The boundary keeps `ragon.png` from matching `dragon.png`.
pub fn select_uploaded_asset<'a>(manifest: &'a AssetManifest, address: &str) -> Option<&'a UploadedAsset> {
    if let Some(exact) = manifest.entries.iter().find(|e| return e.relative_path == address) {
        return Some(exact);
    }
    let suffix = format!("/{}", address.trim_start_matches('/'));
    return manifest
        .entries
        .iter()
        .filter(|e| return e.relative_path.ends_with(&suffix))
        .min_by_key(|e| return e.relative_path.chars().count());
}

/// Store syntax for an asset reference, or `None` if nothing was uploaded for it.
fn import_asset(asset: &Reference, manifest: &AssetManifest) -> Option<String> {
    let uploaded = select_uploaded_asset(manifest, &asset.source_address)?;
    let text = asset.label.as_deref().unwrap_or_else(|| return paths::file_name(&asset.source_address));
    if asset.is_embedded {
        return Some(syntax::html_image(&uploaded.data_path, text));
    }
    return Some(syntax::html_anchor(&uploaded.data_path, text));
}

/// Store syntax for a document reference, or `None` if no target was found.
fn import_link(link: &Reference, folder: &str, index: &LookupIndex) -> Option<String> {
    if link.attributes.target_addressed {
        let identifier = link.target_address.as_deref()?;
        return Some(syntax::store_link(identifier, link.attributes.heading.as_deref(), link.label.as_deref()));
    }
    let target = select_link_target(index, &link.source_address, folder)?;
    return Some(syntax::store_link(&target.id.0, None, Some(link.label_or_address())));
}

/// Rewrite one document's placeholders.
///
/// A token shared by repeated identical references is rewritten once, at
/// every site, by the first of them; the others find nothing left to replace
/// and are neither counted nor reported again.
fn resolve_document_for_import(
    document: &mut Document,
    index: &LookupIndex,
    manifest: &AssetManifest,
    report: &mut ResolutionReport,
) {
    let folder = paths::folder_of(&document.path);

    for link in &document.links {
        let Some(placeholder) = link.placeholder else { continue };
        if let Some(rendered) = import_link(link, folder, index) {
            if replace_token(&mut document.content, placeholder, &rendered) {
                report.record_link();
            }
        } else if replace_token(&mut document.content, placeholder, &link.source_text) {
            report.warn(Warning::UnresolvedLink {
                address: link.display_address().to_string(),
                document: document.path.clone(),
                source_text: link.source_text.clone(),
            });
        }
    }

    for asset in &document.assets {
        let Some(placeholder) = asset.placeholder else { continue };
        if let Some(rendered) = import_asset(asset, manifest) {
            if replace_token(&mut document.content, placeholder, &rendered) {
                report.record_asset();
            }
        } else if replace_token(&mut document.content, placeholder, &asset.source_text) {
            report.warn(Warning::UnresolvedAsset {
                address: asset.display_address().to_string(),
                document: document.path.clone(),
                source_text: asset.source_text.clone(),
            });
        }
    }
}

/// Shortest path by character count; the first of equals wins.
fn shortest_path<'a>(candidates: impl Iterator<Item = &'a IndexedDocument>) -> Option<&'a IndexedDocument> {
    return candidates.min_by_key(|c| return c.path.chars().count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;
    use crate::placeholder::substitute_placeholders;

    fn prepared(path: &str, content: &str, id: Option<&str>) -> Document {
        let extracted = markup::extract_references(content, path);
        let substituted = substitute_placeholders(content, extracted.links, extracted.assets);
        let mut document = Document::new(path, substituted.content);
        document.links = substituted.links;
        document.assets = substituted.assets;
        if let Some(id) = id {
            document = document.with_stable_id(id);
        }
        return document;
    }

    fn target(path: &str, id: &str) -> Document {
        return prepared(path, "", Some(id));
    }

    #[test]
    fn waterdeep_prefers_same_folder() {
        let mut batch = vec![
            prepared("Campaign/NPCs/Villain.md", "Rules [[Waterdeep]] from the shadows.", Some("JournalEntry.v1")),
            target("Campaign/Locations/Waterdeep.md", "JournalEntry.loc"),
            target("Campaign/NPCs/Waterdeep.md", "JournalEntry.npc"),
        ];
        let report = resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, "Rules @UUID[JournalEntry.npc]{Waterdeep} from the shadows.");
        assert_eq!(report.resolved_links, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn braces_in_alias_do_not_cut_the_label() {
        let mut batch = vec![
            prepared("Campaign/NPCs/Villain.md", "Then [[Waterdeep|set {x} here]].", Some("JournalEntry.v1")),
            target("Campaign/NPCs/Waterdeep.md", "JournalEntry.npc"),
        ];
        resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, "Then @UUID[JournalEntry.npc]{set x here}.");
    }

    #[test]
    fn folder_priority_tiers() {
        let source = "Campaign/NPCs/Villain.md";
        let content = "[[Waterdeep]]";
        let mut others = vec![
            target("Campaign/NPCs/Waterdeep.md", "JournalEntry.same"),
            target("Campaign/Waterdeep.md", "JournalEntry.parent"),
            target("Archive/Old/Waterdeep.md", "JournalEntry.long"),
            target("Zeta/Waterdeep.md", "JournalEntry.short"),
        ];

        for expected in ["JournalEntry.same", "JournalEntry.parent", "JournalEntry.short"] {
            let mut batch = vec![prepared(source, content, Some("JournalEntry.v1"))];
            batch.extend(others.iter().cloned());
            resolve_for_import(&mut batch, &AssetManifest::default());
            assert_eq!(batch[0].content, format!("@UUID[{expected}]{{Waterdeep}}"));
            others.remove(0);
        }
    }

    #[test]
    fn equal_length_tie_keeps_batch_order() {
        let mut batch = vec![
            prepared("Notes/Index.md", "[[Hub]]", None),
            target("Alpha/Hub.md", "JournalEntry.a"),
            target("Omega/Hub.md", "JournalEntry.o"),
        ];
        resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, "@UUID[JournalEntry.a]{Hub}");
    }

    #[test]
    fn case_insensitive_and_repeated() {
        let mut batch = vec![
            prepared("Campaign/Log.md", "[[waterdeep]] [[WATERDEEP]] [[Waterdeep]] [[Waterdeep]] [[Waterdeep]]", None),
            target("Campaign/Locations/Waterdeep.md", "JournalEntry.loc"),
        ];
        let report = resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(
            batch[0].content,
            "@UUID[JournalEntry.loc]{waterdeep} @UUID[JournalEntry.loc]{WATERDEEP} \
             @UUID[JournalEntry.loc]{Waterdeep} @UUID[JournalEntry.loc]{Waterdeep} @UUID[JournalEntry.loc]{Waterdeep}"
        );
        assert!(report.is_clean());
    }

    #[test]
    fn partial_path_and_alias() {
        let mut batch = vec![
            prepared("Session 1.md", "Met at [[Locations/Waterdeep#Docks|the docks]].", None),
            target("Campaign/Locations/Waterdeep.md", "JournalEntry.loc"),
            target("Campaign/NPCs/Waterdeep.md", "JournalEntry.npc"),
        ];
        resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, "Met at @UUID[JournalEntry.loc]{the docks}.");
    }

    #[test]
    fn no_candidate_reverts_with_one_warning() {
        let original = "Travel to [[Neverwinter|the jewel of the north]] next.";
        let mut batch = vec![prepared("Campaign/Plan.md", original, Some("JournalEntry.p"))];
        let report = resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, original);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0],
            Warning::UnresolvedLink {
                address: "Neverwinter".to_string(),
                document: "Campaign/Plan.md".to_string(),
                source_text: "[[Neverwinter|the jewel of the north]]".to_string(),
            }
        );
    }

    #[test]
    fn unresolvable_document_round_trips() {
        let original = "# Notes\n\n[[Ghost]] ![[portrait.png|200]] [map](maps/world.pdf) ![alt](<a b.png>)\n";
        let mut batch = vec![prepared("Notes.md", original, None)];
        let report = resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, original);
        assert_eq!(report.warnings.len(), 4);
        assert_eq!(report.resolved_links + report.resolved_assets, 0);
    }

    #[test]
    fn target_without_identifier_is_invisible() {
        let mut batch = vec![prepared("A.md", "[[B]]", Some("JournalEntry.a")), prepared("B.md", "", None)];
        let report = resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, "[[B]]");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn store_links_in_vault_are_reformatted() {
        let mut batch = vec![prepared("A.md", "@UUID[Actor.k2]{Korvash} and @UUID[JournalEntry.x#Lore]", None)];
        let report = resolve_for_import(&mut batch, &AssetManifest::default());
        assert_eq!(batch[0].content, "@UUID[Actor.k2]{Korvash} and @UUID[JournalEntry.x#Lore]");
        assert_eq!(report.resolved_links, 2);
    }

    #[test]
    fn dragon_picks_shortest_upload() {
        let manifest = AssetManifest::from_pairs([
            ("vault/assets/images/dragon.png", "worlds/w/assets/images/dragon.png"),
            ("vault/dragon.png", "worlds/w/dragon.png"),
        ]);
        let mut batch = vec![prepared("Bestiary.md", "![[dragon.png]]", None)];
        let report = resolve_for_import(&mut batch, &manifest);
        assert_eq!(batch[0].content, "<img src=\"worlds/w/dragon.png\" alt=\"dragon.png\">");
        assert_eq!(report.resolved_assets, 1);
    }

    #[test]
    fn exact_asset_path_beats_suffix() {
        let manifest = AssetManifest::from_pairs([
            ("dragon.png", "worlds/w/root-dragon.png"),
            ("a/dragon.png", "worlds/w/a-dragon.png"),
        ]);
        assert_eq!(select_uploaded_asset(&manifest, "dragon.png").unwrap().data_path, "worlds/w/root-dragon.png");
        // Suffix matches stop at segment boundaries.
        assert!(select_uploaded_asset(&manifest, "ragon.png").is_none());
    }

    #[test]
    fn linked_asset_becomes_anchor() {
        let manifest = AssetManifest::from_pairs([("vault/handouts/the map.pdf", "worlds/w/handouts/the-map.pdf")]);
        let mut batch = vec![prepared("Session.md", "Hand out [the map](handouts/the%20map.pdf).", None)];
        resolve_for_import(&mut batch, &manifest);
        assert_eq!(batch[0].content, "Hand out <a href=\"worlds/w/handouts/the-map.pdf\">the map</a>.");
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let report = resolve_for_import(&mut [], &AssetManifest::default());
        assert_eq!(report, ResolutionReport::default());
    }
}
