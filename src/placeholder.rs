//! Placeholder substitution: swap every reference for a positional token so
//! the content converter cannot corrupt it.

use crate::types::{Placeholder, Reference, ReferenceKind};

/// Content with references swapped out, plus both lists with their tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituted {
    /// Asset references, `placeholder` assigned.
    pub assets: Vec<Reference>,
    /// Rewritten content.
    pub content: String,
    /// Document references, `placeholder` assigned.
    pub links: Vec<Reference>,
}

/// Assign each reference the token for its position in its own list.
fn assign_placeholders(references: &mut [Reference], kind: ReferenceKind, nonce: usize) {
    for (index, reference) in references.iter_mut().enumerate() {
        reference.placeholder = Some(Placeholder { index, kind, nonce });
    }
}

/// Zero when `content` holds no opening token bracket. Otherwise the
/// smallest nonce whose token ending `~K⟧` occurs nowhere in it, so no text
/// already present can be mistaken for a token.
fn choose_nonce(content: &str) -> usize {
    if !content.contains('\u{27e6}') {
        return 0;
    }
    return (1..=content.len().saturating_add(1))
        .find(|n| return !content.contains(&format!("~{n}\u{27e7}")))
        .unwrap_or_default();
}

/// Replace every occurrence of a placeholder's token in `content`.
/// Returns whether the token was present.
pub fn replace_token(content: &mut String, placeholder: Placeholder, replacement: &str) -> bool {
    let token = placeholder.to_string();
    if !content.contains(&token) {
        return false;
    }
    *content = content.replace(&token, replacement);
    return true;
}

/// Replace each reference's source text with its placeholder token.
///
/// Tokens are numbered per list (`⟦link:0⟧…`, `⟦asset:0⟧…`). Substitution
/// runs longest source text first, since a shorter reference may be a
/// literal substring of a longer one and replacing it first would corrupt
/// the longer match. Every occurrence is replaced, so a reference written
/// twice maps to one token at both sites. Run exactly once per document per
/// direction. Token-like text already in the content is left alone: the
/// tokens then carry a nonce that makes them differ from it.
pub fn substitute_placeholders(content: &str, mut links: Vec<Reference>, mut assets: Vec<Reference>) -> Substituted {
    let nonce = choose_nonce(content);
    if nonce != 0 {
        tracing::debug!(nonce, "content already holds token brackets");
    }
    assign_placeholders(&mut links, ReferenceKind::Document, nonce);
    assign_placeholders(&mut assets, ReferenceKind::Asset, nonce);

    let mut pairs: Vec<(&str, String)> = links
        .iter()
        .chain(assets.iter())
        .filter(|r| return !r.source_text.is_empty())
        .filter_map(|r| return r.placeholder.map(|p| return (r.source_text.as_str(), p.to_string())))
        .collect();
    // Stable: equal lengths keep list order, links before assets.
    pairs.sort_by(|a, b| return b.0.len().cmp(&a.0.len()));

    let mut rewritten = content.to_string();
    for (source_text, token) in &pairs {
        rewritten = rewritten.replace(source_text, token);
    }

    return Substituted { assets, content: rewritten, links };
}
