//! Outcome of a resolution pass: counters plus recoverable warnings.

use std::fmt;

use serde::Serialize;

/// A reference left unresolved. The document keeps working; only the
/// cross-reference degrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Warning {
    /// Export: the identifier matches no document in the batch. The link
    /// was kept in store syntax so a later import can recover it.
    UnknownIdentifier {
        /// Vault path of the document holding the reference.
        document: String,
        /// The identifier that was not found.
        identifier: String,
        /// The reference as written.
        source_text: String,
    },
    /// Import: no uploaded asset matches the address. Reverted to the original text.
    UnresolvedAsset {
        /// Vault address that was looked up.
        address: String,
        /// Vault path of the document holding the reference.
        document: String,
        /// The reference as written.
        source_text: String,
    },
    /// Import: no document in the batch carries the name. Reverted to the original text.
    UnresolvedLink {
        /// Vault address that was looked up.
        address: String,
        /// Vault path of the document holding the reference.
        document: String,
        /// The reference as written.
        source_text: String,
    },
}

impl Warning {
    /// Vault path of the document the warning belongs to.
    pub fn document(&self) -> &str {
        return match self {
            Self::UnknownIdentifier { document, .. }
            | Self::UnresolvedAsset { document, .. }
            | Self::UnresolvedLink { document, .. } => document,
        };
    }

    /// The reference text as written.
    pub fn source_text(&self) -> &str {
        return match self {
            Self::UnknownIdentifier { source_text, .. }
            | Self::UnresolvedAsset { source_text, .. }
            | Self::UnresolvedLink { source_text, .. } => source_text,
        };
    }
}

impl fmt::Display for Warning {
    /// One line: document, what failed, and the text involved.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Self::UnknownIdentifier { document, identifier, .. } => {
                write!(f, "{document}: unknown identifier `{identifier}`, kept as a store link")
            },
            Self::UnresolvedAsset { address, document, .. } => {
                write!(f, "{document}: no uploaded asset matches `{address}`")
            },
            Self::UnresolvedLink { address, document, .. } => {
                write!(f, "{document}: no document named `{address}`")
            },
        };
    }
}

/// Counts and warnings from one `resolve_for_import` / `resolve_for_export` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Asset references rewritten to the destination syntax.
    pub resolved_assets: usize,
    /// Document references rewritten to the destination syntax.
    pub resolved_links: usize,
    /// One entry per reference that could not be resolved.
    pub warnings: Vec<Warning>,
}

impl ResolutionReport {
    /// Whether every reference resolved.
    pub fn is_clean(&self) -> bool {
        return self.warnings.is_empty();
    }

    /// Count a resolved asset.
    pub(crate) fn record_asset(&mut self) {
        self.resolved_assets = self.resolved_assets.saturating_add(1);
    }

    /// Count a resolved link.
    pub(crate) fn record_link(&mut self) {
        self.resolved_links = self.resolved_links.saturating_add(1);
    }

    /// Record a warning and log it.
    pub(crate) fn warn(&mut self, warning: Warning) {
        tracing::warn!(document = warning.document(), source_text = warning.source_text(), "{warning}");
        self.warnings.push(warning);
    }
}
