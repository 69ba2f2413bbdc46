use std::path::Path;

use crate::error::Error;

/// Name of the config file looked up in the working root.
pub const CONFIG_FILE: &str = ".vaultbridge.toml";

/// Entity types whose identifiers address pages when none are configured.
const DEFAULT_PAGE_ENTITY_TYPES: [&str; 2] = ["JournalEntry", "JournalEntryPage"];

/// Project configuration loaded from `.vaultbridge.toml`.
/// Include/exclude patterns are path prefixes applied to vault notes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vault path prefixes to skip.
    exclude: Vec<String>,
    /// Vault path prefixes to scan; empty means everything.
    include: Vec<String>,
    /// Leading identifier segments that mark a page (cross-document) link.
    page_entity_types: Vec<String>,
}

/// Raw TOML structure for `.vaultbridge.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct VaultbridgeTomlConfig {
    /// See `Config::exclude`.
    #[serde(default)]
    exclude: Vec<String>,
    /// See `Config::include`.
    #[serde(default)]
    include: Vec<String>,
    /// See `Config::page_entity_types`.
    #[serde(default)]
    page_entity_types: Vec<String>,
}

impl Default for Config {
    /// Scan everything; default page entity types.
    fn default() -> Self {
        return Self {
            exclude: Vec::new(),
            include: Vec::new(),
            page_entity_types: DEFAULT_PAGE_ENTITY_TYPES.iter().map(|t| return (*t).to_string()).collect(),
        };
    }
}

impl Config {
    /// Vault path prefixes to skip.
    pub fn exclude(&self) -> &[String] {
        return &self.exclude;
    }

    /// Vault path prefixes to scan; empty means everything.
    pub fn include(&self) -> &[String] {
        return &self.include;
    }

    /// Whether a store identifier addresses a page rather than some other entity.
    /// The entity type is the identifier's first dot-separated segment.
    pub fn is_page_identifier(&self, identifier: &str) -> bool {
        let entity = identifier.split('.').next().unwrap_or_default();
        return self.page_entity_types.iter().any(|t| return t == entity);
    }

    /// Load config from `.vaultbridge.toml` in the given root directory.
    /// Returns the default if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Page entity types in effect.
    pub fn page_entity_types(&self) -> &[String] {
        return &self.page_entity_types;
    }

    /// Parse config from TOML text. Empty `page_entity_types` keeps the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: VaultbridgeTomlConfig = toml::from_str(content)?;
        let mut config = Self {
            exclude: raw.exclude,
            include: raw.include,
            ..Self::default()
        };
        if !raw.page_entity_types.is_empty() {
            config.page_entity_types = raw.page_entity_types;
        }
        return Ok(config);
    }

    /// Check whether a vault note should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_scan_everything() {
        let config = Config::default();
        assert!(config.should_scan("Campaign/NPCs/Villain.md"));
        assert!(config.is_page_identifier("JournalEntry.abc.JournalEntryPage.def"));
        assert!(!config.is_page_identifier("Actor.xyz"));
    }

    #[test]
    fn include_then_exclude() {
        let config = Config::parse("include = [\"Campaign/\"]\nexclude = [\"Campaign/Drafts/\"]").unwrap();
        assert!(config.should_scan("Campaign/NPCs/Villain.md"));
        assert!(!config.should_scan("Campaign/Drafts/Idea.md"));
        assert!(!config.should_scan("Personal/Diary.md"));
    }

    #[test]
    fn custom_page_types_replace_defaults() {
        let config = Config::parse("page_entity_types = [\"Page\"]").unwrap();
        assert!(config.is_page_identifier("Page.p1"));
        assert!(!config.is_page_identifier("JournalEntry.j1"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(Config::parse("include = 3"), Err(Error::TomlDe(_))));
        assert!(matches!(Config::parse("namespaces = {}"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.page_entity_types(), ["JournalEntry", "JournalEntryPage"]);
    }
}
