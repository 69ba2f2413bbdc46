//! Vault path helpers: normalisation, folders, extensions, and name fragments.
//!
//! Vault paths are logical, `/`-separated, and relative to the vault root.
//! They never touch the filesystem, so plain string slicing is used instead
//! of `std::path`.

/// Suffix carried by every note in the vault, including the dot.
const NOTE_SUFFIX: &str = ".md";

/// Ancestor folders of `folder`, nearest first, ending with the vault root `""`.
/// The root itself has no ancestors.
pub fn ancestor_folders(folder: &str) -> Vec<&str> {
    let mut ancestors = Vec::new();
    if folder.is_empty() {
        return ancestors;
    }
    let mut current = folder;
    while let Some((parent, _)) = current.rsplit_once('/') {
        ancestors.push(parent);
        current = parent;
    }
    ancestors.push("");
    return ancestors;
}

/// Percent-decode a markdown link destination. Invalid sequences are kept verbatim.
pub fn decode_destination(raw: &str) -> String {
    return urlencoding::decode(raw).map_or_else(|_err| return raw.to_string(), std::borrow::Cow::into_owned);
}

/// Percent-encode the characters that would end a markdown link destination early.
pub fn encode_destination(path: &str) -> String {
    return path.replace('%', "%25").replace(' ', "%20").replace('(', "%28").replace(')', "%29");
}

/// The extension of the last path segment, without the dot.
///
/// Only suffixes made of ASCII alphanumerics that contain at least one letter
/// count, so `Mr. Smith` and `Release v1.2` read as names, not files.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    let well_formed = ext.chars().all(|c| return c.is_ascii_alphanumeric())
        && ext.chars().any(|c| return c.is_ascii_alphabetic());
    return well_formed.then_some(ext);
}

/// The last segment of a path.
pub fn file_name(path: &str) -> &str {
    return path.rsplit_once('/').map_or(path, |(_, name)| return name);
}

/// The folder containing `path`, or `""` for the vault root.
pub fn folder_of(path: &str) -> &str {
    return path.rsplit_once('/').map_or("", |(folder, _)| return folder);
}

/// Whether an address points outside the vault: a URL scheme such as
/// `https:`, `data:` or `mailto:`. Single-letter prefixes are not schemes.
pub fn is_external(address: &str) -> bool {
    let Some((scheme, _)) = address.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| return c.is_ascii_alphabetic());
    return starts_alpha
        && scheme.len() > 1
        && chars.all(|c| return c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'));
}

/// Whether a target names a note: no extension, or the note extension.
pub fn is_note_target(path: &str) -> bool {
    return extension(path).is_none_or(|ext| return ext.eq_ignore_ascii_case("md"));
}

/// Join `relative` onto `folder`, collapsing `.` and `..` segments.
/// Preserves a leading `..` when there is nothing left to pop.
pub fn join_normalized(folder: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in folder.split('/').chain(relative.split('/')) {
        push_normalized_segment(&mut segments, segment);
    }
    return segments.join("/");
}

/// Every suffix of the path with the note extension stripped, most specific
/// first: `A/B/C.md` yields `["C", "B/C", "A/B/C"]`.
pub fn name_fragments(path: &str) -> Vec<String> {
    let stem = strip_note_extension(path);
    let segments: Vec<&str> = stem.split('/').filter(|s| return !s.is_empty()).collect();
    return (0..segments.len())
        .rev()
        .filter_map(|start| return segments.get(start..).map(|tail| return tail.join("/")))
        .collect();
}

/// Handle a single segment during normalisation.
fn push_normalized_segment<'a>(segments: &mut Vec<&'a str>, segment: &'a str) {
    match segment {
        "" | "." => {},
        ".." => {
            let can_pop = matches!(segments.last(), Some(last) if *last != "..");
            if can_pop {
                segments.pop();
            } else {
                segments.push(segment);
            }
        },
        other => segments.push(other),
    }
}

/// Strip a trailing `.md` (any case) from a path. A bare `.md` is left alone.
pub fn strip_note_extension(path: &str) -> &str {
    let Some(split) = path.len().checked_sub(NOTE_SUFFIX.len()) else {
        return path;
    };
    let (Some(stem), Some(suffix)) = (path.get(..split), path.get(split..)) else {
        return path;
    };
    if stem.is_empty() || stem.ends_with('/') || !suffix.eq_ignore_ascii_case(NOTE_SUFFIX) {
        return path;
    }
    return stem;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_most_specific_first() {
        assert_eq!(name_fragments("A/B/C.md"), vec!["C", "B/C", "A/B/C"]);
    }

    #[test]
    fn fragments_of_root_note() {
        assert_eq!(name_fragments("Welcome.md"), vec!["Welcome"]);
    }

    #[test]
    fn fragments_preserve_case() {
        assert_eq!(name_fragments("Campaign/NPCs/Villain.MD"), vec!["Villain", "NPCs/Villain", "Campaign/NPCs/Villain"]);
    }

    #[test]
    fn ancestors_nearest_first() {
        assert_eq!(ancestor_folders("Campaign/NPCs/Allies"), vec!["Campaign/NPCs", "Campaign", ""]);
        assert_eq!(ancestor_folders("Campaign"), vec![""]);
        assert!(ancestor_folders("").is_empty());
    }

    #[test]
    fn normalizes_parent_segments() {
        assert_eq!(join_normalized("Campaign/NPCs", "../Locations/Waterdeep.md"), "Campaign/Locations/Waterdeep.md");
        assert_eq!(join_normalized("Campaign", "./img/map.png"), "Campaign/img/map.png");
    }

    #[test]
    fn keeps_unpoppable_parent() {
        assert_eq!(join_normalized("", "../outside.png"), "../outside.png");
    }

    #[test]
    fn extension_heuristics() {
        assert_eq!(extension("images/dragon.png"), Some("png"));
        assert_eq!(extension("Mr. Smith"), None);
        assert_eq!(extension("Release v1.2"), None);
        assert_eq!(extension(".hidden"), None);
        assert!(is_note_target("Waterdeep"));
        assert!(is_note_target("Waterdeep.md"));
        assert!(!is_note_target("map.pdf"));
    }

    #[test]
    fn recognizes_external_schemes() {
        assert!(is_external("https://example.com/a.png"));
        assert!(is_external("data:image/png;base64,AAAA"));
        assert!(is_external("mailto:dm@example.com"));
        assert!(!is_external("images/dragon.png"));
        assert!(!is_external("C:notes"));
    }

    #[test]
    fn strips_note_extension_only() {
        assert_eq!(strip_note_extension("A/B.md"), "A/B");
        assert_eq!(strip_note_extension("A/B.png"), "A/B.png");
        assert_eq!(strip_note_extension(".md"), ".md");
    }

    #[test]
    fn destination_encoding_round_trips() {
        let encoded = encode_destination("my maps/keep (old).png");
        assert_eq!(encoded, "my%20maps/keep%20%28old%29.png");
        assert_eq!(decode_destination(&encoded), "my maps/keep (old).png");
    }
}
