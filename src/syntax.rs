//! Reference syntax on both sides: the patterns extractors match and the
//! renderers resolvers emit.
//!
//! Vault (markup) side: `[[Target#Heading|Label]]`, `![alt](path)`, `[text](path)`.
//! Store side: `@UUID[identifier]{label}`, `<img src alt>`, `<a href>label</a>`.

/// Attribute inside an HTML tag: double-quoted, single-quoted, or bare value.
pub const HTML_ATTRIBUTE_PATTERN: &str = r#"([A-Za-z][A-Za-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#;

/// `<a ...>label</a>`; group 1 is the attribute text, group 2 the label.
pub const HTML_ANCHOR_PATTERN: &str = r"(?is)<a\b([^>]*)>(.*?)</a\s*>";

/// `<img ...>`; group 1 is the attribute text.
pub const HTML_IMAGE_PATTERN: &str = r"(?i)<img\b([^>]*)>";

/// Any tag, for flattening anchor labels to text.
pub const HTML_TAG_PATTERN: &str = r"<[^>]*>";

/// `![alt](dest "title")` or `[text](dest)`; `<dest with spaces>` allowed.
pub const MARKDOWN_LINK_PATTERN: &str = r#"(!?)\[([^\[\]\n]*)\]\(\s*(<[^<>\n]+>|[^()\s]+)(?:\s+"[^"\n]*")?\s*\)"#;

/// `@UUID[identifier]{label}` with the label optional.
pub const STORE_LINK_PATTERN: &str = r"@UUID\[([^\[\]\n]+)\](?:\{([^{}\n]*)\})?";

/// `[[target]]` or `![[target]]`; group 2 holds target, heading and alias.
pub const WIKILINK_PATTERN: &str = r"(!?)\[\[([^\[\]\n]+?)\]\]";

/// Characters that would end a markdown link label early.
const MARKDOWN_LABEL_RESERVED: &[char] = &['[', ']'];

/// Characters that would end a store link label early.
const STORE_LABEL_RESERVED: &[char] = &['{', '}'];

/// Characters that would end a wiki-link target, heading or alias early.
const WIKILINK_LABEL_RESERVED: &[char] = &['[', ']', '|'];

/// Drop `reserved` characters and fold line breaks, so the text cannot close
/// the surrounding syntax. `None` when nothing printable is left.
fn clean_label(text: &str, reserved: &[char]) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| return !reserved.contains(c))
        .map(|c| return if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    return (!cleaned.is_empty()).then(|| return cleaned.to_string());
}

/// Escape text for an HTML attribute value or element body.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    return out;
}

/// `<a href="path">label</a>` for a linked asset.
pub fn html_anchor(data_path: &str, label: &str) -> String {
    return format!("<a href=\"{}\">{}</a>", escape_html(data_path), escape_html(label));
}

/// `<img src="path" alt="alt">` for an embedded asset.
pub fn html_image(data_path: &str, alt: &str) -> String {
    return format!("<img src=\"{}\" alt=\"{}\">", escape_html(data_path), escape_html(alt));
}

/// `![alt](path)` or `[label](path)` with the destination percent-encoded.
/// A link with no label shows the file name.
pub fn markdown_asset(path: &str, label: Option<&str>, embedded: bool) -> String {
    let destination = crate::paths::encode_destination(path);
    let label = label.and_then(|l| return clean_label(l, MARKDOWN_LABEL_RESERVED));
    if embedded {
        return format!("![{}]({destination})", label.unwrap_or_default());
    }
    let text = label.unwrap_or_else(|| return crate::paths::file_name(path).to_string());
    return format!("[{text}]({destination})");
}

/// `[![alt](image) caption](path)`: an image that links to another asset.
pub fn markdown_linked_image(path: &str, image_path: &str, image_alt: Option<&str>, caption: Option<&str>) -> String {
    let image = markdown_asset(image_path, image_alt, true);
    let caption = caption
        .and_then(|c| return clean_label(c, MARKDOWN_LABEL_RESERVED))
        .map(|c| return format!(" {c}"))
        .unwrap_or_default();
    return format!("[{image}{caption}]({})", crate::paths::encode_destination(path));
}

/// `@UUID[identifier#heading]{label}`, or without braces when unlabelled.
/// Braces in the label are dropped.
pub fn store_link(identifier: &str, heading: Option<&str>, label: Option<&str>) -> String {
    let anchor = heading.map(|h| return format!("#{h}")).unwrap_or_default();
    return match label.and_then(|l| return clean_label(l, STORE_LABEL_RESERVED)) {
        None => format!("@UUID[{identifier}{anchor}]"),
        Some(text) => format!("@UUID[{identifier}{anchor}]{{{text}}}"),
    };
}

/// Decode the handful of entities `escape_html` produces, plus `&nbsp;`.
pub fn unescape_html(text: &str) -> String {
    return text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
}

/// `[[address#heading|label]]`; the alias is dropped when absent or equal
/// to the address. Brackets and pipes in the heading and label are dropped.
pub fn wikilink(address: &str, heading: Option<&str>, label: Option<&str>) -> String {
    let anchor = heading
        .and_then(|h| return clean_label(h, WIKILINK_LABEL_RESERVED))
        .map(|h| return format!("#{h}"))
        .unwrap_or_default();
    return match label.and_then(|l| return clean_label(l, WIKILINK_LABEL_RESERVED)) {
        Some(text) if text != address => format!("[[{address}{anchor}|{text}]]"),
        _ => format!("[[{address}{anchor}]]"),
    };
}
