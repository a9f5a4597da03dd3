//! Text cleanup utilities
//!
//! The retrieval pipeline runs page content through these in order:
//! [`strip_markup`], [`sanitize`], then [`truncate`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Suffix appended by [`truncate`] when it cuts text
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// `<script>` and `<style>` blocks with their contents.
/// Leftmost match wins, so a block closes at its own first closing tag.
static BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?>.*?</script>|<style.*?>.*?</style>").unwrap());

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Named entities only; numeric ones like `&#39;` are left alone
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[a-zA-Z]+;").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove every non-ASCII character
///
/// Characters outside U+0000..=U+007F are deleted, not replaced. ASCII
/// control characters pass through.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

/// Strip markup from HTML, leaving single-spaced text
///
/// Script and style blocks go first (contents included), then every
/// remaining tag and named entity becomes a space (`&nbsp;` included).
/// Whitespace runs collapse to one space and the ends are trimmed.
/// Malformed markup is matched best-effort by the same rules.
pub fn strip_markup(html: &str) -> String {
    let without_blocks = BLOCK_RE.replace_all(html, "");
    let without_tags = TAG_RE.replace_all(&without_blocks, " ");
    let without_entities = ENTITY_RE.replace_all(&without_tags, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_entities, " ");
    collapsed.trim().to_string()
}

/// Truncate text to at most `max_bytes` UTF-8 bytes
///
/// Text that already fits is returned unchanged. Otherwise the cut backs
/// off to the nearest char boundary, so a partial multi-byte character is
/// dropped rather than split, and [`TRUNCATION_MARKER`] is appended.
pub fn truncate(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut output = String::with_capacity(end + TRUNCATION_MARKER.len());
    output.push_str(&text[..end]);
    output.push_str(TRUNCATION_MARKER);
    output
}

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct_lower = ct.to_lowercase();
        if ct_lower.contains("text/html") || ct_lower.contains("application/xhtml") {
            return true;
        }
    }

    let trimmed = body.trim_start();
    let prefix: String = trimmed.chars().take(15).collect::<String>().to_lowercase();
    prefix.starts_with("<!doctype html") || prefix.starts_with("<html")
}
