//! Tolerant JSON extraction from generative free-text replies.
//!
//! Adapters return prose that is *expected* to contain exactly one JSON
//! object. Extraction is tagged so callers can distinguish degraded-but-
//! usable output from total failure:
//! - [`Extraction::Parsed`] — strict parse of the located object succeeded
//! - [`Extraction::Recovered`] — strict parse failed, a field-level
//!   heuristic salvaged usable data
//! - [`Extraction::Failed`] — nothing usable could be located

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use postforge_shared::{Draft, FaqEntry};

/// Outcome of extracting a typed value from free text.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    /// The located JSON object parsed strictly.
    Parsed(T),
    /// Strict parsing failed; a recovery heuristic produced a usable value.
    Recovered(T),
    /// No usable value could be extracted.
    Failed,
}

impl<T> Extraction<T> {
    /// The extracted value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Parsed(v) | Self::Recovered(v) => Some(v),
            Self::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Locate the outermost JSON object in free text: everything from the
/// first `{` to the matching last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract and strictly parse one JSON object from free text.
///
/// There is no generic recovery: anything that does not parse strictly is
/// [`Extraction::Failed`]. Type-specific recovery lives next to the type
/// (see [`parse_draft`]).
pub fn parse_object<T: DeserializeOwned>(text: &str) -> Extraction<T> {
    let Some(object) = extract_json_object(text) else {
        return Extraction::Failed;
    };
    match serde_json::from_str(object) {
        Ok(value) => Extraction::Parsed(value),
        Err(_) => Extraction::Failed,
    }
}

// ---------------------------------------------------------------------------
// Draft recovery
// ---------------------------------------------------------------------------

/// Parse a drafting reply into a [`Draft`].
///
/// Strict JSON first. On failure, the recovery heuristic extracts the
/// `content` field by pattern matching (with JSON-escape unescaping) and
/// `faq` as a best-effort array. A recovered draft may have an empty FAQ
/// and empty alt text, but its content is never truncated.
pub fn parse_draft(text: &str) -> Extraction<Draft> {
    if let Extraction::Parsed(draft) = parse_object::<Draft>(text) {
        return Extraction::Parsed(draft);
    }

    let Some(content) = recover_string_field(text, "content") else {
        return Extraction::Failed;
    };
    if content.trim().is_empty() {
        return Extraction::Failed;
    }

    let faq = recover_faq(text).unwrap_or_default();
    let image_alt = recover_string_field(text, "image_alt").unwrap_or_default();

    Extraction::Recovered(Draft {
        content,
        faq,
        image_alt,
    })
}

/// Pull a named string field out of malformed JSON-ish text.
///
/// Matches `"<name>": "…"` and scans to the first unescaped closing quote,
/// then unescapes the common JSON string escapes.
fn recover_string_field(text: &str, name: &str) -> Option<String> {
    let marker = format!("\"{name}\"");
    let field_at = text.find(&marker)?;
    let after = &text[field_at + marker.len()..];
    let colon = after.find(':')?;
    let after = after[colon + 1..].trim_start();
    let rest = after.strip_prefix('"')?;

    let mut raw = String::new();
    let mut escaped = false;
    for ch in rest.chars() {
        if escaped {
            raw.push('\\');
            raw.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return Some(unescape_json(&raw)),
            _ => raw.push(ch),
        }
    }
    // Unterminated string: the reply was cut off. Take what is there
    // rather than dropping the whole draft.
    Some(unescape_json(&raw))
}

/// Best-effort recovery of the `faq` array from malformed text.
fn recover_faq(text: &str) -> Option<Vec<FaqEntry>> {
    static FAQ_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#""faq"\s*:\s*(\[[\s\S]*?\])\s*[,}]"#).expect("valid regex")
    });
    let caps = FAQ_RE.captures(text)?;
    serde_json::from_str::<Vec<FaqEntry>>(&caps[1]).ok()
}

/// Unescape the common JSON string escapes.
fn unescape_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                if let Some(c) =
                    u32::from_str_radix(&code, 16).ok().and_then(char::from_u32)
                {
                    out.push(c);
                } else {
                    out.push_str("\\u");
                    out.push_str(&code);
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
