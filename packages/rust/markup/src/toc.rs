//! Table-of-contents builder.
//!
//! Scans `<h2>` headings in document order, assigns sequential anchor ids
//! (`section-1`, `section-2`, …), rewrites each heading in place to carry
//! its id, and renders the TOC list.

use std::sync::LazyLock;

use regex::Regex;

static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").expect("valid regex"));

/// One TOC entry: anchor id and heading text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
}

/// Output of the TOC pass.
#[derive(Debug, Clone)]
pub struct TocResult {
    /// Rendered TOC block; empty string when the body has no `<h2>`.
    pub toc_html: String,
    /// Body with headings rewritten to carry their anchor ids.
    pub content: String,
    /// Entries in document order.
    pub entries: Vec<TocEntry>,
}

/// Build the TOC and rewrite headings.
pub fn build_toc(content: &str) -> TocResult {
    let mut entries = Vec::new();
    let mut rewritten = String::with_capacity(content.len() + 64);
    let mut last_end = 0;

    for (i, caps) in H2_RE.captures_iter(content).enumerate() {
        let whole = caps.get(0).expect("match");
        let title = caps[1].trim().to_string();
        let id = format!("section-{}", i + 1);

        rewritten.push_str(&content[last_end..whole.start()]);
        rewritten.push_str(&format!("<h2 id=\"{id}\">{title}</h2>"));
        last_end = whole.end();

        entries.push(TocEntry { id, title });
    }
    rewritten.push_str(&content[last_end..]);

    let toc_html = if entries.is_empty() {
        String::new()
    } else {
        let mut toc = String::from(r#"<div class="toc"><div class="toc-title">Inhalt</div><ol>"#);
        for entry in &entries {
            toc.push_str(&format!(
                r##"<li><a href="#{}">{}</a></li>"##,
                entry.id, entry.title
            ));
        }
        toc.push_str("</ol></div>");
        toc
    };

    TocResult {
        toc_html,
        content: rewritten,
        entries,
    }
}
