//! FAQ and sources blocks appended to assembled pages.

use postforge_shared::{FaqEntry, Source};

/// Render the FAQ section and the matching FAQPage JSON-LD items.
///
/// Returns `(faq_html, faq_json_ld)`. Both are empty strings when there
/// are no entries; the JSON-LD string is the comma-joined item list that
/// the post template embeds in its FAQPage scaffold.
pub fn faq_blocks(faq: &[FaqEntry]) -> (String, String) {
    if faq.is_empty() {
        return (String::new(), String::new());
    }

    let mut html =
        String::from(r#"<section class="faq-section"><h2>Haeufig gestellte Fragen</h2>"#);
    let mut ld_items = Vec::with_capacity(faq.len());

    for entry in faq {
        html.push_str(&format!(
            r#"<div class="faq-item"><div class="faq-question">{}</div><div class="faq-answer">{}</div></div>"#,
            entry.question, entry.answer
        ));
        // serde_json handles the quoting/escaping of free text.
        ld_items.push(format!(
            r#"{{"@type":"Question","name":{},"acceptedAnswer":{{"@type":"Answer","text":{}}}}}"#,
            serde_json::to_string(&entry.question).unwrap_or_else(|_| "\"\"".into()),
            serde_json::to_string(&entry.answer).unwrap_or_else(|_| "\"\"".into()),
        ));
    }
    html.push_str("</section>");

    (html, ld_items.join(","))
}

/// Render the verified-sources block. Empty result for no sources.
pub fn sources_block(sources: &[Source]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut html = String::from(r#"<section class="sources-section"><h2>Quellen</h2><ul>"#);
    for source in sources {
        html.push_str(&format!(
            r#"<li><a href="{}" rel="nofollow noopener" target="_blank">{}</a></li>"#,
            source.url, source.title
        ));
    }
    html.push_str("</ul></section>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq() -> Vec<FaqEntry> {
        vec![
            FaqEntry {
                question: "Wie lange dauert ein Segelschein?".into(),
                answer: "Meist zwei Wochen Praxis plus Theorie.".into(),
            },
            FaqEntry {
                question: "Was kostet \"SBF See\"?".into(),
                answer: "Etwa 400-600 Euro.".into(),
            },
        ]
    }

    #[test]
    fn faq_renders_all_entries() {
        let (html, ld) = faq_blocks(&faq());
        assert!(html.starts_with(r#"<section class="faq-section">"#));
        assert_eq!(html.matches("faq-item").count(), 2);
        assert!(html.contains("Segelschein"));

        // JSON-LD items form a valid array once wrapped
        let wrapped = format!("[{ld}]");
        let parsed: serde_json::Value = serde_json::from_str(&wrapped).expect("valid JSON-LD");
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["name"], "Was kostet \"SBF See\"?");
    }

    #[test]
    fn empty_faq_renders_nothing() {
        let (html, ld) = faq_blocks(&[]);
        assert!(html.is_empty());
        assert!(ld.is_empty());
    }

    #[test]
    fn sources_render_as_nofollow_list() {
        let sources = vec![Source {
            title: "DWD Seewetter".into(),
            url: "https://www.dwd.de/seewetter".into(),
        }];
        let html = sources_block(&sources);
        assert!(html.contains(r#"href="https://www.dwd.de/seewetter""#));
        assert!(html.contains("nofollow"));
        assert!(html.contains("DWD Seewetter"));

        assert!(sources_block(&[]).is_empty());
    }
}
