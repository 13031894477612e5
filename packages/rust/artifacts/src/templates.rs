//! Template loading and placeholder substitution.
//!
//! Templates are fixed-format strings with `{{TOKEN}}` placeholders.
//! Substitution is total: every occurrence of every provided token is
//! replaced. Built-in templates ship with the crate; a file of the same
//! name in the configured templates directory overrides the built-in.

use std::path::Path;

use tracing::debug;

/// Built-in post page template.
pub const POST_TEMPLATE: &str = include_str!("../templates/post.html");

/// Built-in home page template.
pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Built-in category feed template.
pub const CATEGORY_TEMPLATE: &str = include_str!("../templates/category.html");

/// Built-in about page template.
pub const ABOUT_TEMPLATE: &str = include_str!("../templates/about.html");

/// The fixed token set consumed by the post template.
pub const POST_TOKENS: [&str; 17] = [
    "{{TITLE}}",
    "{{META_DESCRIPTION}}",
    "{{SLUG}}",
    "{{DATE_ISO}}",
    "{{DATE_DISPLAY}}",
    "{{CATEGORY}}",
    "{{CATEGORY_SLUG}}",
    "{{READ_TIME}}",
    "{{WORD_COUNT}}",
    "{{IMAGE_ALT}}",
    "{{TOC}}",
    "{{CONTENT}}",
    "{{FAQ_HTML}}",
    "{{FAQ_JSON_LD}}",
    "{{RELATED_POSTS}}",
    "{{BASE_URL}}",
    "{{YEAR}}",
];

/// Load a template by file name, preferring an override on disk.
pub fn load_template(templates_dir: &Path, file_name: &str, builtin: &'static str) -> String {
    let path = templates_dir.join(file_name);
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            debug!(path = %path.display(), "using template override");
            content
        }
        Err(_) => builtin.to_string(),
    }
}

/// Replace every occurrence of each `(token, value)` pair.
pub fn render(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (token, value) in replacements {
        out = out.replace(token, value);
    }
    out
}

/// Tokens from `tokens` still present in `html`. Empty means the
/// substitution was total.
pub fn unresolved_tokens<'a>(html: &str, tokens: &'a [&'a str]) -> Vec<&'a str> {
    tokens
        .iter()
        .copied()
        .filter(|token| html.contains(token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render(
            "{{A}} und {{B}} und nochmal {{A}}",
            &[("{{A}}", "eins"), ("{{B}}", "zwei")],
        );
        assert_eq!(out, "eins und zwei und nochmal eins");
    }

    #[test]
    fn builtin_post_template_contains_all_tokens() {
        for token in POST_TOKENS {
            assert!(
                POST_TEMPLATE.contains(token),
                "post template missing {token}"
            );
        }
    }

    #[test]
    fn builtin_index_template_tokens() {
        for token in ["{{POST_CARDS}}", "{{CATEGORY_CARDS}}", "{{BASE_URL}}", "{{YEAR}}"] {
            assert!(INDEX_TEMPLATE.contains(token), "index template missing {token}");
        }
    }

    #[test]
    fn unresolved_tokens_reports_leftovers() {
        let html = "fertig bis auf {{TOC}}";
        assert_eq!(unresolved_tokens(html, &POST_TOKENS), vec!["{{TOC}}"]);
        assert!(unresolved_tokens("alles ersetzt", &POST_TOKENS).is_empty());
    }

    #[test]
    fn load_template_prefers_override() {
        let dir = std::env::temp_dir().join(format!("pf-tpl-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("post.html"), "OVERRIDE {{TITLE}}").unwrap();

        let loaded = load_template(&dir, "post.html", POST_TEMPLATE);
        assert_eq!(loaded, "OVERRIDE {{TITLE}}");

        let fallback = load_template(&dir, "missing.html", INDEX_TEMPLATE);
        assert_eq!(fallback, INDEX_TEMPLATE);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
