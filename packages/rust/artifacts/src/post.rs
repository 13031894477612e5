//! Post page rendering: pure mapping from assembled pieces to the final
//! document via exact placeholder-token replacement.

use postforge_shared::ArticleRecord;

use crate::cards::article_card;
use crate::templates::render;

/// Everything the post template consumes. Field order mirrors the token
/// list in [`crate::templates::POST_TOKENS`].
#[derive(Debug, Clone, Default)]
pub struct PostTokens {
    pub title: String,
    pub meta_description: String,
    pub slug: String,
    pub date_iso: String,
    pub date_display: String,
    pub category_name: String,
    pub category_slug: String,
    pub read_time: u32,
    pub word_count: usize,
    pub image_alt: String,
    pub toc: String,
    pub content: String,
    pub faq_html: String,
    pub faq_json_ld: String,
    pub related_posts: String,
    pub base_url: String,
    pub year: i32,
}

/// Substitute every token into the post template.
pub fn render_post(template: &str, tokens: &PostTokens) -> String {
    let read_time = tokens.read_time.to_string();
    let word_count = tokens.word_count.to_string();
    let year = tokens.year.to_string();

    render(
        template,
        &[
            ("{{TITLE}}", tokens.title.as_str()),
            ("{{META_DESCRIPTION}}", tokens.meta_description.as_str()),
            ("{{SLUG}}", tokens.slug.as_str()),
            ("{{DATE_ISO}}", tokens.date_iso.as_str()),
            ("{{DATE_DISPLAY}}", tokens.date_display.as_str()),
            ("{{CATEGORY}}", tokens.category_name.as_str()),
            ("{{CATEGORY_SLUG}}", tokens.category_slug.as_str()),
            ("{{READ_TIME}}", read_time.as_str()),
            ("{{WORD_COUNT}}", word_count.as_str()),
            ("{{IMAGE_ALT}}", tokens.image_alt.as_str()),
            ("{{TOC}}", tokens.toc.as_str()),
            ("{{CONTENT}}", tokens.content.as_str()),
            ("{{FAQ_HTML}}", tokens.faq_html.as_str()),
            ("{{FAQ_JSON_LD}}", tokens.faq_json_ld.as_str()),
            ("{{RELATED_POSTS}}", tokens.related_posts.as_str()),
            ("{{BASE_URL}}", tokens.base_url.as_str()),
            ("{{YEAR}}", year.as_str()),
        ],
    )
}

/// Build the related-articles block: the 3 most recently published records,
/// excluding the current slug. Empty string when nothing qualifies.
pub fn related_posts_block(
    records: &[ArticleRecord],
    current_slug: &str,
    base_url: &str,
) -> String {
    let related: Vec<&ArticleRecord> = records
        .iter()
        .rev()
        .filter(|r| r.slug != current_slug)
        .take(3)
        .collect();

    if related.is_empty() {
        return String::new();
    }

    let mut html = String::from(
        r#"<div class="related-posts"><h2>Das koennte dich auch interessieren</h2><div class="card-grid">"#,
    );
    for record in related {
        html.push_str(&article_card(record, base_url, false));
    }
    html.push_str("</div></div>");
    html
}
