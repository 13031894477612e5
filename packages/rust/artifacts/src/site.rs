//! Derived listing pages: home feed, category feeds, about page, sitemap.
//!
//! Every renderer is a pure function of the full record set; the rebuild
//! is never an incremental patch.

use postforge_shared::{ArticleRecord, CATEGORIES, Category};

use crate::cards::{article_card, category_card};
use crate::templates::render;

/// Placeholder shown in an empty feed.
const EMPTY_FEED: &str = r#"<p class="feed-empty">Noch keine Artikel vorhanden.</p>"#;

/// Placeholder shown in an empty category feed.
const EMPTY_CATEGORY: &str =
    r#"<p class="feed-empty">Noch keine Artikel in dieser Kategorie.</p>"#;

/// Render the home page: all articles newest-first (first card featured
/// when there is more than one), plus the category card grid.
pub fn render_index(template: &str, records: &[ArticleRecord], base_url: &str, year: i32) -> String {
    let newest_first: Vec<&ArticleRecord> = records.iter().rev().collect();

    let cards = if newest_first.is_empty() {
        EMPTY_FEED.to_string()
    } else {
        newest_first
            .iter()
            .enumerate()
            .map(|(i, record)| {
                article_card(record, base_url, i == 0 && newest_first.len() > 1)
            })
            .collect()
    };

    let category_cards: String = CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let count = records.iter().filter(|r| r.category == *category).count();
            category_card(*category, count, base_url, i + 1)
        })
        .collect();

    let year = year.to_string();
    render(
        template,
        &[
            ("{{POST_CARDS}}", cards.as_str()),
            ("{{CATEGORY_CARDS}}", category_cards.as_str()),
            ("{{BASE_URL}}", base_url),
            ("{{YEAR}}", year.as_str()),
        ],
    )
}

/// Render one category feed, newest-first.
pub fn render_category(
    template: &str,
    category: Category,
    records: &[ArticleRecord],
    base_url: &str,
    year: i32,
) -> String {
    let cards: String = records
        .iter()
        .rev()
        .filter(|r| r.category == category)
        .map(|record| article_card(record, base_url, false))
        .collect();

    let cards = if cards.is_empty() {
        EMPTY_CATEGORY.to_string()
    } else {
        cards
    };

    let year = year.to_string();
    render(
        template,
        &[
            ("{{CATEGORY}}", category.name()),
            ("{{CATEGORY_SLUG}}", category.slug()),
            ("{{CATEGORY_DESCRIPTION}}", category.description()),
            ("{{POST_CARDS}}", cards.as_str()),
            ("{{BASE_URL}}", base_url),
            ("{{YEAR}}", year.as_str()),
        ],
    )
}

/// Render the about page.
pub fn render_about(template: &str, base_url: &str, year: i32) -> String {
    let year = year.to_string();
    render(
        template,
        &[("{{BASE_URL}}", base_url), ("{{YEAR}}", year.as_str())],
    )
}

/// Render `sitemap.xml` for the whole site.
pub fn render_sitemap(records: &[ArticleRecord], site_url: &str) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    xml.push_str(&format!(
        "  <url><loc>{site_url}/</loc><changefreq>daily</changefreq><priority>1.0</priority></url>\n"
    ));
    xml.push_str(&format!(
        "  <url><loc>{site_url}/about/</loc><changefreq>monthly</changefreq><priority>0.7</priority></url>\n"
    ));
    for category in CATEGORIES {
        xml.push_str(&format!(
            "  <url><loc>{site_url}/kategorie/{}/</loc><changefreq>weekly</changefreq><priority>0.8</priority></url>\n",
            category.slug()
        ));
    }
    for record in records.iter().rev() {
        xml.push_str(&format!(
            "  <url><loc>{site_url}/posts/{}/</loc><lastmod>{}</lastmod><changefreq>monthly</changefreq><priority>0.9</priority></url>\n",
            record.slug, record.date_iso
        ));
    }
    xml.push_str("</urlset>");
    xml
}
