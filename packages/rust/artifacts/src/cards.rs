//! Article and category card fragments shared by the home page, category
//! feeds, and the related-posts block.

use postforge_shared::{ArticleRecord, Category};

/// Render one article card. The first card on a non-trivial home feed is
/// `featured`.
pub fn article_card(record: &ArticleRecord, base_url: &str, featured: bool) -> String {
    let class = if featured {
        "card card-featured fade-in"
    } else {
        "card fade-in"
    };
    format!(
        r#"<div class="{class}"><div class="card-img-wrap"><img class="card-image" src="{base_url}/posts/{slug}/hero.webp" alt="{alt}" loading="lazy" width="600" height="240"></div><div class="card-body"><span class="card-category">{category}</span><h3 class="card-title"><a href="{base_url}/posts/{slug}/">{title}</a></h3><p class="card-excerpt">{excerpt}</p><div class="card-meta"><span>{read_time} Min. Lesezeit</span><span>{date}</span></div></div></div>"#,
        slug = record.slug,
        alt = if record.image_alt.is_empty() {
            &record.title
        } else {
            &record.image_alt
        },
        category = record.category.name(),
        title = record.title,
        excerpt = record.meta_description,
        read_time = record.read_time,
        date = record.date_display,
    )
}

/// Render one category card for the home page, with a zero-padded index
/// number and the article count.
pub fn category_card(category: Category, count: usize, base_url: &str, index: usize) -> String {
    format!(
        r#"<a class="cat-card fade-in" href="{base_url}/kategorie/{slug}/"><div class="cat-card-num">{index:02}</div><h3>{name}</h3><p>{desc}</p><span class="cat-card-count">{count} Artikel</span></a>"#,
        slug = category.slug(),
        name = category.name(),
        desc = category.description(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ArticleRecord {
        ArticleRecord {
            slug: "ankern-lernen".into(),
            title: "Ankern lernen".into(),
            meta_description: "So haelt der Anker.".into(),
            category: Category::Grundlagen,
            keywords: vec![],
            date_iso: "2026-08-07".into(),
            date_display: "7. August 2026".into(),
            read_time: 9,
            image_alt: "Boot vor Anker".into(),
            content_type: "ratgeber".into(),
        }
    }

    #[test]
    fn card_links_to_post() {
        let html = article_card(&record(), "/segeln-lernen", false);
        assert!(html.contains(r#"href="/segeln-lernen/posts/ankern-lernen/""#));
        assert!(html.contains("Ankern lernen"));
        assert!(html.contains("9 Min. Lesezeit"));
        assert!(!html.contains("card-featured"));
    }

    #[test]
    fn featured_card_gets_extra_class() {
        let html = article_card(&record(), "/segeln-lernen", true);
        assert!(html.contains("card card-featured fade-in"));
    }

    #[test]
    fn empty_alt_falls_back_to_title() {
        let mut r = record();
        r.image_alt = String::new();
        let html = article_card(&r, "/b", false);
        assert!(html.contains(r#"alt="Ankern lernen""#));
    }

    #[test]
    fn category_card_counts_and_pads() {
        let html = category_card(Category::Reviere, 4, "/segeln-lernen", 2);
        assert!(html.contains(r#"href="/segeln-lernen/kategorie/reviere/""#));
        assert!(html.contains(">02<"));
        assert!(html.contains("4 Artikel"));
    }
}
