//! Page assembly and site rebuild.
//!
//! [`build_post_page`] is the pure half: markup passes plus template
//! substitution. The write functions put the results on disk, and
//! [`rebuild_site`] regenerates every derived page from the full record
//! set, a pure function of the store rather than an incremental patch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info, instrument};

use postforge_artifacts::{
    ABOUT_TEMPLATE, CATEGORY_TEMPLATE, INDEX_TEMPLATE, PostTokens, load_template,
    related_posts_block, render_about, render_category, render_index, render_post, render_sitemap,
};
use postforge_markup::{build_toc, embed_widgets, faq_blocks, sources_block};
use postforge_shared::{
    AppConfig, ArticleRecord, CATEGORIES, FaqEntry, PostforgeError, Result, Source, TopicRecord,
    german_date_display, read_time_minutes,
};

/// Inputs to post page assembly.
#[derive(Debug)]
pub struct PostInputs<'a> {
    pub topic: &'a TopicRecord,
    /// Final article body (post-gate, post-monetization).
    pub content: &'a str,
    pub faq: &'a [FaqEntry],
    pub sources: &'a [Source],
    /// Full record set, for the related-articles block.
    pub records: &'a [ArticleRecord],
    pub image_alt: &'a str,
    pub now: DateTime<Utc>,
}

/// An assembled post page plus derived metrics.
#[derive(Debug, Clone)]
pub struct AssembledPost {
    pub html: String,
    pub word_count: usize,
    pub read_time: u32,
}

/// Assemble the final post document.
#[instrument(skip_all, fields(slug = %input.topic.slug))]
pub fn build_post_page(template: &str, config: &AppConfig, input: &PostInputs<'_>) -> AssembledPost {
    let word_count = input.content.split_whitespace().count();
    let read_time = read_time_minutes(input.content);

    // TOC first (heading ids), then widget tokens, then appended blocks.
    let toc = build_toc(input.content);
    let mut content = embed_widgets(&toc.content);
    let sources = sources_block(input.sources);
    if !sources.is_empty() {
        content.push('\n');
        content.push_str(&sources);
    }

    let (faq_html, faq_json_ld) = faq_blocks(input.faq);
    let related = related_posts_block(input.records, &input.topic.slug, &config.site.base_url);

    let html = render_post(
        template,
        &PostTokens {
            title: input.topic.title.clone(),
            meta_description: input.topic.meta_description.clone(),
            slug: input.topic.slug.clone(),
            date_iso: input.now.format("%Y-%m-%d").to_string(),
            date_display: german_date_display(input.now),
            category_name: input.topic.category.name().to_string(),
            category_slug: input.topic.category.slug().to_string(),
            read_time,
            word_count,
            image_alt: input.image_alt.to_string(),
            toc: toc.toc_html,
            content,
            faq_html,
            faq_json_ld,
            related_posts: related,
            base_url: config.site.base_url.clone(),
            year: input.now.year(),
        },
    );

    AssembledPost {
        html,
        word_count,
        read_time,
    }
}

/// Write the post directory: `docs/posts/<slug>/{index.html, hero.webp}`.
pub fn write_post(docs_dir: &Path, slug: &str, html: &str, image: &[u8]) -> Result<PathBuf> {
    let post_dir = docs_dir.join("posts").join(slug);
    std::fs::create_dir_all(&post_dir).map_err(|e| PostforgeError::io(&post_dir, e))?;

    let html_path = post_dir.join("index.html");
    std::fs::write(&html_path, html).map_err(|e| PostforgeError::io(&html_path, e))?;

    let image_path = post_dir.join("hero.webp");
    std::fs::write(&image_path, image).map_err(|e| PostforgeError::io(&image_path, e))?;

    debug!(path = %post_dir.display(), "post written");
    Ok(post_dir)
}

/// Rebuild every derived page from the full record set: home feed,
/// category feeds, about page, sitemap, and static assets.
#[instrument(skip_all, fields(records = records.len()))]
pub fn rebuild_site(config: &AppConfig, records: &[ArticleRecord], now: DateTime<Utc>) -> Result<()> {
    let docs_dir = Path::new(&config.paths.docs_dir);
    let templates_dir = Path::new(&config.paths.templates_dir);
    let base_url = &config.site.base_url;
    let year = now.year();

    std::fs::create_dir_all(docs_dir).map_err(|e| PostforgeError::io(docs_dir, e))?;

    // Home feed
    let index_template = load_template(templates_dir, "index.html", INDEX_TEMPLATE);
    let index_html = render_index(&index_template, records, base_url, year);
    let index_path = docs_dir.join("index.html");
    std::fs::write(&index_path, index_html).map_err(|e| PostforgeError::io(&index_path, e))?;

    // Category feeds
    let category_template = load_template(templates_dir, "category.html", CATEGORY_TEMPLATE);
    for category in CATEGORIES {
        let html = render_category(&category_template, category, records, base_url, year);
        let dir = docs_dir.join("kategorie").join(category.slug());
        std::fs::create_dir_all(&dir).map_err(|e| PostforgeError::io(&dir, e))?;
        let path = dir.join("index.html");
        std::fs::write(&path, html).map_err(|e| PostforgeError::io(&path, e))?;
    }

    // About page
    let about_template = load_template(templates_dir, "about.html", ABOUT_TEMPLATE);
    let about_html = render_about(&about_template, base_url, year);
    let about_dir = docs_dir.join("about");
    std::fs::create_dir_all(&about_dir).map_err(|e| PostforgeError::io(&about_dir, e))?;
    let about_path = about_dir.join("index.html");
    std::fs::write(&about_path, about_html).map_err(|e| PostforgeError::io(&about_path, e))?;

    // Sitemap
    let sitemap = render_sitemap(records, &config.site.site_url);
    let sitemap_path = docs_dir.join("sitemap.xml");
    std::fs::write(&sitemap_path, sitemap).map_err(|e| PostforgeError::io(&sitemap_path, e))?;

    sync_assets(templates_dir, docs_dir)?;

    info!(records = records.len(), "site rebuilt");
    Ok(())
}

/// Copy static assets from the templates directory: `base.css` +
/// `widgets.css` are concatenated into `css/style.css`; `widgets.js` and
/// `waves.js` are copied into `js/`. Missing source files are skipped.
fn sync_assets(templates_dir: &Path, docs_dir: &Path) -> Result<()> {
    let css_parts: Vec<String> = ["base.css", "widgets.css"]
        .iter()
        .filter_map(|name| std::fs::read_to_string(templates_dir.join(name)).ok())
        .collect();

    if !css_parts.is_empty() {
        let css_dir = docs_dir.join("css");
        std::fs::create_dir_all(&css_dir).map_err(|e| PostforgeError::io(&css_dir, e))?;
        let css_path = css_dir.join("style.css");
        std::fs::write(&css_path, css_parts.join("\n"))
            .map_err(|e| PostforgeError::io(&css_path, e))?;
    }

    for name in ["widgets.js", "waves.js"] {
        let source = templates_dir.join(name);
        if !source.exists() {
            debug!(asset = name, "asset missing, skipped");
            continue;
        }
        let js_dir = docs_dir.join("js");
        std::fs::create_dir_all(&js_dir).map_err(|e| PostforgeError::io(&js_dir, e))?;
        let target = js_dir.join(name);
        std::fs::copy(&source, &target).map_err(|e| PostforgeError::io(&target, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use postforge_artifacts::{POST_TEMPLATE, POST_TOKENS, unresolved_tokens};
    use postforge_shared::Category;

    fn topic() -> TopicRecord {
        TopicRecord {
            topic: "Ankern".into(),
            title: "Ankern lernen".into(),
            meta_description: "So haelt der Anker.".into(),
            keywords: vec![],
            category: Category::Grundlagen,
            content_type: "ratgeber".into(),
            slug: "ankern-lernen".into(),
            image_prompt: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap()
    }

    fn record(slug: &str) -> ArticleRecord {
        ArticleRecord {
            slug: slug.into(),
            title: format!("Titel {slug}"),
            meta_description: "d".into(),
            category: Category::Wissen,
            keywords: vec![],
            date_iso: "2026-08-01".into(),
            date_display: "1. August 2026".into(),
            read_time: 5,
            image_alt: "alt".into(),
            content_type: "wissen".into(),
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pf-assemble-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn post_page_has_no_unresolved_tokens() {
        let config = AppConfig::default();
        let topic = topic();
        let input = PostInputs {
            topic: &topic,
            content: "<h2>Eins</h2><p>a</p><h2>Zwei</h2><p>b</p>",
            faq: &[FaqEntry {
                question: "Q?".into(),
                answer: "A.".into(),
            }],
            sources: &[Source {
                title: "DWD".into(),
                url: "https://dwd.example/".into(),
            }],
            records: &[record("anderes")],
            image_alt: "Boot vor Anker",
            now: now(),
        };

        let assembled = build_post_page(POST_TEMPLATE, &config, &input);
        assert!(unresolved_tokens(&assembled.html, &POST_TOKENS).is_empty());
        assert!(assembled.html.contains(r#"<h2 id="section-1">Eins</h2>"#));
        assert!(assembled.html.contains("sources-section"));
        assert!(assembled.html.contains("faq-section"));
        assert!(assembled.html.contains("Titel anderes"));
        assert!(assembled.html.contains("7. August 2026"));
    }

    #[test]
    fn metrics_derive_from_content() {
        let config = AppConfig::default();
        let topic = topic();
        let words = vec!["wort"; 401].join(" ");
        let content = format!("<p>{words}</p>");
        let input = PostInputs {
            topic: &topic,
            content: &content,
            faq: &[],
            sources: &[],
            records: &[],
            image_alt: "alt",
            now: now(),
        };

        let assembled = build_post_page(POST_TEMPLATE, &config, &input);
        assert_eq!(assembled.word_count, 401);
        assert_eq!(assembled.read_time, 3);
    }

    #[test]
    fn write_post_creates_directory_pair() {
        let tmp = temp_dir();
        let post_dir = write_post(&tmp, "ankern-lernen", "<html></html>", b"img").unwrap();

        assert!(post_dir.join("index.html").exists());
        assert!(post_dir.join("hero.webp").exists());
        assert_eq!(
            std::fs::read(post_dir.join("hero.webp")).unwrap(),
            b"img"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rebuild_writes_every_derived_page() {
        let tmp = temp_dir();
        let mut config = AppConfig::default();
        config.paths.docs_dir = tmp.join("docs").to_string_lossy().to_string();
        config.paths.templates_dir = tmp.join("templates").to_string_lossy().to_string();

        let records = vec![record("ankern-lernen")];
        rebuild_site(&config, &records, now()).unwrap();

        let docs = tmp.join("docs");
        assert!(docs.join("index.html").exists());
        assert!(docs.join("about/index.html").exists());
        assert!(docs.join("sitemap.xml").exists());
        for category in CATEGORIES {
            assert!(docs.join("kategorie").join(category.slug()).join("index.html").exists());
        }

        let sitemap = std::fs::read_to_string(docs.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("posts/ankern-lernen/"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rebuild_is_a_pure_function_of_the_record_set() {
        let tmp = temp_dir();
        let mut config = AppConfig::default();
        config.paths.docs_dir = tmp.join("docs").to_string_lossy().to_string();
        config.paths.templates_dir = tmp.join("templates").to_string_lossy().to_string();

        rebuild_site(&config, &[record("eins"), record("zwei")], now()).unwrap();
        let first = std::fs::read_to_string(tmp.join("docs/index.html")).unwrap();

        // Rebuilding from the same records reproduces the same pages.
        rebuild_site(&config, &[record("eins"), record("zwei")], now()).unwrap();
        let second = std::fs::read_to_string(tmp.join("docs/index.html")).unwrap();
        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn assets_sync_when_present() {
        let tmp = temp_dir();
        let templates = tmp.join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(templates.join("base.css"), "body{}").unwrap();
        std::fs::write(templates.join("widgets.css"), ".widget{}").unwrap();
        std::fs::write(templates.join("widgets.js"), "// js").unwrap();

        let mut config = AppConfig::default();
        config.paths.docs_dir = tmp.join("docs").to_string_lossy().to_string();
        config.paths.templates_dir = templates.to_string_lossy().to_string();

        rebuild_site(&config, &[], now()).unwrap();

        let css = std::fs::read_to_string(tmp.join("docs/css/style.css")).unwrap();
        assert!(css.contains("body{}"));
        assert!(css.contains(".widget{}"));
        assert!(tmp.join("docs/js/widgets.js").exists());
        // waves.js was absent and is simply skipped
        assert!(!tmp.join("docs/js/waves.js").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
