//! The pipeline orchestrator: one article from topic to published page.
//!
//! Stage order is fixed: topic research → drafting → fact-check → quality
//! gate → monetization → image acquisition → page assembly → link
//! validation → persistence → index rebuild → publish → notify. Optional
//! stages catch their own failures and degrade; only topic research,
//! drafting, and the page/store writes can fail the run.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use postforge_adapters::{ImageGenerator, LinkProbe, SearchProvider, TextGenerator};
use postforge_artifacts::{POST_TEMPLATE, load_template};
use postforge_markup::validate_links;
use postforge_shared::{AppConfig, ArticleRecord, Result, RunId};
use postforge_storage::ContentStore;

use crate::assemble::{self, PostInputs};
use crate::notify::Notifier;
use crate::publish::Publisher;
use crate::{draft, factcheck, images, monetize, quality, research};

/// The orchestrator's injected collaborators.
///
/// Everything external is a trait object handed in at construction;
/// tests substitute scripted fakes.
pub struct Collaborators {
    pub text: Arc<dyn TextGenerator>,
    /// Optional: absence disables fact-check and monetization lookup.
    pub search: Option<Arc<dyn SearchProvider>>,
    /// Image fallback chain, primary first.
    pub images: Vec<Arc<dyn ImageGenerator>>,
    pub probe: Arc<dyn LinkProbe>,
    pub publisher: Arc<dyn Publisher>,
    pub notifier: Arc<dyn Notifier>,
}

/// One-article pipeline bound to a configuration and its collaborators.
pub struct Pipeline {
    config: AppConfig,
    collaborators: Collaborators,
}

impl Pipeline {
    pub fn new(config: AppConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the pipeline for one article.
    ///
    /// `forced_topic` skips open-ended topic research in favor of metadata
    /// for that exact topic.
    #[instrument(skip_all, fields(run_id = %RunId::new(), forced = forced_topic.is_some()))]
    pub async fn run_one(
        &self,
        store: &ContentStore,
        forced_topic: Option<&str>,
    ) -> Result<ArticleRecord> {
        let config = &self.config;
        let c = &self.collaborators;
        let now = Utc::now();

        // Read the store once for de-duplication context.
        let articles = store.read_all().await?;
        let used_topics = store.read_used_topics().await?;
        let slugs = store.read_slugs().await?;

        // 1. Topic research (fatal on failure)
        let topic = research::research_topic(
            c.text.as_ref(),
            config,
            &articles,
            &used_topics,
            &slugs,
            forced_topic,
            now,
        )
        .await?;

        // 2. Drafting (fatal on failure)
        let article_draft =
            draft::write_article(c.text.as_ref(), config, &topic, &articles).await?;

        // 3. Fact-check (advisory)
        let fact_check = factcheck::verify(
            c.search.as_deref(),
            c.probe.as_ref(),
            &topic,
            &article_draft,
        )
        .await;

        // 4. Quality gate (never fails, returns some content)
        let gate = quality::run_gate(
            c.text.as_ref(),
            config,
            &topic,
            article_draft.content.clone(),
            fact_check.corrections.clone(),
        )
        .await;

        // 5. Monetization (no-op on any failure)
        let content = monetize::inject(
            c.search.as_deref(),
            c.probe.as_ref(),
            &config.monetization,
            &topic,
            gate.content,
        )
        .await;

        // 6. Image acquisition (always yields bytes)
        let chain: Vec<&dyn ImageGenerator> = c.images.iter().map(|g| g.as_ref()).collect();
        let image = images::acquire(&chain, &topic).await;

        // 7. Page assembly
        let templates_dir = Path::new(&config.paths.templates_dir);
        let template = load_template(templates_dir, "post.html", POST_TEMPLATE);
        let assembled = assemble::build_post_page(
            &template,
            config,
            &PostInputs {
                topic: &topic,
                content: &content,
                faq: &article_draft.faq,
                sources: &fact_check.sources,
                records: &articles,
                image_alt: &article_draft.image_alt,
                now,
            },
        );

        // 8. Link validation (idempotent, degrades per-URL)
        let html = validate_links(&assembled.html, c.probe.as_ref()).await;

        // 9. Write the post directory (fatal on failure)
        let docs_dir = Path::new(&config.paths.docs_dir);
        assemble::write_post(docs_dir, &topic.slug, &html, &image.bytes)?;

        // 10. Persist. The append is the last fatal step of the run.
        let record = ArticleRecord::from_run(&topic, &article_draft, now, assembled.read_time);
        store.append_article(&record).await?;
        store.append_used_topic(&topic.topic).await?;

        // 11. Rebuild derived pages from the full, re-read record set.
        // Advisory: the appended record stands even if this fails, and
        // `postforge rebuild` can resume it.
        match store.read_all().await {
            Ok(all_records) => {
                if let Err(e) = assemble::rebuild_site(config, &all_records, now) {
                    warn!(error = %e, "index rebuild failed, record already appended");
                }
            }
            Err(e) => warn!(error = %e, "re-read for rebuild failed, record already appended"),
        }

        // 12. Publish (advisory)
        if let Err(e) = c
            .publisher
            .commit_and_push(&format!("Neuer Artikel: {}", record.title))
        {
            warn!(error = %e, "publish failed");
        }

        // 13. Notify (advisory)
        if let Some(notify_config) = &config.notify {
            let subject = format!("Neuer Artikel online: {}", record.title);
            let body = format!(
                "<h2>{title}</h2>\
                 <p><strong>Kategorie:</strong> {category}</p>\
                 <p><strong>Lesezeit:</strong> {read_time} Min.</p>\
                 <p><a href=\"{site}/posts/{slug}/\">Artikel lesen &rarr;</a></p>",
                title = record.title,
                category = record.category.name(),
                read_time = record.read_time,
                site = config.site.site_url,
                slug = record.slug,
            );
            if let Err(e) = c
                .notifier
                .send(&notify_config.recipient, &subject, &body)
                .await
            {
                warn!(error = %e, "notification failed");
            }
        }

        info!(
            slug = %record.slug,
            title = %record.title,
            words = assembled.word_count,
            image_source = image.source,
            gate_passed = gate.passed,
            "article published"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::publish::NoopPublisher;
    use crate::testutil::{ScriptedImages, ScriptedText, TableProbe};
    use std::path::PathBuf;

    fn topic_json() -> String {
        r#"{
  "topic": "Ankern in der Ostsee",
  "title": "Ankern lernen",
  "meta_description": "So ankerst du sicher.",
  "keywords": ["ankern"],
  "image_prompt": "sailboat at anchor"
}"#
        .to_string()
    }

    fn draft_json() -> String {
        r#"{
  "content": "<h2>Technik</h2><p>Kette lang.</p><h2>Fazit</h2><p>Gut ankern.</p>",
  "faq": [{"question": "Wie lang?", "answer": "5:1."}],
  "image_alt": "Boot vor Anker"
}"#
        .to_string()
    }

    fn verdict_json(score: u8) -> String {
        format!(r#"{{"score": {score}, "issues": [], "suggestions": []}}"#)
    }

    struct TestEnv {
        config: AppConfig,
        root: PathBuf,
    }

    impl TestEnv {
        fn new() -> Self {
            let root = std::env::temp_dir().join(format!("pf-pipe-{}", uuid::Uuid::now_v7()));
            std::fs::create_dir_all(&root).unwrap();
            let mut config = AppConfig::default();
            config.paths.docs_dir = root.join("docs").to_string_lossy().to_string();
            config.paths.templates_dir = root.join("templates").to_string_lossy().to_string();
            config.paths.store_db = root.join("data/store.db").to_string_lossy().to_string();
            Self { config, root }
        }

        async fn store(&self) -> ContentStore {
            ContentStore::open(Path::new(&self.config.paths.store_db))
                .await
                .expect("open store")
        }
    }

    impl Drop for TestEnv {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }

    fn collaborators(text: ScriptedText) -> Collaborators {
        Collaborators {
            text: Arc::new(text),
            search: None,
            images: vec![Arc::new(ScriptedImages::new(
                "gemini",
                vec![Ok(Some(b"img".to_vec()))],
            ))],
            probe: Arc::new(TableProbe::new(&[])),
            publisher: Arc::new(NoopPublisher),
            notifier: Arc::new(LogNotifier),
        }
    }

    #[tokio::test]
    async fn full_run_publishes_and_persists() {
        let env = TestEnv::new();
        let store = env.store().await;
        let text = ScriptedText::new(vec![
            Ok(topic_json()),
            Ok(draft_json()),
            Ok(verdict_json(8)),
        ]);

        let pipeline = Pipeline::new(env.config.clone(), collaborators(text));
        let record = pipeline.run_one(&store, None).await.expect("run");

        assert_eq!(record.slug, "ankern-lernen");
        assert_eq!(record.image_alt, "Boot vor Anker");

        // Post directory written
        let post_dir = env.root.join("docs/posts/ankern-lernen");
        assert!(post_dir.join("index.html").exists());
        assert_eq!(std::fs::read(post_dir.join("hero.webp")).unwrap(), b"img");

        let html = std::fs::read_to_string(post_dir.join("index.html")).unwrap();
        assert!(html.contains(r#"<h2 id="section-1">Technik</h2>"#));
        assert!(!html.contains("{{TITLE}}"));

        // Store appended
        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        let topics = store.read_used_topics().await.unwrap();
        assert_eq!(topics, vec!["Ankern in der Ostsee"]);

        // Derived pages rebuilt
        assert!(env.root.join("docs/index.html").exists());
        assert!(env.root.join("docs/sitemap.xml").exists());
    }

    #[tokio::test]
    async fn search_absent_still_completes() {
        let env = TestEnv::new();
        let store = env.store().await;
        let text = ScriptedText::new(vec![
            Ok(topic_json()),
            Ok(draft_json()),
            Ok(verdict_json(8)),
        ]);
        let mut c = collaborators(text);
        c.search = None;

        let pipeline = Pipeline::new(env.config.clone(), c);
        assert!(pipeline.run_one(&store, None).await.is_ok());
    }

    #[tokio::test]
    async fn drafting_failure_aborts_without_store_writes() {
        let env = TestEnv::new();
        let store = env.store().await;
        // Topic succeeds, draft reply unusable.
        let text = ScriptedText::new(vec![Ok(topic_json()), Ok("nur Prosa".into())]);

        let pipeline = Pipeline::new(env.config.clone(), collaborators(text));
        let err = pipeline.run_one(&store, None).await.unwrap_err();
        assert!(err.to_string().contains("drafting"));

        assert!(store.read_all().await.unwrap().is_empty());
        assert!(store.read_used_topics().await.unwrap().is_empty());
        assert!(!env.root.join("docs/posts").exists());
    }

    #[tokio::test]
    async fn slug_collision_suffixes_second_article() {
        let env = TestEnv::new();
        let store = env.store().await;

        let first = ScriptedText::new(vec![
            Ok(topic_json()),
            Ok(draft_json()),
            Ok(verdict_json(8)),
        ]);
        let pipeline = Pipeline::new(env.config.clone(), collaborators(first));
        pipeline.run_one(&store, None).await.expect("first run");

        let second = ScriptedText::new(vec![
            Ok(topic_json()),
            Ok(draft_json()),
            Ok(verdict_json(8)),
        ]);
        let pipeline = Pipeline::new(env.config.clone(), collaborators(second));
        let record = pipeline.run_one(&store, None).await.expect("second run");

        assert_eq!(record.slug, "ankern-lernen-2");
        assert_eq!(store.read_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn image_chain_failure_falls_back_to_placeholder() {
        let env = TestEnv::new();
        let store = env.store().await;
        let text = ScriptedText::new(vec![
            Ok(topic_json()),
            Ok(draft_json()),
            Ok(verdict_json(8)),
        ]);
        let mut c = collaborators(text);
        c.images = vec![Arc::new(ScriptedImages::new("gemini", vec![]))];

        let pipeline = Pipeline::new(env.config.clone(), c);
        pipeline.run_one(&store, None).await.expect("run");

        let hero = std::fs::read(env.root.join("docs/posts/ankern-lernen/hero.webp")).unwrap();
        assert!(String::from_utf8(hero).unwrap().starts_with("<svg"));
    }

    #[tokio::test]
    async fn forced_topic_reaches_research() {
        let env = TestEnv::new();
        let store = env.store().await;
        let forced_reply = r#"{
  "topic": "Winterhandschuhe",
  "title": "Winterhandschuhe im Test",
  "meta_description": "Die besten Handschuhe.",
  "keywords": [],
  "category": "ausruestung",
  "image_prompt": "gloves"
}"#;
        let text = ScriptedText::new(vec![
            Ok(forced_reply.into()),
            Ok(draft_json()),
            Ok(verdict_json(8)),
        ]);

        let pipeline = Pipeline::new(env.config.clone(), collaborators(text));
        let record = pipeline
            .run_one(&store, Some("Winterhandschuhe"))
            .await
            .expect("run");
        assert_eq!(record.slug, "winterhandschuhe-im-test");
        assert_eq!(record.category.slug(), "ausruestung");
    }
}
