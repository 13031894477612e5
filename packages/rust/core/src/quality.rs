//! Quality gate: bounded evaluate/revise feedback loop.
//!
//! `Evaluate → (Pass | Revise) → Evaluate → … → Pass`, capped at
//! `max_evaluations` evaluation calls. Pending fact-check corrections fold
//! into the first revision only. The gate never fails the run: on any
//! verdict parse failure or adapter error it returns the content it has.

use tracing::{debug, info, instrument, warn};

use postforge_adapters::{PromptSpec, TextGenerator, extract};
use postforge_shared::{AppConfig, QualityVerdict, TopicRecord};

/// Outcome of the gate for one draft.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    /// The content to publish (revised or unchanged).
    pub content: String,
    /// Evaluation calls made (≤ `max_evaluations`).
    pub evaluations: u8,
    /// Revision calls made.
    pub revisions: u8,
    /// Whether the final verdict met the threshold. `false` also covers
    /// an aborted loop (parse/adapter failure).
    pub passed: bool,
}

/// Run the gate over `content`, carrying `corrections` from fact-check.
#[instrument(skip_all, fields(slug = %topic.slug, corrections = corrections.len()))]
pub async fn run_gate(
    text: &dyn TextGenerator,
    config: &AppConfig,
    topic: &TopicRecord,
    content: String,
    corrections: Vec<String>,
) -> GateOutcome {
    let threshold = config.quality.threshold;
    let max_evaluations = config.quality.max_evaluations.max(1);

    let mut content = content;
    let mut pending_corrections = corrections;
    let mut evaluations: u8 = 0;
    let mut revisions: u8 = 0;

    loop {
        evaluations += 1;
        let verdict = match evaluate(text, config, topic, &content).await {
            Some(verdict) => verdict,
            None => {
                // Aborted loop: return the content unchanged from here on.
                warn!(evaluations, "verdict unavailable, gate aborted");
                return GateOutcome {
                    content,
                    evaluations,
                    revisions,
                    passed: false,
                };
            }
        };

        debug!(
            score = verdict.score,
            issues = verdict.issues.len(),
            attempt = evaluations,
            "draft evaluated"
        );

        if verdict.score >= threshold {
            // Passed. Corrections still pending from the first verdict get
            // one unconditional revision without a further score check.
            if !pending_corrections.is_empty() {
                let corrections = std::mem::take(&mut pending_corrections);
                if let Some(revised) =
                    revise(text, config, topic, &content, &[], &[], &corrections).await
                {
                    revisions += 1;
                    content = revised;
                }
            }
            info!(score = verdict.score, evaluations, revisions, "quality gate passed");
            return GateOutcome {
                content,
                evaluations,
                revisions,
                passed: true,
            };
        }

        if evaluations >= max_evaluations {
            warn!(
                score = verdict.score,
                evaluations, "quality below threshold, attempts exhausted"
            );
            return GateOutcome {
                content,
                evaluations,
                revisions,
                passed: false,
            };
        }

        // Revise and re-evaluate. Corrections are cleared after the first
        // revision carries them.
        let corrections = std::mem::take(&mut pending_corrections);
        match revise(
            text,
            config,
            topic,
            &content,
            &verdict.issues,
            &verdict.suggestions,
            &corrections,
        )
        .await
        {
            Some(revised) => {
                revisions += 1;
                content = revised;
            }
            None => {
                warn!("revision unavailable, gate aborted");
                return GateOutcome {
                    content,
                    evaluations,
                    revisions,
                    passed: false,
                };
            }
        }
    }
}

/// One evaluation call. `None` on adapter failure or unparsable verdict.
async fn evaluate(
    text: &dyn TextGenerator,
    config: &AppConfig,
    topic: &TopicRecord,
    content: &str,
) -> Option<QualityVerdict> {
    let spec = PromptSpec {
        model: config.anthropic.topic_model.clone(),
        max_tokens: 1024,
        prompt: evaluate_prompt(topic, content),
    };
    let reply = text.generate(&spec).await.ok()?;
    extract::parse_object::<QualityVerdict>(&reply).into_value()
}

/// One revision call. `None` on adapter failure or unusable reply.
async fn revise(
    text: &dyn TextGenerator,
    config: &AppConfig,
    topic: &TopicRecord,
    content: &str,
    issues: &[String],
    suggestions: &[String],
    corrections: &[String],
) -> Option<String> {
    let spec = PromptSpec {
        model: config.anthropic.draft_model.clone(),
        max_tokens: 4096,
        prompt: revise_prompt(topic, content, issues, suggestions, corrections),
    };
    let reply = text.generate(&spec).await.ok()?;

    match extract::parse_draft(&reply).into_value() {
        Some(draft) if !draft.content.trim().is_empty() => Some(draft.content),
        _ => None,
    }
}

fn evaluate_prompt(topic: &TopicRecord, content: &str) -> String {
    format!(
        "Bewerte diesen Blogartikel fuer \"Segeln Lernen\" (Thema: {topic}).\n\n\
         KRITERIEN:\n\
         - Erfahrung, Expertise, Autoritaet, Vertrauen erkennbar\n\
         - Ton: warm, persoenlich, Du-Ansprache, Kapitaen-Hannes-Stimme\n\
         - Laenge: 1800-2500 Woerter angestrebt\n\
         - Konkrete Tipps statt Allgemeinplaetze\n\n\
         ARTIKEL:\n{content}\n\n\
         Antworte NUR mit JSON:\n\
         {{\n\
         \"score\": 0,\n\
         \"issues\": [\"konkretes Problem\"],\n\
         \"suggestions\": [\"konkreter Verbesserungsvorschlag\"]\n\
         }}",
        topic = topic.topic,
    )
}

fn revise_prompt(
    topic: &TopicRecord,
    content: &str,
    issues: &[String],
    suggestions: &[String],
    corrections: &[String],
) -> String {
    let mut notes = String::new();
    if !issues.is_empty() {
        notes.push_str(&format!("PROBLEME:\n{}\n\n", issues.join("\n")));
    }
    if !suggestions.is_empty() {
        notes.push_str(&format!("VORSCHLAEGE:\n{}\n\n", suggestions.join("\n")));
    }
    if !corrections.is_empty() {
        notes.push_str(&format!(
            "FAKTEN-KORREKTUREN (unbedingt einarbeiten):\n{}\n\n",
            corrections.join("\n")
        ));
    }

    format!(
        "Du bist Kapitaen Hannes. Ueberarbeite diesen Artikel (Thema: {topic}).\n\
         Behalte den warmherzigen Seemann-Ton bei und kuerze nichts Wesentliches.\n\n\
         {notes}\
         AKTUELLER ARTIKEL:\n{content}\n\n\
         Antworte NUR mit einem JSON-Objekt:\n\
         {{\"content\": \"Der ueberarbeitete Artikel als HTML\", \"faq\": [], \"image_alt\": \"\"}}",
        topic = topic.topic,
    )
}
