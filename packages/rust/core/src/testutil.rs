//! Scripted collaborator fakes shared by the stage tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use postforge_adapters::{ImageGenerator, LinkProbe, PromptSpec, SearchProvider, TextGenerator};
use postforge_shared::{PostforgeError, Result};

/// Text generator replaying scripted replies and recording prompts.
pub(crate) struct ScriptedText {
    replies: Mutex<Vec<Result<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedText {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(&self, spec: &PromptSpec) -> Result<String> {
        self.prompts.lock().unwrap().push(spec.prompt.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(PostforgeError::Network("script exhausted".into()));
        }
        replies.remove(0)
    }
}

/// Search provider replaying a single scripted reply.
pub(crate) struct ScriptedSearch {
    reply: Result<String>,
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new(reply: Result<String>) -> Self {
        Self {
            reply,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(PostforgeError::Network(e.to_string())),
        }
    }
}

/// Probe answering from a fixed URL→status table; unknown URLs error.
pub(crate) struct TableProbe {
    statuses: HashMap<String, u16>,
    pub calls: Mutex<Vec<String>>,
}

impl TableProbe {
    pub fn new(statuses: &[(&str, u16)]) -> Self {
        Self {
            statuses: statuses
                .iter()
                .map(|(url, s)| (url.to_string(), *s))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LinkProbe for TableProbe {
    async fn probe(&self, url: &str) -> Result<u16> {
        self.calls.lock().unwrap().push(url.to_string());
        self.statuses
            .get(url)
            .copied()
            .ok_or_else(|| PostforgeError::Network(format!("{url}: no route")))
    }
}

/// Image generator with a fixed outcome per call.
pub(crate) struct ScriptedImages {
    name: &'static str,
    outcomes: Mutex<Vec<Result<Option<Vec<u8>>>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedImages {
    pub fn new(name: &'static str, outcomes: Vec<Result<Option<Vec<u8>>>>) -> Self {
        Self {
            name,
            outcomes: Mutex::new(outcomes),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageGenerator for ScriptedImages {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn generate(&self, prompt: &str) -> Result<Option<Vec<u8>>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            return Err(PostforgeError::Network("script exhausted".into()));
        }
        outcomes.remove(0)
    }
}
