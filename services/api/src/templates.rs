//! Prompt templates read from the prompts directory.
//!
//! Parsed files are cached for a few minutes so edits to the markdown are
//! picked up without a restart.

use anyhow::Context;
use async_trait::async_trait;
use lango_core::prompt::{PromptTemplates, TemplateSource};
use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::debug;

pub const TEMPLATE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

type Sections = HashMap<String, String>;

pub struct FileTemplateSource {
    dir: PathBuf,
    ttl: Duration,
    cache: RwLock<HashMap<String, (Instant, Sections)>>,
}

impl FileTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_ttl(dir, TEMPLATE_CACHE_TTL)
    }

    pub fn with_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn cached(&self, name: &str) -> Option<Sections> {
        let cache = self.cache.read().await;
        cache
            .get(name)
            .filter(|(loaded_at, _)| loaded_at.elapsed() < self.ttl)
            .map(|(_, sections)| sections.clone())
    }
}

#[async_trait]
impl TemplateSource for FileTemplateSource {
    async fn load(&self, name: &str) -> anyhow::Result<Sections> {
        if let Some(sections) = self.cached(name).await {
            return Ok(sections);
        }

        let path = self.dir.join(name);
        let markdown = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Could not read prompt template {}", path.display()))?;
        let sections = PromptTemplates::parse_sections(&markdown);
        debug!(template = %name, sections = sections.len(), "Prompt template loaded");

        self.cache
            .write()
            .await
            .insert(name.to_string(), (Instant::now(), sections.clone()));
        Ok(sections)
    }
}
