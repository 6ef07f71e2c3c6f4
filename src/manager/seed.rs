use crate::core::data::{AiModel, AiTool, Pattern, Prompt, Workflow};
use crate::core::operations::Storage;
use crate::manager::patterns::PATTERN_REFERENCES;
use crate::utils::error::{AppError, AppResult};
use crate::utils::slug::is_canonical_slug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Import file layout: every section is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBundle {
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default)]
    pub ai_models: Vec<AiModel>,
    #[serde(default)]
    pub ai_tools: Vec<AiTool>,
}

/// (inserted, replaced) per collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub prompts: (usize, usize),
    pub patterns: (usize, usize),
    pub workflows: (usize, usize),
    pub ai_models: (usize, usize),
    pub ai_tools: (usize, usize),
}

impl SeedBundle {
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("Failed to read seed file {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Validation(format!("Invalid seed file {}: {}", path.display(), e)))
    }

    /// Reject bundles that would produce unreachable URLs or dangling pattern references.
    /// Patterns are resolved against the bundle only.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_with(&[])
    }

    /// Like `validate`, but patterns already in storage also resolve
    pub async fn validate_against(&self, storage: &Storage) -> AppResult<()> {
        let stored: Vec<String> = storage
            .repo::<Pattern>()
            .list()
            .await?
            .into_iter()
            .map(|p| p.slug)
            .collect();
        self.validate_with(&stored)
    }

    fn validate_with(&self, stored_patterns: &[String]) -> AppResult<()> {
        let slugs = self
            .prompts
            .iter()
            .map(|p| &p.slug)
            .chain(self.patterns.iter().map(|p| &p.slug))
            .chain(self.workflows.iter().map(|w| &w.slug));
        for slug in slugs {
            if !is_canonical_slug(slug) {
                return Err(AppError::Validation(format!("Seed contains invalid slug '{}'", slug)));
            }
        }

        for prompt in &self.prompts {
            if let Some(pattern) = &prompt.pattern
                && !self.patterns.iter().any(|p| &p.slug == pattern)
                && !stored_patterns.contains(pattern)
            {
                return Err(AppError::Validation(format!(
                    "Prompt '{}' references unknown pattern '{}'",
                    prompt.slug, pattern
                )));
            }
        }
        Ok(())
    }

    /// Upsert every section by ID; patterns go first so prompt references resolve
    pub async fn apply(self, storage: &Storage) -> AppResult<SeedReport> {
        let _references = storage.relation_lock(PATTERN_REFERENCES).lock_owned().await;
        self.validate_against(storage).await?;

        let report = SeedReport {
            patterns: storage.repo::<Pattern>().upsert_many(self.patterns).await?,
            prompts: storage.repo::<Prompt>().upsert_many(self.prompts).await?,
            workflows: storage.repo::<Workflow>().upsert_many(self.workflows).await?,
            ai_models: storage.repo::<AiModel>().upsert_many(self.ai_models).await?,
            ai_tools: storage.repo::<AiTool>().upsert_many(self.ai_tools).await?,
        };

        tracing::info!(?report, "seed applied");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::fixtures::{pattern, prompt};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let storage = Storage::new(Arc::new(MemoryStore::default()));
        let mut linked = prompt("act-as-reviewer", "Act as reviewer");
        linked.pattern = Some("persona".into());
        let bundle = SeedBundle {
            prompts: vec![linked],
            patterns: vec![pattern("persona")],
            ..Default::default()
        };

        let first = bundle.clone().apply(&storage).await.unwrap();
        assert_eq!(first.prompts, (1, 0));
        assert_eq!(first.patterns, (1, 0));

        let second = bundle.apply(&storage).await.unwrap();
        assert_eq!(second.prompts, (0, 1));
        assert_eq!(storage.repo::<Prompt>().count().await.unwrap(), 1);
    }

    #[test]
    fn test_validate_rejects_dangling_pattern() {
        let mut linked = prompt("act-as-reviewer", "Act as reviewer");
        linked.pattern = Some("persona".into());
        let bundle = SeedBundle { prompts: vec![linked], ..Default::default() };
        assert!(matches!(bundle.validate(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_apply_resolves_patterns_already_stored() {
        let storage = Storage::new(Arc::new(MemoryStore::default()));
        storage.repo::<Pattern>().insert(pattern("persona")).await.unwrap();

        let mut linked = prompt("act-as-reviewer", "Act as reviewer");
        linked.pattern = Some("persona".into());
        let bundle = SeedBundle { prompts: vec![linked], ..Default::default() };

        assert!(bundle.validate().is_err());
        bundle.validate_against(&storage).await.unwrap();
        let report = bundle.apply(&storage).await.unwrap();
        assert_eq!(report.prompts, (1, 0));

        let mut dangling = prompt("explain-code", "Explain code");
        dangling.pattern = Some("chain-of-thought".into());
        let bundle = SeedBundle { prompts: vec![dangling], ..Default::default() };
        assert!(matches!(bundle.apply(&storage).await, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_bad_slug() {
        let bundle = SeedBundle { prompts: vec![prompt("Bad Slug", "Bad")], ..Default::default() };
        assert!(bundle.validate().is_err());
    }

    #[test]
    fn test_from_file_accepts_partial_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{ "aiTools": [] }"#).unwrap();
        let bundle = SeedBundle::from_file(&path).unwrap();
        assert!(bundle.prompts.is_empty());
    }
}
