use crate::core::data::{Level, Pattern, PatternCategory, Prompt};
use crate::core::operations::{Repository, Storage};
use crate::manager::validation::{
    DESCRIPTION_MAX, TITLE_MAX, explicit_slug, optional_text, required_text,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::slug::{slugify, unique_slug};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Relation lock held while prompts' pattern references are checked and written
pub const PATTERN_REFERENCES: &str = "patterns-prompts";

const EXAMPLE_MAX: usize = 5_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPattern {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<PatternCategory>,
    pub level: Option<Level>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub use_cases: Option<Vec<String>>,
    pub related_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<PatternCategory>,
    pub level: Option<Level>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub use_cases: Option<Vec<String>>,
    pub related_patterns: Option<Vec<String>>,
}

/// Trimmed, non-empty entries; the first occurrence of a duplicate wins
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty() && seen.insert(i.clone()))
        .collect()
}

#[derive(Clone)]
pub struct PatternService {
    patterns: Repository<Pattern>,
    prompts: Repository<Prompt>,
    references: Arc<Mutex<()>>,
}

impl PatternService {
    pub fn new(storage: &Storage) -> Self {
        Self {
            patterns: storage.repo(),
            prompts: storage.repo(),
            references: storage.relation_lock(PATTERN_REFERENCES),
        }
    }

    pub async fn create(&self, input: NewPattern) -> AppResult<Pattern> {
        let name = required_text("Name", input.name.as_deref(), 2, TITLE_MAX)?;
        let description = optional_text("Description", input.description.as_deref(), DESCRIPTION_MAX)?;
        let example = optional_text("Example", input.example.as_deref(), EXAMPLE_MAX)?;

        let slug = match input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(slug) => explicit_slug(slug)?,
            None => {
                let existing: Vec<String> =
                    self.patterns.list().await?.into_iter().map(|p| p.slug).collect();
                unique_slug(&slugify(&name), |s| existing.iter().any(|e| e == s))
            }
        };

        let now = Utc::now();
        let pattern = Pattern {
            id: Uuid::new_v4().to_string(),
            slug,
            name,
            category: input.category.unwrap_or(PatternCategory::Foundational),
            level: input.level.unwrap_or(Level::Beginner),
            description,
            example: Some(example).filter(|e| !e.is_empty()),
            use_cases: clean_list(input.use_cases.unwrap_or_default()),
            related_patterns: clean_list(input.related_patterns.unwrap_or_default()),
            revision: 1,
            created_at: now,
            updated_at: now,
        };

        let pattern = self.patterns.insert(pattern).await?;
        tracing::info!(id = %pattern.id, slug = %pattern.slug, "pattern created");
        Ok(pattern)
    }

    pub async fn update(&self, patch: PatternPatch) -> AppResult<Pattern> {
        let id = patch
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("Pattern id is required".to_string()))?
            .to_string();

        let name = patch
            .name
            .as_deref()
            .map(|n| required_text("Name", Some(n), 2, TITLE_MAX))
            .transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(|d| optional_text("Description", Some(d), DESCRIPTION_MAX))
            .transpose()?;
        let example = patch
            .example
            .as_deref()
            .map(|e| optional_text("Example", Some(e), EXAMPLE_MAX))
            .transpose()?;
        let slug = patch.slug.as_deref().map(explicit_slug).transpose()?;

        // Prompts point at patterns by slug, so a rename must not strand them
        let _references = self.references.lock().await;
        if let Some(new_slug) = &slug {
            let current = self
                .patterns
                .find_by_id(&id)
                .await?
                .ok_or_else(|| AppError::not_found("Pattern", &id))?;
            if &current.slug != new_slug && self.referencing_prompts(&current.slug).await? > 0 {
                return Err(AppError::Conflict(format!(
                    "Pattern '{}' is referenced by prompts and cannot change slug",
                    current.slug
                )));
            }
        }

        let pattern = self
            .patterns
            .update(&id, move |pattern| {
                if let Some(name) = name {
                    pattern.name = name;
                }
                if let Some(slug) = slug {
                    pattern.slug = slug;
                }
                if let Some(description) = description {
                    pattern.description = description;
                }
                if let Some(example) = example {
                    pattern.example = Some(example).filter(|e| !e.is_empty());
                }
                if let Some(category) = patch.category {
                    pattern.category = category;
                }
                if let Some(level) = patch.level {
                    pattern.level = level;
                }
                if let Some(use_cases) = patch.use_cases {
                    pattern.use_cases = clean_list(use_cases);
                }
                if let Some(related) = patch.related_patterns {
                    pattern.related_patterns = clean_list(related);
                }
                pattern.revision += 1;
                pattern.updated_at = Utc::now();
                Ok(())
            })
            .await?;

        tracing::info!(id = %pattern.id, revision = pattern.revision, "pattern updated");
        Ok(pattern)
    }

    async fn referencing_prompts(&self, slug: &str) -> AppResult<usize> {
        Ok(self
            .prompts
            .list()
            .await?
            .iter()
            .filter(|p| p.pattern.as_deref() == Some(slug))
            .count())
    }

    /// Delete a pattern that no prompt still references
    pub async fn delete(&self, id: &str) -> AppResult<Pattern> {
        let _references = self.references.lock().await;
        let pattern = self
            .patterns
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Pattern", id))?;

        let references = self.referencing_prompts(&pattern.slug).await?;
        if references > 0 {
            return Err(AppError::Conflict(format!(
                "Pattern '{}' is used by {} prompt(s)",
                pattern.slug, references
            )));
        }

        let pattern = self.patterns.delete(id).await?;
        tracing::info!(id = %pattern.id, slug = %pattern.slug, "pattern deleted");
        Ok(pattern)
    }

    pub async fn get(&self, key: &str) -> AppResult<Pattern> {
        self.patterns
            .find_by_id_or_slug(key)
            .await?
            .ok_or_else(|| AppError::not_found("Pattern", key))
    }

    pub async fn find(&self, key: &str) -> AppResult<Option<Pattern>> {
        self.patterns.find_by_id_or_slug(key).await
    }

    /// All patterns ordered by level, then name
    pub async fn list(&self, category: Option<PatternCategory>) -> AppResult<Vec<Pattern>> {
        let mut patterns: Vec<Pattern> = self
            .patterns
            .list()
            .await?
            .into_iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .collect();
        patterns.sort_by(|a, b| {
            level_rank(a.level)
                .cmp(&level_rank(b.level))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(patterns)
    }
}

fn level_rank(level: Level) -> u8 {
    match level {
        Level::Beginner => 0,
        Level::Intermediate => 1,
        Level::Advanced => 2,
    }
}
