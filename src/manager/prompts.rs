use crate::core::data::{
    Page, Pattern, Prompt, PromptCategory, PromptCollection, PromptFilter, PromptStats, Role,
};
use crate::core::operations::{Repository, Storage};
use crate::manager::Actor;
use crate::manager::patterns::PATTERN_REFERENCES;
use crate::manager::validation::{
    CONTENT_MAX, DESCRIPTION_MAX, TITLE_MAX, TITLE_MIN, explicit_slug, normalize_tags,
    optional_text, required_text,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::slug::{slugify, unique_slug};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Body of `POST /api/admin/prompts`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrompt {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<PromptCategory>,
    pub role: Option<Role>,
    pub pattern: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Body of `PUT /api/admin/prompts`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<PromptCategory>,
    pub role: Option<Role>,
    pub pattern: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Clone)]
pub struct PromptService {
    prompts: Repository<Prompt>,
    patterns: Repository<Pattern>,
    references: Arc<Mutex<()>>,
}

impl PromptService {
    pub fn new(storage: &Storage) -> Self {
        Self {
            prompts: storage.repo(),
            patterns: storage.repo(),
            references: storage.relation_lock(PATTERN_REFERENCES),
        }
    }

    async fn ensure_pattern_exists(&self, pattern: &str) -> AppResult<()> {
        if self.patterns.find_by_slug(pattern).await?.is_none() {
            return Err(AppError::Validation(format!("Unknown pattern '{}'", pattern)));
        }
        Ok(())
    }

    pub async fn create(&self, input: NewPrompt, actor: Option<&Actor>) -> AppResult<Prompt> {
        let title = required_text("Title", input.title.as_deref(), TITLE_MIN, TITLE_MAX)?;
        let content = required_text("Content", input.content.as_deref(), 1, CONTENT_MAX)?;
        let description = optional_text("Description", input.description.as_deref(), DESCRIPTION_MAX)?;
        let category = input
            .category
            .ok_or_else(|| AppError::Validation("Category is required".to_string()))?;
        let tags = normalize_tags(input.tags.unwrap_or_default())?;

        let pattern = input.pattern.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        // Held until the insert lands so the pattern cannot vanish in between
        let _references = self.references.lock().await;
        if let Some(pattern) = &pattern {
            self.ensure_pattern_exists(pattern).await?;
        }

        let slug = match input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(slug) => explicit_slug(slug)?,
            None => {
                let existing: Vec<String> =
                    self.prompts.list().await?.into_iter().map(|p| p.slug).collect();
                unique_slug(&slugify(&title), |s| existing.iter().any(|e| e == s))
            }
        };

        let now = Utc::now();
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            slug,
            title,
            description,
            content,
            category,
            role: input.role,
            pattern,
            tags,
            is_public: input.is_public.unwrap_or(true),
            is_featured: input.is_featured.unwrap_or(false),
            image_url: None,
            revision: 1,
            created_by: actor.map(|a| a.email.clone()),
            updated_by: actor.map(|a| a.email.clone()),
            created_at: now,
            updated_at: now,
        };

        let prompt = self.prompts.insert(prompt).await?;
        tracing::info!(id = %prompt.id, slug = %prompt.slug, "prompt created");
        Ok(prompt)
    }

    /// Apply a partial update and bump the revision counter
    pub async fn update(&self, patch: PromptPatch, actor: Option<&Actor>) -> AppResult<Prompt> {
        let id = patch
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("Prompt id is required".to_string()))?
            .to_string();

        // Validate everything that does not need the stored document up front
        let title = patch
            .title
            .as_deref()
            .map(|t| required_text("Title", Some(t), TITLE_MIN, TITLE_MAX))
            .transpose()?;
        let content = patch
            .content
            .as_deref()
            .map(|c| required_text("Content", Some(c), 1, CONTENT_MAX))
            .transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(|d| optional_text("Description", Some(d), DESCRIPTION_MAX))
            .transpose()?;
        let slug = patch.slug.as_deref().map(explicit_slug).transpose()?;
        let tags = patch.tags.map(normalize_tags).transpose()?;
        let pattern = patch.pattern.map(|p| p.trim().to_string());
        let _references = self.references.lock().await;
        if let Some(pattern) = pattern.as_deref().filter(|p| !p.is_empty()) {
            self.ensure_pattern_exists(pattern).await?;
        }

        let editor = actor.map(|a| a.email.clone());
        let prompt = self
            .prompts
            .update(&id, move |prompt| {
                if let Some(title) = title {
                    prompt.title = title;
                }
                if let Some(content) = content {
                    prompt.content = content;
                }
                if let Some(description) = description {
                    prompt.description = description;
                }
                if let Some(slug) = slug {
                    prompt.slug = slug;
                }
                if let Some(tags) = tags {
                    prompt.tags = tags;
                }
                if let Some(pattern) = pattern {
                    // An empty string detaches the pattern
                    prompt.pattern = Some(pattern).filter(|p| !p.is_empty());
                }
                if let Some(category) = patch.category {
                    prompt.category = category;
                }
                if let Some(role) = patch.role {
                    prompt.role = Some(role);
                }
                if let Some(is_public) = patch.is_public {
                    prompt.is_public = is_public;
                }
                if let Some(is_featured) = patch.is_featured {
                    prompt.is_featured = is_featured;
                }
                prompt.revision += 1;
                prompt.updated_at = Utc::now();
                if editor.is_some() {
                    prompt.updated_by = editor;
                }
                Ok(())
            })
            .await?;

        tracing::info!(id = %prompt.id, revision = prompt.revision, "prompt updated");
        Ok(prompt)
    }

    pub async fn delete(&self, id: &str) -> AppResult<Prompt> {
        let prompt = self.prompts.delete(id).await?;
        tracing::info!(id = %prompt.id, slug = %prompt.slug, "prompt deleted");
        Ok(prompt)
    }

    /// Find by ID or slug regardless of visibility
    pub async fn get(&self, key: &str) -> AppResult<Prompt> {
        self.prompts
            .find_by_id_or_slug(key)
            .await?
            .ok_or_else(|| AppError::not_found("Prompt", key))
    }

    /// Find a public prompt by slug; private prompts read as missing
    pub async fn get_public(&self, slug: &str) -> AppResult<Prompt> {
        self.prompts
            .find_by_slug(slug)
            .await?
            .filter(|p| p.is_public)
            .ok_or_else(|| AppError::not_found("Prompt", slug))
    }

    pub async fn find_by_id_or_slug(&self, key: &str) -> AppResult<Option<Prompt>> {
        self.prompts.find_by_id_or_slug(key).await
    }

    pub async fn search(&self, filter: &PromptFilter, public_only: bool) -> AppResult<Page<Prompt>> {
        let collection = PromptCollection::new(self.prompts.list().await?);
        let results = collection.search(filter, public_only);
        Ok(Page::paginate(results, filter.page, filter.limit))
    }

    pub async fn list_all(&self) -> AppResult<Vec<Prompt>> {
        self.prompts.list().await
    }

    pub async fn tags(&self, public_only: bool) -> AppResult<Vec<String>> {
        let prompts = if public_only {
            self.prompts.list_listed().await?
        } else {
            self.prompts.list().await?
        };
        Ok(PromptCollection::new(prompts).get_all_tags())
    }

    pub async fn categories(&self) -> AppResult<Vec<PromptCategory>> {
        Ok(PromptCollection::new(self.prompts.list().await?).get_categories())
    }

    pub async fn stats(&self) -> AppResult<PromptStats> {
        Ok(PromptCollection::new(self.prompts.list().await?).get_stats())
    }

    /// Record a generated illustration; does not count as a content revision
    pub async fn set_image(&self, id: &str, image_url: String) -> AppResult<Prompt> {
        self.prompts
            .update(id, move |prompt| {
                prompt.image_url = Some(image_url);
                prompt.updated_at = Utc::now();
                Ok(())
            })
            .await
    }
}
