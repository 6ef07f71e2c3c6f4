use crate::core::data::{Page, Role, Workflow, WorkflowStatus, WorkflowStep};
use crate::core::operations::{Repository, Storage};
use crate::manager::validation::{
    DESCRIPTION_MAX, TITLE_MAX, TITLE_MIN, explicit_slug, optional_text, required_text,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::slug::{is_canonical_slug, slugify, unique_slug};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

const MAX_STEPS: usize = 50;

/// Drop repeated roles, keeping first-seen order
fn distinct_audience(audience: Vec<Role>) -> Vec<Role> {
    let mut seen = HashSet::new();
    audience.into_iter().filter(|role| seen.insert(*role)).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub audience: Option<Vec<Role>>,
    pub summary: Option<String>,
    pub steps: Option<Vec<WorkflowStep>>,
    pub status: Option<WorkflowStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub audience: Option<Vec<Role>>,
    pub summary: Option<String>,
    pub steps: Option<Vec<WorkflowStep>>,
    pub status: Option<WorkflowStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFilter {
    pub category: Option<String>,
    pub status: Option<WorkflowStatus>,
    pub audience: Option<Role>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Categories become URL segments (`/workflows/{category}/{slug}`)
fn validate_category(category: Option<&str>) -> AppResult<String> {
    let category = category.map(str::trim).unwrap_or_default();
    if category.is_empty() {
        return Err(AppError::Validation("Category is required".to_string()));
    }
    if !is_canonical_slug(category) {
        return Err(AppError::Validation(format!(
            "Category '{}' must be a lowercase hyphenated identifier",
            category
        )));
    }
    Ok(category.to_string())
}

fn validate_steps(steps: Vec<WorkflowStep>) -> AppResult<Vec<WorkflowStep>> {
    if steps.is_empty() {
        return Err(AppError::Validation("At least one step is required".to_string()));
    }
    if steps.len() > MAX_STEPS {
        return Err(AppError::Validation(format!("At most {} steps are allowed", MAX_STEPS)));
    }
    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| {
            let title = required_text(&format!("Step {} title", i + 1), Some(&step.title), 1, TITLE_MAX)?;
            Ok(WorkflowStep { title, body: step.body.trim().to_string() })
        })
        .collect()
}

#[derive(Clone)]
pub struct WorkflowService {
    workflows: Repository<Workflow>,
}

impl WorkflowService {
    pub fn new(storage: &Storage) -> Self {
        Self { workflows: storage.repo() }
    }

    pub async fn create(&self, input: NewWorkflow) -> AppResult<Workflow> {
        let title = required_text("Title", input.title.as_deref(), TITLE_MIN, TITLE_MAX)?;
        let category = validate_category(input.category.as_deref())?;
        let summary = optional_text("Summary", input.summary.as_deref(), DESCRIPTION_MAX)?;
        let steps = validate_steps(input.steps.unwrap_or_default())?;

        let slug = match input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(slug) => explicit_slug(slug)?,
            None => {
                let existing: Vec<String> =
                    self.workflows.list().await?.into_iter().map(|w| w.slug).collect();
                unique_slug(&slugify(&title), |s| existing.iter().any(|e| e == s))
            }
        };

        let audience = distinct_audience(input.audience.unwrap_or_default());

        let now = Utc::now();
        let workflow = Workflow {
            id: Uuid::new_v4().to_string(),
            slug,
            title,
            category,
            audience,
            summary,
            steps,
            status: input.status.unwrap_or(WorkflowStatus::Draft),
            revision: 1,
            created_at: now,
            updated_at: now,
        };

        let workflow = self.workflows.insert(workflow).await?;
        tracing::info!(id = %workflow.id, slug = %workflow.slug, "workflow created");
        Ok(workflow)
    }

    pub async fn update(&self, patch: WorkflowPatch) -> AppResult<Workflow> {
        let id = patch
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("Workflow id is required".to_string()))?
            .to_string();

        let title = patch
            .title
            .as_deref()
            .map(|t| required_text("Title", Some(t), TITLE_MIN, TITLE_MAX))
            .transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|c| validate_category(Some(c)))
            .transpose()?;
        let summary = patch
            .summary
            .as_deref()
            .map(|s| optional_text("Summary", Some(s), DESCRIPTION_MAX))
            .transpose()?;
        let steps = patch.steps.map(validate_steps).transpose()?;
        let slug = patch.slug.as_deref().map(explicit_slug).transpose()?;

        let workflow = self
            .workflows
            .update(&id, move |workflow| {
                if let Some(title) = title {
                    workflow.title = title;
                }
                if let Some(slug) = slug {
                    workflow.slug = slug;
                }
                if let Some(category) = category {
                    workflow.category = category;
                }
                if let Some(summary) = summary {
                    workflow.summary = summary;
                }
                if let Some(steps) = steps {
                    workflow.steps = steps;
                }
                if let Some(audience) = patch.audience {
                    workflow.audience = distinct_audience(audience);
                }
                if let Some(status) = patch.status {
                    workflow.status = status;
                }
                workflow.revision += 1;
                workflow.updated_at = Utc::now();
                Ok(())
            })
            .await?;

        tracing::info!(id = %workflow.id, revision = workflow.revision, "workflow updated");
        Ok(workflow)
    }

    pub async fn delete(&self, id: &str) -> AppResult<Workflow> {
        let workflow = self.workflows.delete(id).await?;
        tracing::info!(id = %workflow.id, slug = %workflow.slug, "workflow deleted");
        Ok(workflow)
    }

    pub async fn get(&self, key: &str) -> AppResult<Workflow> {
        self.workflows
            .find_by_id_or_slug(key)
            .await?
            .ok_or_else(|| AppError::not_found("Workflow", key))
    }

    /// Published workflow by slug; drafts read as missing
    pub async fn get_published(&self, slug: &str) -> AppResult<Workflow> {
        self.workflows
            .find_by_slug(slug)
            .await?
            .filter(|w| w.status == WorkflowStatus::Published)
            .ok_or_else(|| AppError::not_found("Workflow", slug))
    }

    /// Newest first. With `public_only` the status filter is forced to published.
    pub async fn list(&self, filter: &WorkflowFilter, public_only: bool) -> AppResult<Page<Workflow>> {
        let workflows = self.matching(filter, public_only).await?;
        Ok(Page::paginate(workflows, filter.page, filter.limit))
    }

    /// Every workflow `list` would return, without paging
    pub async fn matching(&self, filter: &WorkflowFilter, public_only: bool) -> AppResult<Vec<Workflow>> {
        let status = if public_only { Some(WorkflowStatus::Published) } else { filter.status };

        let mut workflows: Vec<Workflow> = self
            .workflows
            .list()
            .await?
            .into_iter()
            .filter(|w| status.is_none_or(|s| w.status == s))
            .filter(|w| filter.category.as_deref().is_none_or(|c| w.category == c))
            .filter(|w| filter.audience.is_none_or(|r| w.audience.contains(&r)))
            .collect();
        workflows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(workflows)
    }
}
