//! Core data structures for the content catalog
//!
//! Every persisted document is a flat record with a stable `id` and a URL
//! `slug`. Wire and storage format is camelCase JSON.

use crate::core::traits::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

fn default_true() -> bool {
    true
}

fn first_revision() -> u32 {
    1
}

macro_rules! kebab_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

kebab_enum!(
    /// Library section a prompt is filed under
    PromptCategory {
        CodeGeneration => "code-generation",
        Debugging => "debugging",
        Documentation => "documentation",
        Testing => "testing",
        Refactoring => "refactoring",
        Architecture => "architecture",
        Learning => "learning",
        General => "general",
    }
);

kebab_enum!(
    /// Audience a prompt or workflow is written for
    Role {
        Engineer => "engineer",
        EngineeringManager => "engineering-manager",
        ProductManager => "product-manager",
        ProductOwner => "product-owner",
        Designer => "designer",
        Qa => "qa",
        Architect => "architect",
        DevopsSre => "devops-sre",
        ScrumMaster => "scrum-master",
        CLevel => "c-level",
    }
);

kebab_enum!(
    PatternCategory {
        Foundational => "foundational",
        Structural => "structural",
        Cognitive => "cognitive",
        Iterative => "iterative",
    }
);

kebab_enum!(
    Level {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
);

kebab_enum!(
    WorkflowStatus {
        Draft => "draft",
        Published => "published",
    }
);

kebab_enum!(
    /// Lifecycle of a catalog listing (AI models and tools)
    ListingStatus {
        Active => "active",
        Deprecated => "deprecated",
        Sunset => "sunset",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Recent,
    Title,
    Updated,
}

/// A stored prompt template plus library metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    pub category: PromptCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Slug of the pattern this prompt demonstrates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "first_revision")]
    pub revision: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named prompt-engineering technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: PatternCategory,
    pub level: Level,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub related_patterns: Vec<String>,
    #[serde(default = "first_revision")]
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// A published guide or playbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub audience: Vec<Role>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    pub status: WorkflowStatus,
    #[serde(default = "first_revision")]
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub provider: String,
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTool {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub status: ListingStatus,
    pub updated_at: DateTime<Utc>,
}

/// Server-side half of an admin session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl Document for Prompt {
    const COLLECTION: &'static str = "prompts";
    const LABEL: &'static str = "Prompt";

    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_listed(&self) -> bool {
        self.is_public
    }
}

impl Document for Pattern {
    const COLLECTION: &'static str = "patterns";
    const LABEL: &'static str = "Pattern";

    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Document for Workflow {
    const COLLECTION: &'static str = "workflows";
    const LABEL: &'static str = "Workflow";

    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_listed(&self) -> bool {
        self.status == WorkflowStatus::Published
    }
}

impl Document for AiModel {
    const COLLECTION: &'static str = "ai_models";
    const LABEL: &'static str = "AI model";

    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_listed(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

impl Document for AiTool {
    const COLLECTION: &'static str = "ai_tools";
    const LABEL: &'static str = "AI tool";

    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_listed(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

impl Document for Session {
    const COLLECTION: &'static str = "sessions";
    const LABEL: &'static str = "Session";

    fn id(&self) -> &str {
        &self.token
    }

    fn slug(&self) -> &str {
        &self.token
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_listed(&self) -> bool {
        false
    }
}

/// Filters accepted by prompt searches
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFilter {
    pub q: Option<String>,
    pub category: Option<PromptCategory>,
    pub role: Option<Role>,
    pub pattern: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub sort: SortBy,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

impl<T> Page<T> {
    /// Slice `items` by 1-based page number, clamping the page size to `MAX_PAGE_SIZE`
    pub fn paginate(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = page.unwrap_or(1).max(1);
        let total = items.len();
        let items = items
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();
        Self { items, total, page, limit }
    }
}

/// Statistics about the prompt collection
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStats {
    pub total_prompts: usize,
    pub public_prompts: usize,
    pub total_tags: usize,
    pub total_categories: usize,
    pub tag_counts: HashMap<String, usize>,
    pub category_counts: HashMap<String, usize>,
}

/// Collection of prompts with in-memory query helpers
#[derive(Debug, Clone, Default)]
pub struct PromptCollection {
    pub prompts: Vec<Prompt>,
}

impl PromptCollection {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    /// Search prompts with free-text and exact-match filters, sorted per `filter.sort`
    pub fn search(&self, filter: &PromptFilter, public_only: bool) -> Vec<Prompt> {
        let mut prompts: Vec<Prompt> = self
            .prompts
            .iter()
            .filter(|p| !public_only || p.is_public)
            .cloned()
            .collect();

        // Free-text query
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = q.to_lowercase();
            prompts.retain(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            });
        }

        if let Some(category) = filter.category {
            prompts.retain(|p| p.category == category);
        }

        if let Some(role) = filter.role {
            prompts.retain(|p| p.role == Some(role));
        }

        if let Some(pattern) = &filter.pattern {
            prompts.retain(|p| p.pattern.as_deref() == Some(pattern.as_str()));
        }

        if let Some(tag) = &filter.tag {
            prompts.retain(|p| p.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)));
        }

        match filter.sort {
            SortBy::Recent => prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Title => prompts.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            SortBy::Updated => prompts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }

        prompts
    }

    /// Get all unique tags from the collection
    pub fn get_all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .prompts
            .iter()
            .flat_map(|p| p.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    /// Get all categories in use
    pub fn get_categories(&self) -> Vec<PromptCategory> {
        let mut categories: Vec<PromptCategory> = self.prompts.iter().map(|p| p.category).collect();
        categories.sort_by_key(|c| c.as_str());
        categories.dedup();
        categories
    }

    /// Calculate statistics for the collection
    pub fn get_stats(&self) -> PromptStats {
        let mut tag_counts = HashMap::new();
        let mut category_counts = HashMap::new();

        for prompt in &self.prompts {
            for tag in &prompt.tags {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
            *category_counts.entry(prompt.category.to_string()).or_insert(0) += 1;
        }

        PromptStats {
            total_prompts: self.prompts.len(),
            public_prompts: self.prompts.iter().filter(|p| p.is_public).count(),
            total_tags: tag_counts.len(),
            total_categories: category_counts.len(),
            tag_counts,
            category_counts,
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title, self.category)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn prompt(slug: &str, title: &str) -> Prompt {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Prompt {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            title: title.to_string(),
            description: String::new(),
            content: format!("Content for {}", title),
            category: PromptCategory::General,
            role: None,
            pattern: None,
            tags: Vec::new(),
            is_public: true,
            is_featured: false,
            image_url: None,
            revision: 1,
            created_by: None,
            updated_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn pattern(slug: &str) -> Pattern {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Pattern {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            name: slug.replace('-', " "),
            category: PatternCategory::Foundational,
            level: Level::Beginner,
            description: String::new(),
            example: None,
            use_cases: Vec::new(),
            related_patterns: Vec::new(),
            revision: 1,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn workflow(slug: &str, status: WorkflowStatus) -> Workflow {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Workflow {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            category: "code-quality".to_string(),
            audience: vec![Role::Engineer],
            summary: String::new(),
            steps: vec![WorkflowStep { title: "Start".to_string(), body: String::new() }],
            status,
            revision: 1,
            created_at: at,
            updated_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::prompt;
    use super::*;
    use chrono::Duration;

    fn sample() -> PromptCollection {
        let mut a = prompt("debug-stack-trace", "Debug a stack trace");
        a.category = PromptCategory::Debugging;
        a.tags = vec!["rust".into(), "errors".into()];
        a.role = Some(Role::Engineer);

        let mut b = prompt("write-unit-tests", "Write unit tests");
        b.category = PromptCategory::Testing;
        b.tags = vec!["Rust".into()];
        b.created_at += Duration::days(1);
        b.pattern = Some("few-shot".into());

        let mut c = prompt("internal-draft", "Architecture draft");
        c.is_public = false;
        c.created_at += Duration::days(2);

        PromptCollection::new(vec![a, b, c])
    }

    #[test]
    fn test_search_public_only_sorted_by_recency() {
        let results = sample().search(&PromptFilter::default(), true);
        let slugs: Vec<_> = results.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["write-unit-tests", "debug-stack-trace"]);
    }

    #[test]
    fn test_search_query_matches_tags_case_insensitive() {
        let filter = PromptFilter { q: Some("RUST".into()), ..Default::default() };
        assert_eq!(sample().search(&filter, false).len(), 2);
    }

    #[test]
    fn test_search_exact_filters() {
        let filter = PromptFilter {
            category: Some(PromptCategory::Testing),
            pattern: Some("few-shot".into()),
            ..Default::default()
        };
        let results = sample().search(&filter, true);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].slug, "write-unit-tests");

        let by_role = PromptFilter { role: Some(Role::Engineer), ..Default::default() };
        assert_eq!(sample().search(&by_role, true)[0].slug, "debug-stack-trace");
    }

    #[test]
    fn test_sort_by_title() {
        let filter = PromptFilter { sort: SortBy::Title, ..Default::default() };
        let results = sample().search(&filter, false);
        assert_eq!(results[0].title, "Architecture draft");
    }

    #[test]
    fn test_stats() {
        let stats = sample().get_stats();
        assert_eq!(stats.total_prompts, 3);
        assert_eq!(stats.public_prompts, 2);
        assert_eq!(stats.category_counts.get("general"), Some(&1));
        assert_eq!(stats.tag_counts.get("rust"), Some(&1));
    }

    #[test]
    fn test_paginate() {
        let page = Page::paginate((1..=45).collect::<Vec<_>>(), Some(3), Some(20));
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total, 45);

        let clamped = Page::paginate(vec![1, 2, 3], Some(0), Some(1000));
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Role::CLevel).unwrap(), "\"c-level\"");
        assert_eq!("devops-sre".parse::<Role>(), Ok(Role::DevopsSre));
        assert!("wizard".parse::<PromptCategory>().is_err());
    }

    #[test]
    fn test_prompt_defaults_on_sparse_document() {
        let doc = serde_json::json!({
            "id": "p1",
            "slug": "sparse",
            "title": "Sparse",
            "content": "body",
            "category": "general",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let prompt: Prompt = serde_json::from_value(doc).unwrap();
        assert!(prompt.is_public);
        assert_eq!(prompt.revision, 1);
        assert!(prompt.tags.is_empty());
    }
}
