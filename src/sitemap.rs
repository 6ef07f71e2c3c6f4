//! `sitemap.xml` assembly
//!
//! Pulls listed documents from every public collection, drops records whose
//! slug cannot form a valid URL, and dedupes by location. One failing
//! collection does not take the whole sitemap down.

use crate::core::data::{AiModel, AiTool, Pattern, Prompt, Workflow};
use crate::core::operations::Storage;
use crate::core::traits::Document;
use crate::utils::error::AppResult;
use crate::utils::format::{format_date, xml_escape};
use crate::utils::slug::is_publishable_slug;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFreq {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Path relative to the site origin, always starting with `/`
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_freq: ChangeFreq,
    pub priority: f32,
}

/// Hub and landing pages that exist regardless of content
const STATIC_PAGES: &[(&str, ChangeFreq, f32)] = &[
    ("/", ChangeFreq::Daily, 1.0),
    ("/prompts", ChangeFreq::Daily, 0.9),
    ("/patterns", ChangeFreq::Weekly, 0.9),
    ("/workflows", ChangeFreq::Weekly, 0.9),
    ("/learn", ChangeFreq::Weekly, 0.8),
    ("/ai-models", ChangeFreq::Weekly, 0.7),
    ("/ai-tools", ChangeFreq::Weekly, 0.7),
    ("/playground", ChangeFreq::Monthly, 0.6),
    ("/about", ChangeFreq::Monthly, 0.4),
    ("/contact", ChangeFreq::Monthly, 0.3),
    ("/privacy", ChangeFreq::Monthly, 0.2),
    ("/terms", ChangeFreq::Monthly, 0.2),
];

pub struct SitemapBuilder {
    storage: Storage,
}

impl SitemapBuilder {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Load listed documents of one collection; failures are logged and yield nothing
    async fn listed<T: Document>(&self) -> Vec<T> {
        match self.storage.repo::<T>().list_listed().await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(collection = T::COLLECTION, error = %e, "sitemap skipped collection");
                Vec::new()
            }
        }
    }

    pub async fn entries(&self) -> Vec<SitemapEntry> {
        let mut entries: Vec<SitemapEntry> = STATIC_PAGES
            .iter()
            .map(|(path, change_freq, priority)| SitemapEntry {
                path: path.to_string(),
                last_modified: None,
                change_freq: *change_freq,
                priority: *priority,
            })
            .collect();

        entries.extend(document_entries(
            self.listed::<Prompt>().await,
            |p| vec![p.slug.clone()],
            "/prompts",
            ChangeFreq::Weekly,
            0.8,
        ));
        entries.extend(document_entries(
            self.listed::<Pattern>().await,
            |p| vec![p.slug.clone()],
            "/patterns",
            ChangeFreq::Monthly,
            0.7,
        ));
        entries.extend(document_entries(
            self.listed::<Workflow>().await,
            |w| vec![w.category.clone(), w.slug.clone()],
            "/workflows",
            ChangeFreq::Monthly,
            0.7,
        ));
        entries.extend(document_entries(
            self.listed::<AiModel>().await,
            |m| vec![m.slug.clone()],
            "/ai-models",
            ChangeFreq::Monthly,
            0.5,
        ));
        entries.extend(document_entries(
            self.listed::<AiTool>().await,
            |t| vec![t.slug.clone()],
            "/ai-tools",
            ChangeFreq::Monthly,
            0.5,
        ));

        dedupe(entries)
    }

    pub async fn build_xml(&self, origin: &str) -> AppResult<String> {
        let entries = self.entries().await;
        tracing::debug!(urls = entries.len(), "sitemap built");
        Ok(render_xml(origin, &entries))
    }
}

/// One entry per document whose every path segment is publishable
fn document_entries<T: Document>(
    docs: Vec<T>,
    segments: impl Fn(&T) -> Vec<String>,
    prefix: &str,
    change_freq: ChangeFreq,
    priority: f32,
) -> Vec<SitemapEntry> {
    docs.iter()
        .filter_map(|doc| {
            let parts = segments(doc);
            if !parts.iter().all(|s| is_publishable_slug(s)) {
                tracing::debug!(collection = T::COLLECTION, id = doc.id(), "sitemap dropped invalid slug");
                return None;
            }
            Some(SitemapEntry {
                path: format!("{}/{}", prefix, parts.join("/")),
                last_modified: Some(doc.updated_at()),
                change_freq,
                priority,
            })
        })
        .collect()
}

/// Keep the first entry for each path
fn dedupe(entries: Vec<SitemapEntry>) -> Vec<SitemapEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.path.clone()))
        .collect()
}

pub fn render_xml(origin: &str, entries: &[SitemapEntry]) -> String {
    let origin = origin.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&format!("{}{}", origin, entry.path))));
        if let Some(modified) = &entry.last_modified {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", format_date(modified)));
        }
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_freq.as_str()));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::WorkflowStatus;
    use crate::core::data::fixtures::{pattern, prompt, workflow};
    use crate::core::traits::DocumentStore;
    use crate::storage::MemoryStore;
    use crate::utils::error::AppError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    async fn seeded() -> Storage {
        let storage = Storage::new(Arc::new(MemoryStore::default()));

        let mut private = prompt("private-notes", "Private");
        private.is_public = false;
        let mut placeholder = prompt("undefined", "Broken import");
        placeholder.id = "broken".into();

        storage
            .repo::<Prompt>()
            .upsert_many(vec![prompt("code-review", "Code review"), private, placeholder])
            .await
            .unwrap();
        storage.repo::<Pattern>().upsert_many(vec![pattern("persona")]).await.unwrap();
        storage
            .repo::<Workflow>()
            .upsert_many(vec![
                workflow("pr-checklist", WorkflowStatus::Published),
                workflow("wip", WorkflowStatus::Draft),
            ])
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_entries_filter_and_shape() {
        let builder = SitemapBuilder::new(seeded().await);
        let paths: Vec<String> = builder.entries().await.into_iter().map(|e| e.path).collect();

        assert!(paths.contains(&"/".to_string()));
        assert!(paths.contains(&"/prompts/code-review".to_string()));
        assert!(paths.contains(&"/patterns/persona".to_string()));
        assert!(paths.contains(&"/workflows/code-quality/pr-checklist".to_string()));
        assert!(!paths.iter().any(|p| p.contains("private-notes")));
        assert!(!paths.iter().any(|p| p.contains("undefined")));
        assert!(!paths.iter().any(|p| p.ends_with("/wip")));
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let entry = |path: &str, priority| SitemapEntry {
            path: path.to_string(),
            last_modified: None,
            change_freq: ChangeFreq::Weekly,
            priority,
        };
        let deduped = dedupe(vec![entry("/a", 0.9), entry("/b", 0.5), entry("/a", 0.1)]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].priority, 0.9);
    }

    #[test]
    fn test_render_xml_escapes_and_formats() {
        let xml = render_xml(
            "https://engify.ai/",
            &[SitemapEntry {
                path: "/search?q=a&b".to_string(),
                last_modified: Some("2024-05-01T10:00:00Z".parse().unwrap()),
                change_freq: ChangeFreq::Daily,
                priority: 0.7,
            }],
        );
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://engify.ai/search?q=a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2024-05-01</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>0.7</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    struct FailingPrompts(MemoryStore);

    #[async_trait]
    impl DocumentStore for FailingPrompts {
        async fn load(&self, collection: &str) -> AppResult<Vec<Value>> {
            if collection == "prompts" {
                return Err(AppError::Storage("connection reset".into()));
            }
            self.0.load(collection).await
        }

        async fn save(&self, collection: &str, documents: &[Value]) -> AppResult<()> {
            self.0.save(collection, documents).await
        }

        async fn ensure_ready(&self) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failing_collection_is_skipped() {
        let storage = Storage::new(Arc::new(FailingPrompts(MemoryStore::default())));
        storage.repo::<Pattern>().upsert_many(vec![pattern("persona")]).await.unwrap();

        let xml = SitemapBuilder::new(storage).build_xml("https://engify.ai").await.unwrap();
        assert!(xml.contains("https://engify.ai/patterns/persona"));
        assert!(!xml.contains("/prompts/"));
    }
}
