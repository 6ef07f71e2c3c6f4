use crate::core::data::{AiModel, AiTool, ListingStatus};
use crate::core::operations::{Repository, Storage};
use crate::utils::error::AppResult;

/// Read side of the AI model and tool directories
#[derive(Clone)]
pub struct CatalogService {
    models: Repository<AiModel>,
    tools: Repository<AiTool>,
}

impl CatalogService {
    pub fn new(storage: &Storage) -> Self {
        Self {
            models: storage.repo(),
            tools: storage.repo(),
        }
    }

    /// Models grouped by provider, then by name; deprecated ones only when asked
    pub async fn models(&self, include_inactive: bool) -> AppResult<Vec<AiModel>> {
        let mut models: Vec<AiModel> = self
            .models
            .list()
            .await?
            .into_iter()
            .filter(|m| include_inactive || m.status == ListingStatus::Active)
            .collect();
        models.sort_by(|a, b| a.provider.cmp(&b.provider).then_with(|| a.name.cmp(&b.name)));
        Ok(models)
    }

    pub async fn tools(&self, category: Option<&str>, include_inactive: bool) -> AppResult<Vec<AiTool>> {
        let mut tools: Vec<AiTool> = self
            .tools
            .list()
            .await?
            .into_iter()
            .filter(|t| include_inactive || t.status == ListingStatus::Active)
            .filter(|t| category.is_none_or(|c| t.category == c))
            .collect();
        tools.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(tools)
    }

    pub async fn counts(&self) -> AppResult<(usize, usize)> {
        Ok((self.models.count().await?, self.tools.count().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn model(slug: &str, provider: &str, status: ListingStatus) -> AiModel {
        AiModel {
            id: slug.to_string(),
            slug: slug.to_string(),
            name: slug.to_string(),
            provider: provider.to_string(),
            status,
            context_window: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_models_filter_and_order() {
        let storage = Storage::new(Arc::new(MemoryStore::default()));
        storage
            .repo::<AiModel>()
            .upsert_many(vec![
                model("zeta", "openai", ListingStatus::Active),
                model("alpha", "openai", ListingStatus::Deprecated),
                model("beta", "anthropic", ListingStatus::Active),
            ])
            .await
            .unwrap();

        let catalog = CatalogService::new(&storage);
        let active: Vec<String> = catalog.models(false).await.unwrap().into_iter().map(|m| m.slug).collect();
        assert_eq!(active, vec!["beta", "zeta"]);
        assert_eq!(catalog.models(true).await.unwrap().len(), 3);
        assert_eq!(catalog.counts().await.unwrap(), (3, 0));
    }
}
