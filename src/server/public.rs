use super::AppState;
use super::extract::{ApiJson, ApiQuery};
use crate::core::data::{
    AiModel, AiTool, Page, Pattern, PatternCategory, Prompt, PromptFilter, Workflow,
};
use crate::manager::WorkflowFilter;
use crate::playground::{self, RenderRequest, RenderedPrompt, TemplateInfo};
use crate::sitemap::SitemapBuilder;
use crate::utils::error::AppResult;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const RELATED_LIMIT: usize = 4;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/prompts", get(list_prompts))
        .route("/api/prompts/{slug}", get(get_prompt))
        .route("/api/patterns", get(list_patterns))
        .route("/api/patterns/{slug}", get(get_pattern))
        .route("/api/workflows", get(list_workflows))
        .route("/api/workflows/{slug}", get(get_workflow))
        .route("/api/ai-models", get(list_models))
        .route("/api/ai-tools", get(list_tools))
        .route("/api/tags", get(list_tags))
        .route("/api/playground", post(render_playground))
        .route("/api/playground/patterns", get(playground_patterns))
        .route("/prompts/{slug}", get(prompt_page))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn list_prompts(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PromptFilter>,
) -> AppResult<Json<Page<Prompt>>> {
    Ok(Json(state.prompts.search(&filter, true).await?))
}

async fn get_prompt(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<Prompt>> {
    Ok(Json(state.prompts.get_public(&slug).await?))
}

/// Everything the prompt detail page renders
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptPage {
    prompt: Prompt,
    pattern: Option<Pattern>,
    related: Vec<Prompt>,
}

async fn prompt_page(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<PromptPage>> {
    let prompt = state.prompts.get_public(&slug).await?;

    let pattern = match &prompt.pattern {
        Some(key) => state.patterns.find(key).await?,
        None => None,
    };

    let filter = PromptFilter {
        category: Some(prompt.category),
        limit: Some(RELATED_LIMIT + 1),
        ..Default::default()
    };
    let related = state
        .prompts
        .search(&filter, true)
        .await?
        .items
        .into_iter()
        .filter(|p| p.id != prompt.id)
        .take(RELATED_LIMIT)
        .collect();

    Ok(Json(PromptPage { prompt, pattern, related }))
}

#[derive(Debug, Default, Deserialize)]
struct CategoryQuery {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PatternQuery {
    category: Option<PatternCategory>,
}

async fn list_patterns(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PatternQuery>,
) -> AppResult<Json<Vec<Pattern>>> {
    Ok(Json(state.patterns.list(query.category).await?))
}

async fn get_pattern(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<Pattern>> {
    Ok(Json(state.patterns.get(&slug).await?))
}

async fn list_workflows(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<WorkflowFilter>,
) -> AppResult<Json<Page<Workflow>>> {
    Ok(Json(state.workflows.list(&filter, true).await?))
}

async fn get_workflow(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<Workflow>> {
    Ok(Json(state.workflows.get_published(&slug).await?))
}

async fn list_models(State(state): State<AppState>) -> AppResult<Json<Vec<AiModel>>> {
    Ok(Json(state.catalog.models(false).await?))
}

async fn list_tools(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> AppResult<Json<Vec<AiTool>>> {
    Ok(Json(state.catalog.tools(query.category.as_deref(), false).await?))
}

async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.prompts.tags(true).await?))
}

async fn playground_patterns() -> Json<Vec<TemplateInfo>> {
    Json(playground::templates())
}

async fn render_playground(ApiJson(request): ApiJson<RenderRequest>) -> AppResult<Json<RenderedPrompt>> {
    Ok(Json(playground::render(&request)?))
}

async fn sitemap(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let xml = SitemapBuilder::new(state.storage.clone())
        .build_xml(state.config.origin())
        .await?;
    Ok(([(CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    let body = format!(
        "User-agent: *\nAllow: /\nDisallow: /opshub\nDisallow: /api/admin\n\nSitemap: {}/sitemap.xml\n",
        state.config.origin().trim_end_matches('/')
    );
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}
