use super::AppState;
use super::extract::{AdminSession, ApiJson, ApiQuery};
use super::rate_limit::RateAction;
use crate::core::data::{Page, Pattern, Prompt, PromptFilter, PromptStats, Workflow};
use crate::imagegen::{ImageRequest, image_prompt_for};
use crate::manager::{
    NewPattern, NewPrompt, NewWorkflow, PatternPatch, PromptPatch, WorkflowFilter, WorkflowPatch,
};
use crate::utils::error::{AppError, AppResult};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/prompts",
            get(list_prompts).post(create_prompt).put(update_prompt).delete(delete_prompt),
        )
        .route("/api/admin/prompts/{id}/image", post(generate_image))
        .route(
            "/api/admin/patterns",
            get(list_patterns).post(create_pattern).put(update_pattern).delete(delete_pattern),
        )
        .route(
            "/api/admin/workflows",
            get(list_workflows).post(create_workflow).put(update_workflow).delete(delete_workflow),
        )
        .route("/opshub", get(dashboard))
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    fn require(self) -> AppResult<String> {
        self.id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("id is required".to_string()))
    }
}

fn deleted(id: &str) -> Json<Value> {
    Json(json!({ "success": true, "id": id }))
}

// Prompts

async fn list_prompts(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    ApiQuery(filter): ApiQuery<PromptFilter>,
) -> AppResult<Json<Page<Prompt>>> {
    Ok(Json(state.prompts.search(&filter, false).await?))
}

async fn create_prompt(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiJson(input): ApiJson<NewPrompt>,
) -> AppResult<(StatusCode, Json<Prompt>)> {
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    let prompt = state.prompts.create(input, Some(&actor)).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

async fn update_prompt(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiJson(patch): ApiJson<PromptPatch>,
) -> AppResult<Json<Prompt>> {
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    Ok(Json(state.prompts.update(patch, Some(&actor)).await?))
}

async fn delete_prompt(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> AppResult<Json<Value>> {
    let id = query.require()?;
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    state.prompts.delete(&id).await?;
    Ok(deleted(&id))
}

#[derive(Debug, Default, Deserialize)]
struct ImageOptions {
    style: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    image_url: String,
}

async fn generate_image(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<ImageResponse>> {
    // The body is optional; an empty one means default styling.
    let options: ImageOptions = if body.iter().all(u8::is_ascii_whitespace) {
        ImageOptions::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?
    };

    state.rate_limiter.check(RateAction::ImageGeneration, &actor.email).await?;

    let prompt = state.prompts.get(&id).await?;
    let request = ImageRequest {
        prompt: image_prompt_for(&prompt, options.style.as_deref()),
    };
    let image = state.images.generate(request).await?;

    let updated = state.prompts.set_image(&prompt.id, image.url).await?;
    tracing::info!(id = %updated.id, by = %actor.email, "prompt image updated");

    Ok(Json(ImageResponse {
        image_url: updated.image_url.unwrap_or_default(),
    }))
}

// Patterns

async fn list_patterns(State(state): State<AppState>, AdminSession(_): AdminSession) -> AppResult<Json<Vec<Pattern>>> {
    Ok(Json(state.patterns.list(None).await?))
}

async fn create_pattern(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiJson(input): ApiJson<NewPattern>,
) -> AppResult<(StatusCode, Json<Pattern>)> {
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    Ok((StatusCode::CREATED, Json(state.patterns.create(input).await?)))
}

async fn update_pattern(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiJson(patch): ApiJson<PatternPatch>,
) -> AppResult<Json<Pattern>> {
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    Ok(Json(state.patterns.update(patch).await?))
}

async fn delete_pattern(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> AppResult<Json<Value>> {
    let id = query.require()?;
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    state.patterns.delete(&id).await?;
    Ok(deleted(&id))
}

// Workflows

async fn list_workflows(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    ApiQuery(filter): ApiQuery<WorkflowFilter>,
) -> AppResult<Json<Page<Workflow>>> {
    Ok(Json(state.workflows.list(&filter, false).await?))
}

async fn create_workflow(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiJson(input): ApiJson<NewWorkflow>,
) -> AppResult<(StatusCode, Json<Workflow>)> {
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    Ok((StatusCode::CREATED, Json(state.workflows.create(input).await?)))
}

async fn update_workflow(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiJson(patch): ApiJson<WorkflowPatch>,
) -> AppResult<Json<Workflow>> {
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    Ok(Json(state.workflows.update(patch).await?))
}

async fn delete_workflow(
    State(state): State<AppState>,
    AdminSession(actor): AdminSession,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> AppResult<Json<Value>> {
    let id = query.require()?;
    state.rate_limiter.check(RateAction::AdminWrite, &actor.email).await?;
    state.workflows.delete(&id).await?;
    Ok(deleted(&id))
}

// Ops hub

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    user: String,
    prompts: PromptStats,
    patterns: usize,
    workflows: usize,
    published_workflows: usize,
    ai_models: usize,
    ai_tools: usize,
}

async fn dashboard(State(state): State<AppState>, AdminSession(actor): AdminSession) -> AppResult<Json<Dashboard>> {
    let prompts = state.prompts.stats().await?;
    let patterns = state.patterns.list(None).await?.len();
    let all_workflows = WorkflowFilter {
        limit: Some(1),
        ..Default::default()
    };
    let workflows = state.workflows.list(&all_workflows, false).await?.total;
    let published_workflows = state.workflows.list(&all_workflows, true).await?.total;
    let (ai_models, ai_tools) = state.catalog.counts().await?;

    Ok(Json(Dashboard {
        user: actor.email,
        prompts,
        patterns,
        workflows,
        published_workflows,
        ai_models,
        ai_tools,
    }))
}
