//! Request gating that runs before any route handler
//!
//! The session check here only looks for the cookie. Whether the session is
//! live and carries an admin role is decided by the `AdminSession` extractor.

use super::AppState;
use super::extract::session_token;
use crate::utils::error::AppError;
use crate::utils::slug::normalize_segment;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

const OPSHUB_PREFIX: &str = "/opshub";
const ADMIN_API_PREFIX: &str = "/api/admin";
const PROMPT_PAGE_PREFIX: &str = "/prompts/";

fn under(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{}/", prefix))
}

/// Cookie-presence gate for the ops hub and admin API
pub async fn require_session_cookie(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let opshub = under(path, OPSHUB_PREFIX);
    let admin_api = under(path, ADMIN_API_PREFIX);
    if !opshub && !admin_api {
        return next.run(req).await;
    }

    if session_token(req.headers(), &state.config.auth.session_cookie).is_some() {
        return next.run(req).await;
    }

    tracing::debug!(path = %path, "no session cookie");
    if opshub {
        let callback = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(OPSHUB_PREFIX);
        let location = format!("/login?callbackUrl={}", urlencoding::encode(callback));
        return Redirect::temporary(&location).into_response();
    }

    AppError::Forbidden("Admin access required".to_string()).into_response()
}

/// Target of a permanent redirect for `/prompts/{segment}` when the
/// segment is an id or a non-canonical spelling of a public prompt's slug
async fn canonical_prompt_path(state: &AppState, segment: &str) -> Option<String> {
    let normalized = normalize_segment(segment);
    if normalized.is_empty() || normalized.contains('/') {
        return None;
    }

    let mut found = match state.prompts.find_by_id_or_slug(segment.trim_end_matches('/')).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "slug lookup failed, serving request as-is");
            return None;
        }
    };
    if found.is_none() && normalized != segment {
        found = match state.prompts.find_by_id_or_slug(&normalized).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "slug lookup failed, serving request as-is");
                return None;
            }
        };
    }

    let prompt = found.filter(|p| p.is_public)?;
    if prompt.slug == segment {
        return None;
    }
    Some(format!("{}{}", PROMPT_PAGE_PREFIX, prompt.slug))
}

/// Redirect `/prompts/{id}` and mis-cased or slash-suffixed slugs to `/prompts/{slug}`
pub async fn canonicalize_prompt_slug(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(segment) = req.uri().path().strip_prefix(PROMPT_PAGE_PREFIX) else {
        return next.run(req).await;
    };
    if segment.is_empty() {
        return next.run(req).await;
    }

    match canonical_prompt_path(&state, segment).await {
        Some(mut location) => {
            if let Some(query) = req.uri().query() {
                location.push('?');
                location.push_str(query);
            }
            tracing::debug!(from = %req.uri().path(), to = %location, "canonical redirect");
            Redirect::permanent(&location).into_response()
        }
        None => next.run(req).await,
    }
}
