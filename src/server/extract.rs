use super::AppState;
use crate::manager::Actor;
use crate::utils::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use serde::de::DeserializeOwned;

/// `Json<T>` whose rejection is a 400 `{ "error": ... }` body
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

/// `Query<T>` with the same error shape as [`ApiJson`]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

/// A live session whose role is one of the configured admin roles
pub struct AdminSession(pub Actor);

pub(crate) fn session_token(headers: &axum::http::HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let forbidden = || AppError::Forbidden("Admin access required".to_string());

        let token = session_token(&parts.headers, &state.config.auth.session_cookie).ok_or_else(forbidden)?;
        let session = state.sessions.resolve(&token).await?.ok_or_else(forbidden)?;

        if !state.config.auth.admin_roles.iter().any(|r| r == &session.role) {
            tracing::warn!(email = %session.email, role = %session.role, "non-admin session rejected");
            return Err(forbidden());
        }

        Ok(AdminSession(Actor::from(session)))
    }
}
