use super::AppState;
use super::extract::session_token;
use crate::utils::error::AppResult;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::delete,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/session", delete(logout))
}

/// Drop the session behind the cookie (if any) and clear the cookie
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    let cookie_name = state.config.auth.session_cookie.clone();
    if let Some(token) = session_token(&headers, &cookie_name) {
        state.sessions.revoke(&token).await?;
    }

    let jar = jar.remove(Cookie::build((cookie_name, "")).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}
