//! Session resolution and role guards
//!
//! A session token arrives either as `Authorization: Bearer <token>` (API
//! clients) or in the `shastho_session` cookie (browser pages).
//! [`require_session`] resolves it and stores the [`AuthenticatedUser`] in the
//! request extensions; [`require_roles`] then checks the caller's role.

use super::error::ApiError;
use super::state::AppState;
use crate::domain::UserRole;
use crate::services::{require_role, AuthenticatedUser};
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const SESSION_COOKIE: &str = "shastho_session";

pub const ADMIN: &[UserRole] = &[UserRole::Admin];
pub const DOCTOR: &[UserRole] = &[UserRole::Doctor];
pub const PATIENT: &[UserRole] = &[UserRole::Patient];
pub const HOSPITAL_ADMIN: &[UserRole] = &[UserRole::HospitalAdmin];
pub const TEST_ADMIN: &[UserRole] = &[UserRole::TestAdmin];

/// Token from the bearer header, falling back to the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that clears the session cookie
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolves the caller without failing; used by the HTML pages
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<AuthenticatedUser> {
    let token = session_token(headers)?;
    state.services.auth.authenticate(&token).await.ok()
}

/// Rejects the request with 401 unless it carries a live session
pub async fn require_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_session_inner(&state, req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    state: &AppState,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = session_token(req.headers()) else {
        crate::log_request_rejected!(req.uri().path(), "missing session token");
        return Err(ApiError::unauthorized());
    };
    let user = state.services.auth.authenticate(&token).await.map_err(|e| {
        crate::log_request_rejected!(req.uri().path(), "invalid session token");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Rejects the request with 403 unless the caller holds one of `roles`
///
/// Must run inside [`require_session`].
pub async fn require_roles(
    State(roles): State<&'static [UserRole]>,
    req: Request,
    next: Next,
) -> Response {
    let Some(user) = req.extensions().get::<AuthenticatedUser>() else {
        return ApiError::unauthorized().into_response();
    };
    if let Err(e) = require_role(&user.user, roles) {
        crate::log_request_rejected!(req.uri().path(), format!("role {} not permitted", user.role()));
        return ApiError::from(e).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        headers.insert(COOKIE, HeaderValue::from_static("shastho_session=fromcookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; shastho_session=tok_1; lang=bn"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok_1"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        headers.insert(COOKIE, HeaderValue::from_static("shastho_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", 3600, true);
        assert!(cookie.starts_with("shastho_session=tok; Path=/; HttpOnly"));
        assert!(cookie.ends_with("Max-Age=3600; Secure"));
        assert!(!session_cookie("tok", 60, false).contains("Secure"));
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }
}
