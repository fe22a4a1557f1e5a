//! Registration, sign-in, sessions and password management

use crate::domain::{Language, SessionId, ShasthoError, User, UserRole, UserSession};
use crate::services::{AuthenticatedUser, LoginOutcome};
use crate::validation::ModelValidator;
use crate::web::error::ApiError;
use crate::web::extract::Submitted;
use crate::web::session::{expired_session_cookie, session_cookie};
use crate::web::state::AppState;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;

const RESET_REQUESTED: &str =
    "If your email is registered, you will receive a password reset link shortly.";

#[derive(Serialize)]
pub struct Registered {
    pub message: &'static str,
    pub user: User,
}

/// `GET /api/status`
pub async fn status() -> Json<Value> {
    Json(json!({"status": "ok", "message": "API is running"}))
}

fn registration_role(kind: &str) -> Result<UserRole, ApiError> {
    match kind {
        "patient" => Ok(UserRole::Patient),
        "doctor" => Ok(UserRole::Doctor),
        "hospital-admin" => Ok(UserRole::HospitalAdmin),
        "test-admin" => Ok(UserRole::TestAdmin),
        other => Err(ShasthoError::NotFound(format!("Unknown registration type '{other}'")).into()),
    }
}

/// `POST /api/auth/register/:kind`
pub async fn register(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Registered>), ApiError> {
    let role = registration_role(&kind)?;
    let user = state.services.auth.register(role, &form).await?;
    let message = if role.requires_approval() {
        "Registration submitted. Your account will be activated once it has been approved."
    } else {
        "Registration successful. You can now sign in."
    };
    Ok((StatusCode::CREATED, Json(Registered { message, user })))
}

fn client_address(headers: &HeaderMap, connect: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| connect.map(|ConnectInfo(addr)| addr.ip().to_string()))
}

/// Checks credentials and opens a session; shared with the HTML sign-in form
pub(crate) async fn sign_in(
    state: &AppState,
    headers: &HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
    form: &crate::validation::FormData,
) -> Result<LoginOutcome, ApiError> {
    ModelValidator::new()
        .required("username")
        .required("password")
        .check(form)?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let outcome = state
        .services
        .auth
        .login(
            form.require("username")?,
            form.raw("password").unwrap_or_default(),
            user_agent,
            client_address(headers, connect),
        )
        .await?;
    Ok(outcome)
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Submitted(form): Submitted,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = sign_in(&state, &headers, connect, &form).await?;
    let cookie = session_cookie(
        &outcome.token,
        state.session_max_age_secs(),
        state.is_production(),
    );
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(outcome)))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.auth.logout(&auth).await?;
    Ok((
        AppendHeaders([(SET_COOKIE, expired_session_cookie())]),
        Json(json!({"message": "Signed out"})),
    ))
}

/// `GET /api/auth/profile`: the account plus its role profile, if any
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, ApiError> {
    let directory = &state.services.directory;
    let details = match auth.role() {
        UserRole::Patient => serde_json::to_value(directory.patient_for_user(auth.id()).await?),
        UserRole::Doctor => {
            let doctor = directory.doctor_for_user(auth.id()).await?;
            serde_json::to_value(directory.doctor_profile(doctor.id).await?)
        }
        _ => Ok(Value::Null),
    }
    .map_err(|e| ShasthoError::Serialization(e.to_string()))?;
    Ok(Json(json!({"user": auth.user, "profile": details})))
}

/// `POST /api/auth/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(form): Submitted,
) -> Result<Json<Value>, ApiError> {
    ModelValidator::new()
        .required("current_password")
        .required("new_password")
        .required("confirm_password")
        .check(&form)?;
    if form.raw("new_password") != form.raw("confirm_password") {
        return Err(ShasthoError::invalid_field("confirm_password", "Passwords must match").into());
    }
    state
        .services
        .auth
        .change_password(
            auth.id(),
            form.raw("current_password").unwrap_or_default(),
            form.raw("new_password").unwrap_or_default(),
        )
        .await?;
    Ok(Json(json!({"message": "Password changed successfully"})))
}

/// `POST /api/auth/language`
pub async fn change_language(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(form): Submitted,
) -> Result<Json<User>, ApiError> {
    let language: Language = form.parse_required("language")?;
    let user = state
        .services
        .auth
        .change_language(auth.id(), language)
        .await?;
    Ok(Json(user))
}

#[derive(Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: UserSession,
    pub current: bool,
}

/// `GET /api/auth/sessions`
pub async fn sessions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let sessions = state.services.auth.list_sessions(auth.id()).await?;
    Ok(Json(
        sessions
            .into_iter()
            .map(|session| SessionView {
                current: session.id == auth.session_id,
                session,
            })
            .collect(),
    ))
}

/// `DELETE /api/auth/sessions/:id`
pub async fn terminate_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .auth
        .terminate_session(auth.id(), session_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/password-reset`
///
/// The reply is the same whether or not the account exists. Outside
/// production the reset path is included, since no mail is sent.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Submitted(form): Submitted,
) -> Result<Json<Value>, ApiError> {
    ModelValidator::new()
        .required("username")
        .email("username")
        .check(&form)?;
    let issued = state
        .services
        .auth
        .request_reset(form.require("username")?)
        .await?;

    let mut body = json!({"message": RESET_REQUESTED});
    if let Some(issued) = issued.filter(|_| !state.is_production()) {
        body["reset_path"] = json!(format!("/api/auth/password-reset/{}", issued.token));
        body["expires_at"] = json!(issued.expires_at);
    }
    Ok(Json(body))
}

/// `GET /api/auth/password-reset/:token`
pub async fn verify_password_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state.services.auth.verify_reset(&token).await?;
    Ok(Json(json!({"valid": true, "expires_at": record.expires_at})))
}

/// `POST /api/auth/password-reset/:token`
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Submitted(form): Submitted,
) -> Result<Json<Value>, ApiError> {
    ModelValidator::new()
        .required("password")
        .required("confirm_password")
        .check(&form)?;
    if form.raw("password") != form.raw("confirm_password") {
        return Err(ShasthoError::invalid_field("confirm_password", "Passwords must match").into());
    }
    state
        .services
        .auth
        .reset_password(&token, form.raw("password").unwrap_or_default())
        .await?;
    Ok(Json(json!({
        "message": "Your password has been reset successfully. You can now log in with your new password."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_roles() {
        assert_eq!(registration_role("patient").unwrap(), UserRole::Patient);
        assert_eq!(
            registration_role("hospital-admin").unwrap(),
            UserRole::HospitalAdmin
        );
        assert_eq!(registration_role("test-admin").unwrap(), UserRole::TestAdmin);
        assert!(registration_role("admin").is_err());
    }

    #[test]
    fn test_forwarded_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "203.0.113.7, 10.0.0.1".parse().unwrap());
        let connect = Some(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));
        assert_eq!(
            client_address(&headers, connect).as_deref(),
            Some("203.0.113.7")
        );
        assert_eq!(
            client_address(&HeaderMap::new(), connect).as_deref(),
            Some("127.0.0.1")
        );
    }
}
