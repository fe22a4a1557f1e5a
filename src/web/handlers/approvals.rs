//! Account approvals and test image admin requests

use crate::domain::{
    AdminRequestId, AdminRequestStatus, HospitalId, ShasthoError, TestImageAdminRequest, User,
    UserId,
};
use crate::services::approvals::{PendingDoctor, PendingHospitalAdmin, PendingTestAdmin};
use crate::services::AuthenticatedUser;
use crate::web::error::ApiError;
use crate::web::extract::Submitted;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub hospital_id: Option<HospitalId>,
    pub status: Option<AdminRequestStatus>,
}

// System administrator

/// `GET /api/admin/pending/doctors`
pub async fn pending_doctors(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingDoctor>>, ApiError> {
    Ok(Json(state.services.approvals.pending_doctors().await?))
}

/// `POST /api/admin/pending/doctors/:user_id/approve` with an optional `notes` field
pub async fn approve_doctor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<UserId>,
    Submitted(form): Submitted,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .approvals
        .approve_doctor(user_id, auth.id(), form.get_string("notes"))
        .await?;
    Ok(Json(user))
}

/// `POST /api/admin/pending/doctors/:user_id/reject` with an optional `reason` field
pub async fn reject_doctor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<UserId>,
    Submitted(form): Submitted,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .approvals
        .reject_doctor(user_id, auth.id(), form.get_string("reason"))
        .await?;
    Ok(Json(user))
}

/// `GET /api/admin/pending/hospital-admins`
pub async fn pending_hospital_admins(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingHospitalAdmin>>, ApiError> {
    Ok(Json(state.services.approvals.pending_hospital_admins().await?))
}

pub async fn approve_hospital_admin(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .approve_hospital_admin(user_id)
            .await?,
    ))
}

pub async fn reject_hospital_admin(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .reject_hospital_admin(user_id)
            .await?,
    ))
}

/// `GET /api/admin/requests?hospital_id=&status=`
pub async fn all_admin_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Vec<TestImageAdminRequest>>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .list_admin_requests(query.hospital_id, query.status)
            .await?,
    ))
}

/// `POST /api/admin/requests/:id/approve`
pub async fn admin_approve_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<AdminRequestId>,
) -> Result<Json<TestImageAdminRequest>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .approve_admin_request(id, auth.id())
            .await?,
    ))
}

/// `POST /api/admin/requests/:id/reject`
pub async fn admin_reject_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<AdminRequestId>,
) -> Result<Json<TestImageAdminRequest>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .reject_admin_request(id, auth.id())
            .await?,
    ))
}

// Hospital administrator

/// `GET /api/hospital-admin/pending/test-admins`
pub async fn pending_test_admins(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<PendingTestAdmin>>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .pending_test_admins(auth.id())
            .await?,
    ))
}

pub async fn approve_test_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .approve_test_admin(auth.id(), user_id)
            .await?,
    ))
}

pub async fn reject_test_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        state
            .services
            .approvals
            .reject_test_admin(auth.id(), user_id)
            .await?,
    ))
}

/// `GET /api/hospital-admin/requests?status=`: requests for the caller's hospital
pub async fn hospital_admin_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Vec<TestImageAdminRequest>>, ApiError> {
    let approvals = &state.services.approvals;
    let hospital_id = approvals.hospital_of(auth.id()).await?;
    Ok(Json(
        approvals
            .list_admin_requests(Some(hospital_id), query.status)
            .await?,
    ))
}

/// `POST /api/hospital-admin/requests`; the request is filed for the caller's hospital
pub async fn submit_hospital_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(mut form): Submitted,
) -> Result<(StatusCode, Json<TestImageAdminRequest>), ApiError> {
    let approvals = &state.services.approvals;
    let hospital_id = approvals.hospital_of(auth.id()).await?;
    form.set("hospital_id", hospital_id.to_string());
    let request = approvals.submit_admin_request(auth.id(), &form).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn decide_for_hospital(
    state: &AppState,
    auth: &AuthenticatedUser,
    id: AdminRequestId,
    decision: AdminRequestStatus,
) -> Result<TestImageAdminRequest, ApiError> {
    let approvals = &state.services.approvals;
    let hospital_id = approvals.hospital_of(auth.id()).await?;
    let own = approvals
        .list_admin_requests(Some(hospital_id), None)
        .await?
        .iter()
        .any(|r| r.id == id);
    if !own {
        return Err(ShasthoError::NotFound(format!("Request {id} not found")).into());
    }
    Ok(approvals.decide_admin_request(id, auth.id(), decision).await?)
}

pub async fn approve_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<AdminRequestId>,
) -> Result<Json<TestImageAdminRequest>, ApiError> {
    Ok(Json(
        decide_for_hospital(&state, &auth, id, AdminRequestStatus::Approved).await?,
    ))
}

pub async fn reject_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<AdminRequestId>,
) -> Result<Json<TestImageAdminRequest>, ApiError> {
    Ok(Json(
        decide_for_hospital(&state, &auth, id, AdminRequestStatus::Rejected).await?,
    ))
}

// Test administrator

/// `POST /api/test-admin/requests`
pub async fn submit_test_admin_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<TestImageAdminRequest>), ApiError> {
    let request = state
        .services
        .approvals
        .submit_admin_request(auth.id(), &form)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}
