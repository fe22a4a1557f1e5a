//! Electronic health records: visits and clinical records

use super::doctor_of;
use crate::domain::{
    ClinicalRecord, Ehr, EhrId, Patient, PatientId, RecordId, RecordKind, RecordScope,
    ShasthoError, Visit, VisitId,
};
use crate::services::{AuthenticatedUser, Authorship, DoctorProfile, MedicalSummary, SortDir, VisitDetails};
use crate::web::error::ApiError;
use crate::web::extract::Submitted;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct VisitListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct PatientEhr {
    pub patient: Patient,
    pub ehr: Option<Ehr>,
}

fn record_kind(slug: &str, scope: RecordScope) -> Result<RecordKind, ApiError> {
    let kind: RecordKind = slug
        .parse()
        .map_err(|e: String| ShasthoError::NotFound(e))?;
    if kind.scope() != scope {
        let owner = match kind.scope() {
            RecordScope::Visit => "a visit",
            RecordScope::Ehr => "an EHR",
        };
        return Err(ShasthoError::InvalidState(format!("{kind} records belong to {owner}")).into());
    }
    Ok(kind)
}

fn any_record_kind(slug: &str) -> Result<RecordKind, ApiError> {
    slug.parse()
        .map_err(|e: String| ShasthoError::NotFound(e).into())
}

/// `GET /api/doctor/profile`
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DoctorProfile>, ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    Ok(Json(state.services.directory.doctor_profile(doctor_id).await?))
}

/// `GET /api/doctor/patients/:id/ehr`
pub async fn patient_ehr(
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<PatientEhr>, ApiError> {
    let patient = state.services.directory.get_patient(patient_id).await?;
    let ehr = state.services.ehr.get_patient_ehr(patient_id).await?;
    Ok(Json(PatientEhr { patient, ehr }))
}

/// `POST /api/doctor/patients/:id/ehr`; returns the existing EHR if there is one
pub async fn create_patient_ehr(
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
) -> Result<(StatusCode, Json<Ehr>), ApiError> {
    let ehr = state.services.ehr.create_patient_ehr(patient_id).await?;
    Ok((StatusCode::CREATED, Json(ehr)))
}

/// `GET /api/doctor/patients/:id/summary`
pub async fn medical_summary(
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<MedicalSummary>, ApiError> {
    Ok(Json(
        state
            .services
            .ehr
            .get_patient_medical_summary(patient_id)
            .await?,
    ))
}

/// `GET /api/doctor/ehr/:ehr_id/visits?limit=&offset=&sort=asc|desc`
pub async fn list_visits(
    State(state): State<AppState>,
    Path(ehr_id): Path<EhrId>,
    Query(query): Query<VisitListQuery>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    let sort = match query.sort.as_deref() {
        None => SortDir::default(),
        Some(raw) => raw.parse().map_err(ApiError::BadRequest)?,
    };
    let ehr = &state.services.ehr;
    ehr.get_ehr(ehr_id).await?;
    let visits = ehr
        .get_ehr_visits(
            ehr_id,
            query.limit.unwrap_or(10).clamp(1, 100),
            query.offset.unwrap_or(0),
            sort,
        )
        .await?;
    Ok(Json(visits))
}

/// `POST /api/doctor/ehr/:ehr_id/visits`
pub async fn add_visit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(ehr_id): Path<EhrId>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    let visit = state
        .services
        .ehr
        .add_visit(ehr_id, &form, Some(doctor_id))
        .await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// `GET /api/doctor/visits/:visit_id`
pub async fn visit_details(
    State(state): State<AppState>,
    Path(visit_id): Path<VisitId>,
) -> Result<Json<VisitDetails>, ApiError> {
    Ok(Json(state.services.ehr.get_visit_details(visit_id).await?))
}

/// `DELETE /api/doctor/visits/:visit_id`
pub async fn delete_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<VisitId>,
) -> Result<StatusCode, ApiError> {
    state.services.ehr.delete_visit(visit_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/doctor/visits/:visit_id/records/:kind`
pub async fn list_visit_records(
    State(state): State<AppState>,
    Path((visit_id, kind)): Path<(VisitId, String)>,
) -> Result<Json<Vec<ClinicalRecord>>, ApiError> {
    let kind = record_kind(&kind, RecordScope::Visit)?;
    state.services.ehr.get_visit(visit_id).await?;
    Ok(Json(
        state.services.ehr.list_visit_records(kind, visit_id).await?,
    ))
}

/// `POST /api/doctor/visits/:visit_id/records/:kind`
pub async fn add_visit_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((visit_id, kind)): Path<(VisitId, String)>,
    Submitted(mut form): Submitted,
) -> Result<(StatusCode, Json<ClinicalRecord>), ApiError> {
    let kind = record_kind(&kind, RecordScope::Visit)?;
    state.services.ehr.get_visit(visit_id).await?;
    form.set("visit_id", visit_id.to_string());
    let by = Authorship {
        doctor: Some(doctor_of(&state, &auth).await?),
        user: Some(auth.id()),
    };
    let record = state.services.ehr.add_record(kind, &form, by).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/doctor/ehr/:ehr_id/records/:kind`
pub async fn list_ehr_records(
    State(state): State<AppState>,
    Path((ehr_id, kind)): Path<(EhrId, String)>,
) -> Result<Json<Vec<ClinicalRecord>>, ApiError> {
    let kind = record_kind(&kind, RecordScope::Ehr)?;
    state.services.ehr.get_ehr(ehr_id).await?;
    Ok(Json(state.services.ehr.list_ehr_records(kind, ehr_id).await?))
}

/// `POST /api/doctor/ehr/:ehr_id/records/:kind`
pub async fn add_ehr_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((ehr_id, kind)): Path<(EhrId, String)>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<ClinicalRecord>), ApiError> {
    let kind = record_kind(&kind, RecordScope::Ehr)?;
    let by = Authorship {
        doctor: Some(doctor_of(&state, &auth).await?),
        user: Some(auth.id()),
    };
    let record = add_to_ehr(&state, ehr_id, kind, form, by).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /api/test-admin/ehr/:ehr_id/test-results`
pub async fn upload_test_result(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(ehr_id): Path<EhrId>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<ClinicalRecord>), ApiError> {
    let by = Authorship {
        doctor: None,
        user: Some(auth.id()),
    };
    let record = add_to_ehr(&state, ehr_id, RecordKind::TestResult, form, by).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn add_to_ehr(
    state: &AppState,
    ehr_id: EhrId,
    kind: RecordKind,
    mut form: crate::validation::FormData,
    by: Authorship,
) -> Result<ClinicalRecord, ApiError> {
    state.services.ehr.get_ehr(ehr_id).await?;
    form.set("ehr_id", ehr_id.to_string());
    Ok(state.services.ehr.add_record(kind, &form, by).await?)
}

/// `GET /api/doctor/records/:kind/:id`
pub async fn get_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, RecordId)>,
) -> Result<Json<ClinicalRecord>, ApiError> {
    let kind = any_record_kind(&kind)?;
    Ok(Json(state.services.ehr.get_record(kind, id).await?))
}

/// `PUT /api/doctor/records/:kind/:id`
pub async fn update_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((kind, id)): Path<(String, RecordId)>,
    Submitted(form): Submitted,
) -> Result<Json<ClinicalRecord>, ApiError> {
    let kind = any_record_kind(&kind)?;
    let by = Authorship {
        doctor: Some(doctor_of(&state, &auth).await?),
        user: Some(auth.id()),
    };
    Ok(Json(
        state.services.ehr.update_record(kind, id, &form, by).await?,
    ))
}

/// `DELETE /api/doctor/records/:kind/:id`
pub async fn delete_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, RecordId)>,
) -> Result<StatusCode, ApiError> {
    let kind = any_record_kind(&kind)?;
    state.services.ehr.delete_record(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
