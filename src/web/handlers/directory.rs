//! Hospitals, departments, doctors and patients

use crate::adapters::database::DoctorFilter;
use crate::domain::{
    Department, DepartmentId, Doctor, DoctorId, Hospital, HospitalId, Patient, PatientId,
};
use crate::services::{DoctorProfile, Page};
use crate::web::error::ApiError;
use crate::web::extract::Submitted;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct DoctorQuery {
    pub hospital_id: Option<HospitalId>,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// `GET /api/hospitals`
pub async fn list_hospitals(State(state): State<AppState>) -> Result<Json<Vec<Hospital>>, ApiError> {
    Ok(Json(state.services.directory.list_hospitals().await?))
}

/// `GET /api/hospitals/:id/departments`
pub async fn hospital_departments(
    State(state): State<AppState>,
    Path(id): Path<HospitalId>,
) -> Result<Json<Vec<Department>>, ApiError> {
    Ok(Json(state.services.directory.hospital_departments(id).await?))
}

/// `GET /api/departments`
pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, ApiError> {
    Ok(Json(state.services.directory.list_departments().await?))
}

/// `GET /api/doctors?hospital_id=&department_id=`
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let filter = DoctorFilter {
        hospital_id: query.hospital_id,
        department_id: query.department_id,
    };
    Ok(Json(state.services.directory.list_doctors(filter).await?))
}

/// `GET /api/doctors/:id`
pub async fn doctor_profile(
    State(state): State<AppState>,
    Path(id): Path<DoctorId>,
) -> Result<Json<DoctorProfile>, ApiError> {
    Ok(Json(state.services.directory.doctor_profile(id).await?))
}

// Administrator endpoints

pub async fn create_hospital(
    State(state): State<AppState>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    let hospital = state.services.directory.create_hospital(&form).await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

pub async fn update_hospital(
    State(state): State<AppState>,
    Path(id): Path<HospitalId>,
    Submitted(form): Submitted,
) -> Result<Json<Hospital>, ApiError> {
    Ok(Json(state.services.directory.update_hospital(id, &form).await?))
}

pub async fn delete_hospital(
    State(state): State<AppState>,
    Path(id): Path<HospitalId>,
) -> Result<StatusCode, ApiError> {
    state.services.directory.delete_hospital(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_department(
    State(state): State<AppState>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    let department = state.services.directory.create_department(&form).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
    Submitted(form): Submitted,
) -> Result<Json<Department>, ApiError> {
    Ok(Json(
        state.services.directory.update_department(id, &form).await?,
    ))
}

pub async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
) -> Result<StatusCode, ApiError> {
    state.services.directory.delete_department(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/hospitals/:id/departments/:department_id`
pub async fn link_department(
    State(state): State<AppState>,
    Path((hospital_id, department_id)): Path<(HospitalId, DepartmentId)>,
) -> Result<StatusCode, ApiError> {
    let directory = &state.services.directory;
    directory.get_hospital(hospital_id).await?;
    directory.get_department(department_id).await?;
    directory.link_department(hospital_id, department_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_doctor(
    State(state): State<AppState>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let doctor = state.services.directory.create_doctor(&form, None).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<DoctorId>,
    Submitted(form): Submitted,
) -> Result<Json<Doctor>, ApiError> {
    Ok(Json(state.services.directory.update_doctor(id, &form).await?))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<DoctorId>,
) -> Result<StatusCode, ApiError> {
    state.services.directory.delete_doctor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.services.directory.list_patients().await?))
}

pub async fn create_patient(
    State(state): State<AppState>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = state.services.directory.create_patient(&form, None).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<PatientId>,
    Submitted(form): Submitted,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.services.directory.update_patient(id, &form).await?))
}

/// `DELETE /api/admin/patients/:id`; the EHR tree and appointments go too
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<PatientId>,
) -> Result<StatusCode, ApiError> {
    state.services.directory.delete_patient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/doctor/patients?q=&page=&per_page=`
pub async fn search_patients(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Page<Patient>>, ApiError> {
    let page = state
        .services
        .directory
        .search_patients(
            &query.q,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(10),
        )
        .await?;
    Ok(Json(page))
}
