//! Availability slots and appointments

use super::{doctor_of, patient_of};
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, AvailabilitySlot, DoctorId, Patient, SlotId,
};
use crate::services::{AuthenticatedUser, OpenSlot};
use crate::web::error::ApiError;
use crate::web::extract::Submitted;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

// Doctor endpoints

/// `GET /api/doctor/slots`
pub async fn list_slots(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<AvailabilitySlot>>, ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    Ok(Json(state.services.booking.list_slots(doctor_id).await?))
}

/// `POST /api/doctor/slots`
pub async fn add_slot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<AvailabilitySlot>), ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    let slot = state.services.booking.add_slot(doctor_id, &form).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// `DELETE /api/doctor/slots/:id`
pub async fn delete_slot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(slot_id): Path<SlotId>,
) -> Result<StatusCode, ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    state.services.booking.delete_slot(doctor_id, slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/doctor/appointments?date=YYYY-MM-DD`
pub async fn doctor_appointments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    Ok(Json(
        state
            .services
            .booking
            .doctor_appointments(doctor_id, query.date)
            .await?,
    ))
}

/// `POST /api/doctor/appointments/:id/status` with `status=completed|no-show`
pub async fn set_appointment_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(appointment_id): Path<AppointmentId>,
    Submitted(form): Submitted,
) -> Result<Json<Appointment>, ApiError> {
    let doctor_id = doctor_of(&state, &auth).await?;
    let status: AppointmentStatus = form.parse_required("status")?;
    Ok(Json(
        state
            .services
            .booking
            .set_status(doctor_id, appointment_id, status)
            .await?,
    ))
}

// Patient endpoints

/// `GET /api/patient/profile`
pub async fn patient_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(
        state.services.directory.patient_for_user(auth.id()).await?,
    ))
}

/// `PUT /api/patient/profile`
pub async fn update_patient_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(form): Submitted,
) -> Result<Json<Patient>, ApiError> {
    let patient_id = patient_of(&state, &auth).await?;
    Ok(Json(
        state
            .services
            .directory
            .update_patient(patient_id, &form)
            .await?,
    ))
}

/// `GET /api/patient/ehr`: the caller's own medical summary
pub async fn my_ehr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<crate::services::MedicalSummary>, ApiError> {
    let patient_id = patient_of(&state, &auth).await?;
    Ok(Json(
        state
            .services
            .ehr
            .get_patient_medical_summary(patient_id)
            .await?,
    ))
}

/// `GET /api/patient/doctors/:id/slots?date=YYYY-MM-DD`
pub async fn available_slots(
    State(state): State<AppState>,
    Path(doctor_id): Path<DoctorId>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<OpenSlot>>, ApiError> {
    let date = query
        .date
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'date' is required".to_string()))?;
    Ok(Json(
        state
            .services
            .booking
            .available_slots(doctor_id, date)
            .await?,
    ))
}

/// `POST /api/patient/appointments`
pub async fn book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Submitted(form): Submitted,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let patient_id = patient_of(&state, &auth).await?;
    let appointment = state.services.booking.book(patient_id, &form).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/patient/appointments`
pub async fn my_appointments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let patient_id = patient_of(&state, &auth).await?;
    Ok(Json(
        state
            .services
            .booking
            .patient_appointments(patient_id)
            .await?,
    ))
}

/// `POST /api/patient/appointments/:id/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Appointment>, ApiError> {
    let patient_id = patient_of(&state, &auth).await?;
    Ok(Json(
        state
            .services
            .booking
            .cancel(patient_id, appointment_id)
            .await?,
    ))
}
