//! Route handlers, one module per area of the API

pub mod account;
pub mod approvals;
pub mod clinical;
pub mod directory;
pub mod scheduling;

use super::error::ApiError;
use super::state::AppState;
use crate::domain::{DoctorId, PatientId};
use crate::services::AuthenticatedUser;

/// Doctor profile behind the signed-in account
pub(crate) async fn doctor_of(state: &AppState, auth: &AuthenticatedUser) -> Result<DoctorId, ApiError> {
    Ok(state.services.directory.doctor_for_user(auth.id()).await?.id)
}

/// Patient profile behind the signed-in account
pub(crate) async fn patient_of(
    state: &AppState,
    auth: &AuthenticatedUser,
) -> Result<PatientId, ApiError> {
    Ok(state.services.directory.patient_for_user(auth.id()).await?.id)
}
