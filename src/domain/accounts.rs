//! Login accounts, role profiles and the administrative approval workflow.

use super::care::{Doctor, Patient};
use super::enums::{AdminRequestStatus, Language, UserRole, UserStatus};
use super::ids::{
    AdminRequestId, DoctorId, DoctorNoteId, HospitalAdminId, HospitalId, ResetTokenId, SessionId,
    TestAdminId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub full_name: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalAdmin {
    pub id: HospitalAdminId,
    pub user_id: UserId,
    pub full_name: String,
    pub hospital_id: HospitalId,
    pub contact_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Test/imaging administrator profile attached to a hospital
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestAdmin {
    pub id: TestAdminId,
    pub user_id: UserId,
    pub full_name: String,
    pub hospital_id: HospitalId,
    pub contact_number: String,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request, filed by a hospital administrator, to appoint a test/imaging administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestImageAdminRequest {
    pub id: AdminRequestId,
    pub hospital_id: HospitalId,
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub department: String,
    pub qualification: String,
    pub experience: String,
    pub reason: String,
    pub submitted_by: UserId,
    pub status: AdminRequestStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-text note attached to a doctor's profile (approval remarks and the like)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorNote {
    pub id: DoctorNoteId,
    pub doctor_id: DoctorId,
    pub note_type: String,
    pub content: String,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Password reset token; only the SHA-256 of the token is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && now <= self.expires_at
    }
}

/// Signed-in browser or API client; only the SHA-256 of the bearer token is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: SessionId,
    pub user_id: UserId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.ended_at.is_none() && now <= self.expires_at
    }
}

/// Role-specific record stored in the same write as its [`User`]
#[derive(Debug, Clone, PartialEq)]
pub enum RoleProfile {
    Patient(Patient),
    Doctor(Doctor),
    HospitalAdmin(HospitalAdmin),
    TestAdmin(TestAdmin),
    None,
}
