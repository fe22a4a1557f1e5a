//! Account approval and the test/imaging administrator request workflow

use super::directory::{DirectoryService, DoctorProfile};
use crate::adapters::database::{AccountStore, CareStore, DatabaseClient};
use crate::domain::{
    AdminRequestId, AdminRequestStatus, DoctorNote, DoctorNoteId, HospitalAdmin, HospitalId,
    Result, ShasthoError, TestAdmin, TestImageAdminRequest, User, UserId, UserRole, UserStatus,
};
use crate::validation::{rules, FormData};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct PendingDoctor {
    pub user: User,
    pub profile: Option<DoctorProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingHospitalAdmin {
    pub user: User,
    pub admin: Option<HospitalAdmin>,
    pub hospital_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingTestAdmin {
    pub user: User,
    pub admin: TestAdmin,
}

pub struct ApprovalService {
    db: Arc<dyn DatabaseClient>,
    directory: DirectoryService,
}

impl ApprovalService {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self {
            directory: DirectoryService::new(db.clone()),
            db,
        }
    }

    /// Moves a pending account of `role` to `status`
    async fn decide_account(
        &self,
        user_id: UserId,
        role: UserRole,
        status: UserStatus,
    ) -> Result<User> {
        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .filter(|u| u.role == role)
            .ok_or_else(|| ShasthoError::NotFound(format!("{role} account {user_id} not found")))?;
        if user.status != UserStatus::Inactive {
            return Err(ShasthoError::InvalidState(format!(
                "Account is {}, not pending approval",
                user.status
            )));
        }
        let previous = user.status;
        user.status = status;
        user.updated_at = Utc::now();
        self.db.update_user(&user).await?;
        crate::log_status_transition!(role.as_str(), user.id, previous, status);
        Ok(user)
    }

    pub async fn pending_doctors(&self) -> Result<Vec<PendingDoctor>> {
        let mut pending = Vec::new();
        for user in self
            .db
            .list_users(UserRole::Doctor, UserStatus::Inactive)
            .await?
        {
            let profile = match self.db.find_doctor_by_user(user.id).await? {
                Some(doctor) => Some(self.directory.describe_doctor(doctor).await?),
                None => None,
            };
            pending.push(PendingDoctor { user, profile });
        }
        Ok(pending)
    }

    async fn note_decision(
        &self,
        user_id: UserId,
        reviewer: UserId,
        note_type: &str,
        content: String,
    ) -> Result<()> {
        let Some(doctor) = self.db.find_doctor_by_user(user_id).await? else {
            return Ok(());
        };
        let now = Utc::now();
        let note = DoctorNote {
            id: DoctorNoteId::new(),
            doctor_id: doctor.id,
            note_type: note_type.to_string(),
            content,
            created_by: Some(reviewer),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_doctor_note(&note).await
    }

    pub async fn approve_doctor(
        &self,
        user_id: UserId,
        reviewer: UserId,
        notes: Option<String>,
    ) -> Result<User> {
        let user = self
            .decide_account(user_id, UserRole::Doctor, UserStatus::Active)
            .await?;
        let content = notes.unwrap_or_else(|| "Approved".to_string());
        self.note_decision(user_id, reviewer, "approval", content)
            .await?;
        Ok(user)
    }

    pub async fn reject_doctor(
        &self,
        user_id: UserId,
        reviewer: UserId,
        reason: Option<String>,
    ) -> Result<User> {
        let user = self
            .decide_account(user_id, UserRole::Doctor, UserStatus::Suspended)
            .await?;
        if let Some(reason) = reason {
            self.note_decision(user_id, reviewer, "rejection", reason)
                .await?;
        }
        Ok(user)
    }

    pub async fn pending_hospital_admins(&self) -> Result<Vec<PendingHospitalAdmin>> {
        let mut pending = Vec::new();
        for user in self
            .db
            .list_users(UserRole::HospitalAdmin, UserStatus::Inactive)
            .await?
        {
            let admin = self.db.find_hospital_admin_by_user(user.id).await?;
            let hospital_name = match &admin {
                Some(a) => self.db.get_hospital(a.hospital_id).await?.map(|h| h.name),
                None => None,
            };
            pending.push(PendingHospitalAdmin {
                user,
                admin,
                hospital_name,
            });
        }
        Ok(pending)
    }

    pub async fn approve_hospital_admin(&self, user_id: UserId) -> Result<User> {
        self.decide_account(user_id, UserRole::HospitalAdmin, UserStatus::Active)
            .await
    }

    pub async fn reject_hospital_admin(&self, user_id: UserId) -> Result<User> {
        self.decide_account(user_id, UserRole::HospitalAdmin, UserStatus::Suspended)
            .await
    }

    /// Hospital of the calling hospital administrator
    pub async fn hospital_of(&self, hospital_admin: UserId) -> Result<HospitalId> {
        self.db
            .find_hospital_admin_by_user(hospital_admin)
            .await?
            .map(|a| a.hospital_id)
            .ok_or_else(|| {
                ShasthoError::Forbidden("Hospital administrator profile not found".to_string())
            })
    }

    pub async fn pending_test_admins(&self, hospital_admin: UserId) -> Result<Vec<PendingTestAdmin>> {
        let hospital_id = self.hospital_of(hospital_admin).await?;
        let mut pending = Vec::new();
        for admin in self.db.list_test_admins(hospital_id).await? {
            if let Some(user) = self.db.get_user(admin.user_id).await? {
                if user.status == UserStatus::Inactive {
                    pending.push(PendingTestAdmin { user, admin });
                }
            }
        }
        Ok(pending)
    }

    async fn decide_test_admin(
        &self,
        hospital_admin: UserId,
        test_admin_user: UserId,
        status: UserStatus,
    ) -> Result<User> {
        let hospital_id = self.hospital_of(hospital_admin).await?;
        let admin = self
            .db
            .find_test_admin_by_user(test_admin_user)
            .await?
            .ok_or_else(|| {
                ShasthoError::NotFound(format!("Test admin {test_admin_user} not found"))
            })?;
        if admin.hospital_id != hospital_id {
            return Err(ShasthoError::Forbidden(
                "Test admin belongs to another hospital".to_string(),
            ));
        }
        self.decide_account(test_admin_user, UserRole::TestAdmin, status)
            .await
    }

    pub async fn approve_test_admin(
        &self,
        hospital_admin: UserId,
        test_admin_user: UserId,
    ) -> Result<User> {
        self.decide_test_admin(hospital_admin, test_admin_user, UserStatus::Active)
            .await
    }

    pub async fn reject_test_admin(
        &self,
        hospital_admin: UserId,
        test_admin_user: UserId,
    ) -> Result<User> {
        self.decide_test_admin(hospital_admin, test_admin_user, UserStatus::Suspended)
            .await
    }

    pub async fn submit_admin_request(
        &self,
        submitted_by: UserId,
        form: &FormData,
    ) -> Result<TestImageAdminRequest> {
        rules::test_image_admin_request().check(form)?;
        let hospital_id: HospitalId = form.parse_required("hospital_id")?;
        if self.db.get_hospital(hospital_id).await?.is_none() {
            return Err(ShasthoError::invalid_field(
                "hospital_id",
                "Selected hospital does not exist",
            ));
        }

        let now = Utc::now();
        let request = TestImageAdminRequest {
            id: AdminRequestId::new(),
            hospital_id,
            full_name: form.require("full_name")?.to_string(),
            email: form.require("email")?.to_string(),
            contact_number: form.require("contact_number")?.to_string(),
            department: form.require("department")?.to_string(),
            qualification: form.require("qualification")?.to_string(),
            experience: form.require("experience")?.to_string(),
            reason: form.require("reason")?.to_string(),
            submitted_by,
            status: AdminRequestStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_admin_request(&request).await?;
        tracing::info!(
            request_id = %request.id,
            hospital_id = %hospital_id,
            "Test image admin request submitted"
        );
        Ok(request)
    }

    pub async fn list_admin_requests(
        &self,
        hospital_id: Option<HospitalId>,
        status: Option<AdminRequestStatus>,
    ) -> Result<Vec<TestImageAdminRequest>> {
        self.db.list_admin_requests(hospital_id, status).await
    }

    /// Records a reviewer's decision on a pending request
    pub async fn decide_admin_request(
        &self,
        id: AdminRequestId,
        reviewer: UserId,
        decision: AdminRequestStatus,
    ) -> Result<TestImageAdminRequest> {
        let mut request = self
            .db
            .get_admin_request(id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Request {id} not found")))?;
        if !request.status.can_transition_to(decision) {
            return Err(ShasthoError::InvalidState(format!(
                "Request is already {}",
                request.status
            )));
        }

        let previous = request.status;
        let now = Utc::now();
        request.status = decision;
        request.reviewed_by = Some(reviewer);
        request.reviewed_at = Some(now);
        request.updated_at = now;
        if !self.db.update_admin_request(&request, previous).await? {
            let current = self
                .db
                .get_admin_request(id)
                .await?
                .ok_or_else(|| ShasthoError::NotFound(format!("Request {id} not found")))?;
            return Err(ShasthoError::InvalidState(format!(
                "Request is already {}",
                current.status
            )));
        }
        crate::log_status_transition!("test_image_admin_request", request.id, previous, decision);
        Ok(request)
    }

    pub async fn approve_admin_request(
        &self,
        id: AdminRequestId,
        reviewer: UserId,
    ) -> Result<TestImageAdminRequest> {
        self.decide_admin_request(id, reviewer, AdminRequestStatus::Approved)
            .await
    }

    pub async fn reject_admin_request(
        &self,
        id: AdminRequestId,
        reviewer: UserId,
    ) -> Result<TestImageAdminRequest> {
        self.decide_admin_request(id, reviewer, AdminRequestStatus::Rejected)
            .await
    }
}
