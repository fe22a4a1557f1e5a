//! PostgreSQL adapter implementing the storage traits
//!
//! Cascading deletes and `SET NULL` references are enforced by the foreign
//! keys in the bundled migration, so the delete methods here are single
//! statements.

use crate::adapters::database::traits::{
    AccountStore, CareStore, DatabaseClient, DoctorFilter, RecordStore, VisitQuery,
};
use crate::adapters::postgresql::client::{map_pg_error, PostgreSQLClient};
use crate::adapters::postgresql::rows::{self, SqlValue};
use crate::domain::{
    AdminRequestId, AdminRequestStatus, Appointment, AppointmentId, AppointmentStatus,
    AvailabilitySlot, ClinicalRecord, Department, DepartmentId, Doctor, DoctorId, DoctorNote, Ehr,
    EhrId, Hospital, HospitalAdmin, HospitalId, PasswordResetToken, Patient, PatientId, RecordId,
    RecordKind, RecordParent, Result, RoleProfile, SessionId, ShasthoError, SlotId, TestAdmin,
    TestImageAdminRequest, User, UserId, UserRole, UserSession, UserStatus, Visit, VisitId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

/// PostgreSQL implementation of [`DatabaseClient`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn missing(what: &str, id: impl std::fmt::Display) -> ShasthoError {
    ShasthoError::NotFound(format!("{what} {id} not found"))
}

fn collect<T>(rows: Vec<Row>, map: fn(&Row) -> Result<T>) -> Result<Vec<T>> {
    rows.iter().map(map).collect()
}

fn first<T>(row: Option<Row>, map: fn(&Row) -> Result<T>) -> Result<Option<T>> {
    row.as_ref().map(map).transpose()
}

fn expect_one(affected: u64, what: &str, id: impl std::fmt::Display) -> Result<()> {
    if affected == 0 {
        Err(missing(what, id))
    } else {
        Ok(())
    }
}

const INSERT_USER: &str = "INSERT INTO users (id, username, password_hash, role, status, \
     full_name, language, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

const INSERT_PATIENT: &str = "INSERT INTO patients (id, user_id, full_name, date_of_birth, \
     gender, contact_number, address, emergency_contact_name, emergency_contact_number, \
     created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";

const INSERT_DOCTOR: &str = "INSERT INTO doctors (id, user_id, full_name, specialization, \
     credentials, contact_number, hospital_id, department_id, created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

const INSERT_HOSPITAL_ADMIN: &str = "INSERT INTO hospital_admins (id, user_id, full_name, \
     hospital_id, contact_number, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)";

const INSERT_TEST_ADMIN: &str = "INSERT INTO test_admins (id, user_id, full_name, hospital_id, \
     contact_number, department, qualification, created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

fn username_taken(err: ShasthoError, user: &User) -> ShasthoError {
    match err {
        ShasthoError::Conflict(_) => ShasthoError::Conflict(format!(
            "Username '{}' is already registered",
            user.username
        )),
        other => other,
    }
}

/// LIMIT/OFFSET value; anything past `i64::MAX` selects nothing, as in memory
fn row_bound(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn as_params(values: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    values
        .iter()
        .map(|v| v.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

#[async_trait]
impl AccountStore for PostgreSQLAdapter {
    async fn insert_user(&self, user: &User) -> Result<()> {
        self.client
            .execute(
                INSERT_USER,
                &[
                    user.id.as_uuid(),
                    &user.username,
                    &user.password_hash,
                    &user.role.as_str(),
                    &user.status.as_str(),
                    &user.full_name,
                    &user.language.as_str(),
                    &user.created_at,
                    &user.updated_at,
                ],
            )
            .await
            .map_err(|e| username_taken(e, user))?;
        Ok(())
    }

    async fn insert_user_with_profile(&self, user: &User, profile: &RoleProfile) -> Result<()> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_pg_error(e, "Failed to start transaction"))?;

        tx.execute(
            INSERT_USER,
            &[
                user.id.as_uuid(),
                &user.username,
                &user.password_hash,
                &user.role.as_str(),
                &user.status.as_str(),
                &user.full_name,
                &user.language.as_str(),
                &user.created_at,
                &user.updated_at,
            ],
        )
        .await
        .map_err(|e| username_taken(map_pg_error(e, "Failed to insert user"), user))?;

        let inserted = match profile {
            RoleProfile::Patient(patient) => {
                let user_id = patient.user_id.map(|u| *u.as_uuid());
                tx.execute(
                    INSERT_PATIENT,
                    &[
                        patient.id.as_uuid(),
                        &user_id,
                        &patient.full_name,
                        &patient.date_of_birth,
                        &patient.gender.as_str(),
                        &patient.contact_number,
                        &patient.address,
                        &patient.emergency_contact_name,
                        &patient.emergency_contact_number,
                        &patient.created_at,
                        &patient.updated_at,
                    ],
                )
                .await
            }
            RoleProfile::Doctor(doctor) => {
                let user_id = doctor.user_id.map(|u| *u.as_uuid());
                let hospital_id = doctor.hospital_id.map(|h| *h.as_uuid());
                let department_id = doctor.department_id.map(|d| *d.as_uuid());
                tx.execute(
                    INSERT_DOCTOR,
                    &[
                        doctor.id.as_uuid(),
                        &user_id,
                        &doctor.full_name,
                        &doctor.specialization,
                        &doctor.credentials,
                        &doctor.contact_number,
                        &hospital_id,
                        &department_id,
                        &doctor.created_at,
                        &doctor.updated_at,
                    ],
                )
                .await
            }
            RoleProfile::HospitalAdmin(admin) => {
                tx.execute(
                    INSERT_HOSPITAL_ADMIN,
                    &[
                        admin.id.as_uuid(),
                        admin.user_id.as_uuid(),
                        &admin.full_name,
                        admin.hospital_id.as_uuid(),
                        &admin.contact_number,
                        &admin.created_at,
                        &admin.updated_at,
                    ],
                )
                .await
            }
            RoleProfile::TestAdmin(admin) => {
                tx.execute(
                    INSERT_TEST_ADMIN,
                    &[
                        admin.id.as_uuid(),
                        admin.user_id.as_uuid(),
                        &admin.full_name,
                        admin.hospital_id.as_uuid(),
                        &admin.contact_number,
                        &admin.department,
                        &admin.qualification,
                        &admin.created_at,
                        &admin.updated_at,
                    ],
                )
                .await
            }
            RoleProfile::None => Ok(0),
        };
        inserted.map_err(|e| map_pg_error(e, "Failed to insert role profile"))?;

        tx.commit()
            .await
            .map_err(|e| map_pg_error(e, "Failed to commit registration"))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = self
            .client
            .query_opt("SELECT * FROM users WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = self
            .client
            .query_opt("SELECT * FROM users WHERE username = $1", &[&username])
            .await?;
        first(row, rows::user)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE users SET username = $2, password_hash = $3, role = $4, status = $5, \
                 full_name = $6, language = $7, updated_at = $8 WHERE id = $1",
                &[
                    user.id.as_uuid(),
                    &user.username,
                    &user.password_hash,
                    &user.role.as_str(),
                    &user.status.as_str(),
                    &user.full_name,
                    &user.language.as_str(),
                    &user.updated_at,
                ],
            )
            .await?;
        expect_one(affected, "User", user.id)
    }

    async fn list_users(&self, role: UserRole, status: UserStatus) -> Result<Vec<User>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM users WHERE role = $1 AND status = $2 ORDER BY created_at",
                &[&role.as_str(), &status.as_str()],
            )
            .await?;
        collect(rows, rows::user)
    }

    async fn insert_session(&self, session: &UserSession) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO user_sessions (id, user_id, token_hash, user_agent, ip_address, \
                 expires_at, ended_at, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    session.id.as_uuid(),
                    session.user_id.as_uuid(),
                    &session.token_hash,
                    &session.user_agent,
                    &session.ip_address,
                    &session.expires_at,
                    &session.ended_at,
                    &session.created_at,
                    &session.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> Result<Option<UserSession>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM user_sessions WHERE token_hash = $1",
                &[&token_hash],
            )
            .await?;
        first(row, rows::session)
    }

    async fn list_sessions(&self, user_id: UserId) -> Result<Vec<UserSession>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM user_sessions WHERE user_id = $1 ORDER BY created_at",
                &[user_id.as_uuid()],
            )
            .await?;
        collect(rows, rows::session)
    }

    async fn end_session(&self, id: SessionId, at: DateTime<Utc>) -> Result<bool> {
        let affected = self
            .client
            .execute(
                "UPDATE user_sessions SET ended_at = $2, updated_at = $2 \
                 WHERE id = $1 AND ended_at IS NULL",
                &[id.as_uuid(), &at],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, used, \
                 created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    token.id.as_uuid(),
                    token.user_id.as_uuid(),
                    &token.token_hash,
                    &token.expires_at,
                    &token.used,
                    &token.created_at,
                    &token.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_reset_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM password_reset_tokens WHERE token_hash = $1",
                &[&token_hash],
            )
            .await?;
        first(row, rows::reset_token)
    }

    async fn mark_reset_token_used(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool> {
        let affected = self
            .client
            .execute(
                "UPDATE password_reset_tokens SET used = TRUE, updated_at = $2 \
                 WHERE token_hash = $1 AND used = FALSE AND expires_at >= $2",
                &[&token_hash, &at],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn insert_hospital_admin(&self, admin: &HospitalAdmin) -> Result<()> {
        self.client
            .execute(
                INSERT_HOSPITAL_ADMIN,
                &[
                    admin.id.as_uuid(),
                    admin.user_id.as_uuid(),
                    &admin.full_name,
                    admin.hospital_id.as_uuid(),
                    &admin.contact_number,
                    &admin.created_at,
                    &admin.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_hospital_admin_by_user(&self, user_id: UserId) -> Result<Option<HospitalAdmin>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM hospital_admins WHERE user_id = $1",
                &[user_id.as_uuid()],
            )
            .await?;
        first(row, rows::hospital_admin)
    }

    async fn insert_test_admin(&self, admin: &TestAdmin) -> Result<()> {
        self.client
            .execute(
                INSERT_TEST_ADMIN,
                &[
                    admin.id.as_uuid(),
                    admin.user_id.as_uuid(),
                    &admin.full_name,
                    admin.hospital_id.as_uuid(),
                    &admin.contact_number,
                    &admin.department,
                    &admin.qualification,
                    &admin.created_at,
                    &admin.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_test_admin_by_user(&self, user_id: UserId) -> Result<Option<TestAdmin>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM test_admins WHERE user_id = $1",
                &[user_id.as_uuid()],
            )
            .await?;
        first(row, rows::test_admin)
    }

    async fn list_test_admins(&self, hospital_id: HospitalId) -> Result<Vec<TestAdmin>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM test_admins WHERE hospital_id = $1 ORDER BY created_at",
                &[hospital_id.as_uuid()],
            )
            .await?;
        collect(rows, rows::test_admin)
    }

    async fn insert_admin_request(&self, request: &TestImageAdminRequest) -> Result<()> {
        let reviewed_by = request.reviewed_by.map(|u| *u.as_uuid());
        self.client
            .execute(
                "INSERT INTO test_image_admin_requests (id, hospital_id, full_name, email, \
                 contact_number, department, qualification, experience, reason, submitted_by, \
                 status, reviewed_by, reviewed_at, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
                &[
                    request.id.as_uuid(),
                    request.hospital_id.as_uuid(),
                    &request.full_name,
                    &request.email,
                    &request.contact_number,
                    &request.department,
                    &request.qualification,
                    &request.experience,
                    &request.reason,
                    request.submitted_by.as_uuid(),
                    &request.status.as_str(),
                    &reviewed_by,
                    &request.reviewed_at,
                    &request.created_at,
                    &request.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_admin_request(
        &self,
        id: AdminRequestId,
    ) -> Result<Option<TestImageAdminRequest>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM test_image_admin_requests WHERE id = $1",
                &[id.as_uuid()],
            )
            .await?;
        first(row, rows::admin_request)
    }

    async fn list_admin_requests(
        &self,
        hospital_id: Option<HospitalId>,
        status: Option<AdminRequestStatus>,
    ) -> Result<Vec<TestImageAdminRequest>> {
        let hospital = hospital_id.map(|h| *h.as_uuid());
        let status = status.map(|s| s.as_str());
        let rows = self
            .client
            .query(
                "SELECT * FROM test_image_admin_requests \
                 WHERE ($1::uuid IS NULL OR hospital_id = $1) \
                 AND ($2::text IS NULL OR status = $2) \
                 ORDER BY created_at DESC",
                &[&hospital, &status],
            )
            .await?;
        collect(rows, rows::admin_request)
    }

    async fn update_admin_request(
        &self,
        request: &TestImageAdminRequest,
        expected: AdminRequestStatus,
    ) -> Result<bool> {
        let reviewed_by = request.reviewed_by.map(|u| *u.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE test_image_admin_requests SET full_name = $2, email = $3, \
                 contact_number = $4, department = $5, qualification = $6, experience = $7, \
                 reason = $8, status = $9, reviewed_by = $10, reviewed_at = $11, \
                 updated_at = $12 WHERE id = $1 AND status = $13",
                &[
                    request.id.as_uuid(),
                    &request.full_name,
                    &request.email,
                    &request.contact_number,
                    &request.department,
                    &request.qualification,
                    &request.experience,
                    &request.reason,
                    &request.status.as_str(),
                    &reviewed_by,
                    &request.reviewed_at,
                    &request.updated_at,
                    &expected.as_str(),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn insert_doctor_note(&self, note: &DoctorNote) -> Result<()> {
        let created_by = note.created_by.map(|u| *u.as_uuid());
        self.client
            .execute(
                "INSERT INTO doctor_notes (id, doctor_id, note_type, content, created_by, \
                 created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    note.id.as_uuid(),
                    note.doctor_id.as_uuid(),
                    &note.note_type,
                    &note.content,
                    &created_by,
                    &note.created_at,
                    &note.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn list_doctor_notes(&self, doctor_id: DoctorId) -> Result<Vec<DoctorNote>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM doctor_notes WHERE doctor_id = $1 ORDER BY created_at",
                &[doctor_id.as_uuid()],
            )
            .await?;
        collect(rows, rows::doctor_note)
    }
}

#[async_trait]
impl CareStore for PostgreSQLAdapter {
    async fn insert_hospital(&self, hospital: &Hospital) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO hospitals (id, name, address, city, state, postal_code, phone, \
                 email, website, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    hospital.id.as_uuid(),
                    &hospital.name,
                    &hospital.address,
                    &hospital.city,
                    &hospital.state,
                    &hospital.postal_code,
                    &hospital.phone,
                    &hospital.email,
                    &hospital.website,
                    &hospital.created_at,
                    &hospital.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_hospital(&self, id: HospitalId) -> Result<Option<Hospital>> {
        let row = self
            .client
            .query_opt("SELECT * FROM hospitals WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::hospital)
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>> {
        let rows = self
            .client
            .query("SELECT * FROM hospitals ORDER BY name", &[])
            .await?;
        collect(rows, rows::hospital)
    }

    async fn update_hospital(&self, hospital: &Hospital) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE hospitals SET name = $2, address = $3, city = $4, state = $5, \
                 postal_code = $6, phone = $7, email = $8, website = $9, updated_at = $10 \
                 WHERE id = $1",
                &[
                    hospital.id.as_uuid(),
                    &hospital.name,
                    &hospital.address,
                    &hospital.city,
                    &hospital.state,
                    &hospital.postal_code,
                    &hospital.phone,
                    &hospital.email,
                    &hospital.website,
                    &hospital.updated_at,
                ],
            )
            .await?;
        expect_one(affected, "Hospital", hospital.id)
    }

    async fn delete_hospital(&self, id: HospitalId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM hospitals WHERE id = $1", &[id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn insert_department(&self, department: &Department) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO departments (id, name, description, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    department.id.as_uuid(),
                    &department.name,
                    &department.description,
                    &department.created_at,
                    &department.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
        let row = self
            .client
            .query_opt("SELECT * FROM departments WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::department)
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        let rows = self
            .client
            .query("SELECT * FROM departments ORDER BY name", &[])
            .await?;
        collect(rows, rows::department)
    }

    async fn update_department(&self, department: &Department) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE departments SET name = $2, description = $3, updated_at = $4 \
                 WHERE id = $1",
                &[
                    department.id.as_uuid(),
                    &department.name,
                    &department.description,
                    &department.updated_at,
                ],
            )
            .await?;
        expect_one(affected, "Department", department.id)
    }

    async fn delete_department(&self, id: DepartmentId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM departments WHERE id = $1", &[id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn link_department(
        &self,
        hospital_id: HospitalId,
        department_id: DepartmentId,
    ) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO hospital_departments (hospital_id, department_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
                &[hospital_id.as_uuid(), department_id.as_uuid()],
            )
            .await?;
        Ok(())
    }

    async fn list_hospital_departments(&self, hospital_id: HospitalId) -> Result<Vec<Department>> {
        let rows = self
            .client
            .query(
                "SELECT d.* FROM departments d \
                 JOIN hospital_departments hd ON hd.department_id = d.id \
                 WHERE hd.hospital_id = $1 ORDER BY d.name",
                &[hospital_id.as_uuid()],
            )
            .await?;
        collect(rows, rows::department)
    }

    async fn insert_patient(&self, patient: &Patient) -> Result<()> {
        let user_id = patient.user_id.map(|u| *u.as_uuid());
        self.client
            .execute(
                INSERT_PATIENT,
                &[
                    patient.id.as_uuid(),
                    &user_id,
                    &patient.full_name,
                    &patient.date_of_birth,
                    &patient.gender.as_str(),
                    &patient.contact_number,
                    &patient.address,
                    &patient.emergency_contact_name,
                    &patient.emergency_contact_number,
                    &patient.created_at,
                    &patient.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        let row = self
            .client
            .query_opt("SELECT * FROM patients WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::patient)
    }

    async fn find_patient_by_user(&self, user_id: UserId) -> Result<Option<Patient>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM patients WHERE user_id = $1",
                &[user_id.as_uuid()],
            )
            .await?;
        first(row, rows::patient)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let rows = self
            .client
            .query("SELECT * FROM patients ORDER BY full_name, id", &[])
            .await?;
        collect(rows, rows::patient)
    }

    async fn update_patient(&self, patient: &Patient) -> Result<()> {
        let user_id = patient.user_id.map(|u| *u.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE patients SET user_id = $2, full_name = $3, date_of_birth = $4, \
                 gender = $5, contact_number = $6, address = $7, emergency_contact_name = $8, \
                 emergency_contact_number = $9, updated_at = $10 WHERE id = $1",
                &[
                    patient.id.as_uuid(),
                    &user_id,
                    &patient.full_name,
                    &patient.date_of_birth,
                    &patient.gender.as_str(),
                    &patient.contact_number,
                    &patient.address,
                    &patient.emergency_contact_name,
                    &patient.emergency_contact_number,
                    &patient.updated_at,
                ],
            )
            .await?;
        expect_one(affected, "Patient", patient.id)
    }

    async fn delete_patient(&self, id: PatientId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM patients WHERE id = $1", &[id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<()> {
        let user_id = doctor.user_id.map(|u| *u.as_uuid());
        let hospital_id = doctor.hospital_id.map(|h| *h.as_uuid());
        let department_id = doctor.department_id.map(|d| *d.as_uuid());
        self.client
            .execute(
                INSERT_DOCTOR,
                &[
                    doctor.id.as_uuid(),
                    &user_id,
                    &doctor.full_name,
                    &doctor.specialization,
                    &doctor.credentials,
                    &doctor.contact_number,
                    &hospital_id,
                    &department_id,
                    &doctor.created_at,
                    &doctor.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        let row = self
            .client
            .query_opt("SELECT * FROM doctors WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::doctor)
    }

    async fn find_doctor_by_user(&self, user_id: UserId) -> Result<Option<Doctor>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM doctors WHERE user_id = $1",
                &[user_id.as_uuid()],
            )
            .await?;
        first(row, rows::doctor)
    }

    async fn list_doctors(&self, filter: DoctorFilter) -> Result<Vec<Doctor>> {
        let hospital = filter.hospital_id.map(|h| *h.as_uuid());
        let department = filter.department_id.map(|d| *d.as_uuid());
        let rows = self
            .client
            .query(
                "SELECT * FROM doctors \
                 WHERE ($1::uuid IS NULL OR hospital_id = $1) \
                 AND ($2::uuid IS NULL OR department_id = $2) \
                 ORDER BY full_name",
                &[&hospital, &department],
            )
            .await?;
        collect(rows, rows::doctor)
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<()> {
        let user_id = doctor.user_id.map(|u| *u.as_uuid());
        let hospital_id = doctor.hospital_id.map(|h| *h.as_uuid());
        let department_id = doctor.department_id.map(|d| *d.as_uuid());
        let affected = self
            .client
            .execute(
                "UPDATE doctors SET user_id = $2, full_name = $3, specialization = $4, \
                 credentials = $5, contact_number = $6, hospital_id = $7, department_id = $8, \
                 updated_at = $9 WHERE id = $1",
                &[
                    doctor.id.as_uuid(),
                    &user_id,
                    &doctor.full_name,
                    &doctor.specialization,
                    &doctor.credentials,
                    &doctor.contact_number,
                    &hospital_id,
                    &department_id,
                    &doctor.updated_at,
                ],
            )
            .await?;
        expect_one(affected, "Doctor", doctor.id)
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM doctors WHERE id = $1", &[id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<()> {
        let day = i16::from(slot.day_of_week);
        let duration = i32::try_from(slot.slot_duration_minutes).map_err(|_| {
            ShasthoError::invalid_field("slot_duration_minutes", "Slot duration is too large")
        })?;
        self.client
            .execute(
                "INSERT INTO doctor_availability_slots (id, doctor_id, day_of_week, start_time, \
                 end_time, is_available, slot_duration_minutes, valid_from, valid_until, \
                 created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    slot.id.as_uuid(),
                    slot.doctor_id.as_uuid(),
                    &day,
                    &slot.start_time,
                    &slot.end_time,
                    &slot.is_available,
                    &duration,
                    &slot.valid_from,
                    &slot.valid_until,
                    &slot.created_at,
                    &slot.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn list_slots(&self, doctor_id: DoctorId) -> Result<Vec<AvailabilitySlot>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM doctor_availability_slots WHERE doctor_id = $1 \
                 ORDER BY day_of_week, start_time",
                &[doctor_id.as_uuid()],
            )
            .await?;
        collect(rows, rows::slot)
    }

    async fn delete_slot(&self, id: SlotId) -> Result<bool> {
        let affected = self
            .client
            .execute(
                "DELETE FROM doctor_availability_slots WHERE id = $1",
                &[id.as_uuid()],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn book_appointment(&self, appointment: &Appointment) -> Result<()> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_pg_error(e, "Failed to start transaction"))?;

        // Serializes bookings per doctor until commit
        let lock_key = appointment.doctor_id.to_string();
        tx.execute("SELECT pg_advisory_xact_lock(hashtext($1))", &[&lock_key])
            .await
            .map_err(|e| map_pg_error(e, "Failed to lock doctor schedule"))?;

        let clash = tx
            .query_opt(
                "SELECT id FROM appointments \
                 WHERE doctor_id = $1 AND date = $2 AND status = $3 \
                 AND slot_start < $5 AND $4 < slot_end LIMIT 1",
                &[
                    appointment.doctor_id.as_uuid(),
                    &appointment.date,
                    &AppointmentStatus::Scheduled.as_str(),
                    &appointment.time_slot.start,
                    &appointment.time_slot.end,
                ],
            )
            .await
            .map_err(|e| map_pg_error(e, "Failed to check slot availability"))?;
        if clash.is_some() {
            return Err(ShasthoError::Conflict(
                "This time slot is no longer available".to_string(),
            ));
        }

        tx.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, hospital_id, department_id, \
             date, slot_start, slot_end, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            &[
                appointment.id.as_uuid(),
                appointment.patient_id.as_uuid(),
                appointment.doctor_id.as_uuid(),
                appointment.hospital_id.as_uuid(),
                appointment.department_id.as_uuid(),
                &appointment.date,
                &appointment.time_slot.start,
                &appointment.time_slot.end,
                &appointment.status.as_str(),
                &appointment.created_at,
                &appointment.updated_at,
            ],
        )
        .await
        .map_err(|e| map_pg_error(e, "Failed to insert appointment"))?;

        tx.commit()
            .await
            .map_err(|e| map_pg_error(e, "Failed to commit appointment"))
    }

    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        let row = self
            .client
            .query_opt("SELECT * FROM appointments WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::appointment)
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
        let affected = self
            .client
            .execute(
                "UPDATE appointments SET date = $2, slot_start = $3, slot_end = $4, \
                 status = $5, updated_at = $6 WHERE id = $1",
                &[
                    appointment.id.as_uuid(),
                    &appointment.date,
                    &appointment.time_slot.start,
                    &appointment.time_slot.end,
                    &appointment.status.as_str(),
                    &appointment.updated_at,
                ],
            )
            .await?;
        expect_one(affected, "Appointment", appointment.id)
    }

    async fn list_patient_appointments(&self, patient_id: PatientId) -> Result<Vec<Appointment>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM appointments WHERE patient_id = $1 ORDER BY date, slot_start",
                &[patient_id.as_uuid()],
            )
            .await?;
        collect(rows, rows::appointment)
    }

    async fn list_doctor_appointments(
        &self,
        doctor_id: DoctorId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>> {
        let rows = self
            .client
            .query(
                "SELECT * FROM appointments \
                 WHERE doctor_id = $1 AND ($2::date IS NULL OR date = $2) \
                 ORDER BY date, slot_start",
                &[doctor_id.as_uuid(), &date],
            )
            .await?;
        collect(rows, rows::appointment)
    }
}

#[async_trait]
impl RecordStore for PostgreSQLAdapter {
    async fn insert_ehr(&self, ehr: &Ehr) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO ehr (id, patient_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4)",
                &[
                    ehr.id.as_uuid(),
                    ehr.patient_id.as_uuid(),
                    &ehr.created_at,
                    &ehr.updated_at,
                ],
            )
            .await
            .map_err(|e| match e {
                ShasthoError::Conflict(_) => ShasthoError::Conflict(format!(
                    "Patient {} already has an EHR",
                    ehr.patient_id
                )),
                other => other,
            })?;
        Ok(())
    }

    async fn get_ehr(&self, id: EhrId) -> Result<Option<Ehr>> {
        let row = self
            .client
            .query_opt("SELECT * FROM ehr WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::ehr)
    }

    async fn find_ehr_by_patient(&self, patient_id: PatientId) -> Result<Option<Ehr>> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM ehr WHERE patient_id = $1",
                &[patient_id.as_uuid()],
            )
            .await?;
        first(row, rows::ehr)
    }

    async fn insert_visit(&self, visit: &Visit) -> Result<()> {
        let provider_id = visit.provider_id.map(|d| *d.as_uuid());
        self.client
            .execute(
                "INSERT INTO ehr_visits (id, ehr_id, date, time, visit_type, provider_id, \
                 chief_complaint, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    visit.id.as_uuid(),
                    visit.ehr_id.as_uuid(),
                    &visit.date,
                    &visit.time,
                    &visit.visit_type,
                    &provider_id,
                    &visit.chief_complaint,
                    &visit.created_at,
                    &visit.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_visit(&self, id: VisitId) -> Result<Option<Visit>> {
        let row = self
            .client
            .query_opt("SELECT * FROM ehr_visits WHERE id = $1", &[id.as_uuid()])
            .await?;
        first(row, rows::visit)
    }

    async fn list_visits(&self, ehr_id: EhrId, query: VisitQuery) -> Result<Vec<Visit>> {
        let direction = if query.newest_first { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT * FROM ehr_visits WHERE ehr_id = $1 \
             ORDER BY date {direction}, time {direction}, id {direction} LIMIT $2 OFFSET $3"
        );
        let limit = row_bound(query.limit);
        let offset = row_bound(query.offset);
        let rows = self
            .client
            .query(&sql, &[ehr_id.as_uuid(), &limit, &offset])
            .await?;
        collect(rows, rows::visit)
    }

    async fn delete_visit(&self, id: VisitId) -> Result<bool> {
        let affected = self
            .client
            .execute("DELETE FROM ehr_visits WHERE id = $1", &[id.as_uuid()])
            .await?;
        Ok(affected > 0)
    }

    async fn insert_record(&self, record: &ClinicalRecord) -> Result<()> {
        let kind = record.kind();
        let (columns, values): (Vec<&str>, Vec<SqlValue>) =
            rows::clinical_record_columns(record).into_iter().unzip();
        let sql = rows::insert_sql(kind.table(), &columns);
        self.client
            .execute(&sql, &as_params(&values))
            .await
            .map_err(|e| match e {
                ShasthoError::NotFound(_) => {
                    ShasthoError::NotFound(format!("Parent of {kind} record not found"))
                }
                other => other,
            })?;
        Ok(())
    }

    async fn get_record(&self, kind: RecordKind, id: RecordId) -> Result<Option<ClinicalRecord>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", kind.table());
        let row = self.client.query_opt(&sql, &[id.as_uuid()]).await?;
        row.as_ref()
            .map(|r| rows::clinical_record(kind, r))
            .transpose()
    }

    async fn update_record(&self, record: &ClinicalRecord) -> Result<bool> {
        let kind = record.kind();
        let (columns, mut values): (Vec<&str>, Vec<SqlValue>) = rows::clinical_record_columns(record)
            .into_iter()
            .filter(|(col, _)| *col != "id" && *col != "created_at")
            .unzip();
        values.push(Box::new(*record.id().as_uuid()));
        let sql = rows::update_sql(kind.table(), &columns);
        let affected = self
            .client
            .execute(&sql, &as_params(&values))
            .await
            .map_err(|e| match e {
                ShasthoError::NotFound(_) => {
                    ShasthoError::NotFound(format!("Parent of {kind} record not found"))
                }
                other => other,
            })?;
        Ok(affected > 0)
    }

    async fn delete_record(&self, kind: RecordKind, id: RecordId) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let affected = self.client.execute(&sql, &[id.as_uuid()]).await?;
        Ok(affected > 0)
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        parent: RecordParent,
    ) -> Result<Vec<ClinicalRecord>> {
        let parent_id: Uuid = match parent {
            RecordParent::Visit(id) => *id.as_uuid(),
            RecordParent::Ehr(id) => *id.as_uuid(),
        };
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY created_at",
            kind.table(),
            rows::parent_column(kind)
        );
        let rows = self.client.query(&sql, &[&parent_id]).await?;
        rows.iter()
            .map(|r| rows::clinical_record(kind, r))
            .collect()
    }
}

#[async_trait]
impl DatabaseClient for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_bound_saturates_instead_of_wrapping() {
        assert_eq!(row_bound(0), 0);
        assert_eq!(row_bound(25), 25);
        assert_eq!(row_bound(usize::MAX), i64::MAX);
    }
}
