//! Storage traits
//!
//! The services talk to storage exclusively through these traits. Each backend
//! (PostgreSQL, in-memory) implements all three repositories plus the
//! [`DatabaseClient`] umbrella, and must apply the same delete rules: removing
//! a parent row removes its owned children and nulls out optional references.

use crate::domain::{
    AdminRequestId, AdminRequestStatus, Appointment, AppointmentId, AvailabilitySlot,
    ClinicalRecord, Department, DepartmentId, Doctor, DoctorId, DoctorNote, Ehr, EhrId, Hospital,
    HospitalAdmin, HospitalId, PasswordResetToken, Patient, PatientId, RecordId, RecordKind,
    RecordParent, Result, RoleProfile, SessionId, SlotId, TestAdmin, TestImageAdminRequest, User, UserId,
    UserRole, UserSession, UserStatus, Visit, VisitId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Ordering and window for visit listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitQuery {
    pub limit: usize,
    pub offset: usize,
    pub newest_first: bool,
}

impl Default for VisitQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            newest_first: true,
        }
    }
}

/// Optional filters for doctor listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    pub hospital_id: Option<HospitalId>,
    pub department_id: Option<DepartmentId>,
}

/// Login accounts, sessions, role profiles and the admin workflow tables
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken
    async fn insert_user(&self, user: &User) -> Result<()>;
    /// Stores the account and its role profile together or not at all
    async fn insert_user_with_profile(&self, user: &User, profile: &RoleProfile) -> Result<()>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn update_user(&self, user: &User) -> Result<()>;
    async fn list_users(&self, role: UserRole, status: UserStatus) -> Result<Vec<User>>;

    async fn insert_session(&self, session: &UserSession) -> Result<()>;
    async fn find_session_by_token_hash(&self, token_hash: &str) -> Result<Option<UserSession>>;
    async fn list_sessions(&self, user_id: UserId) -> Result<Vec<UserSession>>;
    /// Marks a live session as ended; returns false if it was unknown or already ended
    async fn end_session(&self, id: SessionId, at: DateTime<Utc>) -> Result<bool>;

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> Result<()>;
    async fn find_reset_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>>;
    /// Burns a token that is unused and unexpired at `at`; false when none was
    async fn mark_reset_token_used(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool>;

    async fn insert_hospital_admin(&self, admin: &HospitalAdmin) -> Result<()>;
    async fn find_hospital_admin_by_user(&self, user_id: UserId) -> Result<Option<HospitalAdmin>>;

    async fn insert_test_admin(&self, admin: &TestAdmin) -> Result<()>;
    async fn find_test_admin_by_user(&self, user_id: UserId) -> Result<Option<TestAdmin>>;
    async fn list_test_admins(&self, hospital_id: HospitalId) -> Result<Vec<TestAdmin>>;

    async fn insert_admin_request(&self, request: &TestImageAdminRequest) -> Result<()>;
    async fn get_admin_request(&self, id: AdminRequestId)
        -> Result<Option<TestImageAdminRequest>>;
    async fn list_admin_requests(
        &self,
        hospital_id: Option<HospitalId>,
        status: Option<AdminRequestStatus>,
    ) -> Result<Vec<TestImageAdminRequest>>;
    /// Writes the request only while its stored status is still `expected`
    async fn update_admin_request(
        &self,
        request: &TestImageAdminRequest,
        expected: AdminRequestStatus,
    ) -> Result<bool>;

    async fn insert_doctor_note(&self, note: &DoctorNote) -> Result<()>;
    async fn list_doctor_notes(&self, doctor_id: DoctorId) -> Result<Vec<DoctorNote>>;
}

/// Hospitals, departments, patients, doctors and scheduling
#[async_trait]
pub trait CareStore: Send + Sync {
    async fn insert_hospital(&self, hospital: &Hospital) -> Result<()>;
    async fn get_hospital(&self, id: HospitalId) -> Result<Option<Hospital>>;
    async fn list_hospitals(&self) -> Result<Vec<Hospital>>;
    async fn update_hospital(&self, hospital: &Hospital) -> Result<()>;
    async fn delete_hospital(&self, id: HospitalId) -> Result<bool>;

    async fn insert_department(&self, department: &Department) -> Result<()>;
    async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>>;
    async fn list_departments(&self) -> Result<Vec<Department>>;
    async fn update_department(&self, department: &Department) -> Result<()>;
    async fn delete_department(&self, id: DepartmentId) -> Result<bool>;
    /// Idempotent
    async fn link_department(&self, hospital_id: HospitalId, department_id: DepartmentId)
        -> Result<()>;
    async fn list_hospital_departments(&self, hospital_id: HospitalId) -> Result<Vec<Department>>;

    async fn insert_patient(&self, patient: &Patient) -> Result<()>;
    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>>;
    async fn find_patient_by_user(&self, user_id: UserId) -> Result<Option<Patient>>;
    async fn list_patients(&self) -> Result<Vec<Patient>>;
    async fn update_patient(&self, patient: &Patient) -> Result<()>;
    /// Removes the patient together with their EHR tree and appointments
    async fn delete_patient(&self, id: PatientId) -> Result<bool>;

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<()>;
    async fn get_doctor(&self, id: DoctorId) -> Result<Option<Doctor>>;
    async fn find_doctor_by_user(&self, user_id: UserId) -> Result<Option<Doctor>>;
    async fn list_doctors(&self, filter: DoctorFilter) -> Result<Vec<Doctor>>;
    async fn update_doctor(&self, doctor: &Doctor) -> Result<()>;
    async fn delete_doctor(&self, id: DoctorId) -> Result<bool>;

    async fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<()>;
    async fn list_slots(&self, doctor_id: DoctorId) -> Result<Vec<AvailabilitySlot>>;
    async fn delete_slot(&self, id: SlotId) -> Result<bool>;

    /// Inserts a scheduled appointment unless it overlaps another scheduled
    /// appointment of the same doctor on the same date (`Conflict`)
    async fn book_appointment(&self, appointment: &Appointment) -> Result<()>;
    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>>;
    async fn update_appointment(&self, appointment: &Appointment) -> Result<()>;
    async fn list_patient_appointments(&self, patient_id: PatientId) -> Result<Vec<Appointment>>;
    async fn list_doctor_appointments(
        &self,
        doctor_id: DoctorId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>>;
}

/// Electronic health records, visits and clinical records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fails with `Conflict` when the patient already has an EHR
    async fn insert_ehr(&self, ehr: &Ehr) -> Result<()>;
    async fn get_ehr(&self, id: EhrId) -> Result<Option<Ehr>>;
    async fn find_ehr_by_patient(&self, patient_id: PatientId) -> Result<Option<Ehr>>;

    async fn insert_visit(&self, visit: &Visit) -> Result<()>;
    async fn get_visit(&self, id: VisitId) -> Result<Option<Visit>>;
    async fn list_visits(&self, ehr_id: EhrId, query: VisitQuery) -> Result<Vec<Visit>>;
    async fn delete_visit(&self, id: VisitId) -> Result<bool>;

    async fn insert_record(&self, record: &ClinicalRecord) -> Result<()>;
    async fn get_record(&self, kind: RecordKind, id: RecordId) -> Result<Option<ClinicalRecord>>;
    /// Returns false when no record with that id exists
    async fn update_record(&self, record: &ClinicalRecord) -> Result<bool>;
    async fn delete_record(&self, kind: RecordKind, id: RecordId) -> Result<bool>;
    /// Records of `kind` under `parent`, oldest first
    async fn list_records(&self, kind: RecordKind, parent: RecordParent)
        -> Result<Vec<ClinicalRecord>>;
}

/// A complete storage backend
#[async_trait]
pub trait DatabaseClient: AccountStore + CareStore + RecordStore {
    /// Round-trips a trivial query
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// Creates every table and index if missing
    async fn ensure_schema(&self) -> Result<()>;

    /// Short backend label for logs and CLI output
    fn backend_name(&self) -> &'static str;
}
