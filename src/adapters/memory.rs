//! In-memory storage backend
//!
//! Every table is a `HashMap` behind one `tokio::sync::RwLock`. Writes that
//! touch several tables (cascading deletes, conflict-checked bookings) run under
//! a single write guard, so readers never observe a half-applied change.

use crate::adapters::database::traits::{
    AccountStore, CareStore, DatabaseClient, DoctorFilter, RecordStore, VisitQuery,
};
use crate::domain::{
    AdminRequestId, AdminRequestStatus, Appointment, AppointmentId, AppointmentStatus,
    AvailabilitySlot, ClinicalRecord, Department, DepartmentId, Doctor, DoctorId, DoctorNote,
    DoctorNoteId, Ehr, EhrId, Hospital, HospitalAdmin, HospitalAdminId, HospitalId,
    PasswordResetToken, Patient, PatientId, RecordId, RecordKind, RecordParent, ResetTokenId,
    Result, RoleProfile, SessionId, ShasthoError, SlotId, TestAdmin, TestAdminId, TestImageAdminRequest, User,
    UserId, UserRole, UserSession, UserStatus, Visit, VisitId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, UserSession>,
    reset_tokens: HashMap<ResetTokenId, PasswordResetToken>,
    hospital_admins: HashMap<HospitalAdminId, HospitalAdmin>,
    test_admins: HashMap<TestAdminId, TestAdmin>,
    admin_requests: HashMap<AdminRequestId, TestImageAdminRequest>,
    doctor_notes: HashMap<DoctorNoteId, DoctorNote>,
    hospitals: HashMap<HospitalId, Hospital>,
    departments: HashMap<DepartmentId, Department>,
    hospital_departments: BTreeSet<(HospitalId, DepartmentId)>,
    patients: HashMap<PatientId, Patient>,
    doctors: HashMap<DoctorId, Doctor>,
    slots: HashMap<SlotId, AvailabilitySlot>,
    appointments: HashMap<AppointmentId, Appointment>,
    ehrs: HashMap<EhrId, Ehr>,
    visits: HashMap<VisitId, Visit>,
    records: HashMap<RecordId, ClinicalRecord>,
}

impl Tables {
    fn remove_visit_tree(&mut self, visit_id: VisitId) {
        self.visits.remove(&visit_id);
        self.records
            .retain(|_, r| r.parent() != RecordParent::Visit(visit_id));
    }

    fn remove_ehr_tree(&mut self, ehr_id: EhrId) {
        self.ehrs.remove(&ehr_id);
        let visit_ids: Vec<VisitId> = self
            .visits
            .values()
            .filter(|v| v.ehr_id == ehr_id)
            .map(|v| v.id)
            .collect();
        for visit_id in visit_ids {
            self.remove_visit_tree(visit_id);
        }
        self.records.retain(|_, r| r.parent() != RecordParent::Ehr(ehr_id));
    }

    /// Author columns referencing a removed doctor become NULL
    fn clear_doctor_references(&mut self, doctor_id: DoctorId) {
        let clear = |slot: &mut Option<DoctorId>| {
            if *slot == Some(doctor_id) {
                *slot = None;
            }
        };
        for visit in self.visits.values_mut() {
            clear(&mut visit.provider_id);
        }
        for record in self.records.values_mut() {
            match record {
                ClinicalRecord::Diagnosis(r) => clear(&mut r.diagnosed_by),
                ClinicalRecord::Medication(r) => clear(&mut r.prescribed_by),
                ClinicalRecord::Procedure(r) => clear(&mut r.performed_by),
                ClinicalRecord::Vital(r) => clear(&mut r.recorded_by),
                ClinicalRecord::ProviderNote(r) => clear(&mut r.created_by),
                ClinicalRecord::Prescription(r) => clear(&mut r.prescribed_by),
                ClinicalRecord::Allergy(r) => clear(&mut r.noted_by),
                ClinicalRecord::Immunization(r) => clear(&mut r.administered_by),
                ClinicalRecord::TestResult(_) => {}
            }
        }
    }

    fn parent_exists(&self, parent: RecordParent) -> bool {
        match parent {
            RecordParent::Visit(id) => self.visits.contains_key(&id),
            RecordParent::Ehr(id) => self.ehrs.contains_key(&id),
        }
    }
}

/// Process-local [`DatabaseClient`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(what: &str, id: impl std::fmt::Display) -> ShasthoError {
    ShasthoError::NotFound(format!("{what} {id} not found"))
}

fn sorted_by_created<T, F>(mut items: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| created(item));
    items
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(ShasthoError::Conflict(format!(
                "Username '{}' is already registered",
                user.username
            )));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_user_with_profile(&self, user: &User, profile: &RoleProfile) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(ShasthoError::Conflict(format!(
                "Username '{}' is already registered",
                user.username
            )));
        }
        match profile {
            RoleProfile::Doctor(doctor) => {
                if let Some(h) = doctor.hospital_id.filter(|h| !t.hospitals.contains_key(h)) {
                    return Err(missing("Hospital", h));
                }
                if let Some(d) = doctor.department_id.filter(|d| !t.departments.contains_key(d)) {
                    return Err(missing("Department", d));
                }
            }
            RoleProfile::HospitalAdmin(HospitalAdmin { hospital_id, .. })
            | RoleProfile::TestAdmin(TestAdmin { hospital_id, .. }) => {
                if !t.hospitals.contains_key(hospital_id) {
                    return Err(missing("Hospital", hospital_id));
                }
            }
            RoleProfile::Patient(_) | RoleProfile::None => {}
        }

        t.users.insert(user.id, user.clone());
        match profile {
            RoleProfile::Patient(p) => {
                t.patients.insert(p.id, p.clone());
            }
            RoleProfile::Doctor(d) => {
                t.doctors.insert(d.id, d.clone());
            }
            RoleProfile::HospitalAdmin(a) => {
                t.hospital_admins.insert(a.id, a.clone());
            }
            RoleProfile::TestAdmin(a) => {
                t.test_admins.insert(a.id, a.clone());
            }
            RoleProfile::None => {}
        }
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(missing("User", user.id)),
        }
    }

    async fn list_users(&self, role: UserRole, status: UserStatus) -> Result<Vec<User>> {
        let t = self.tables.read().await;
        let users = t
            .users
            .values()
            .filter(|u| u.role == role && u.status == status)
            .cloned()
            .collect();
        Ok(sorted_by_created(users, |u: &User| u.created_at))
    }

    async fn insert_session(&self, session: &UserSession) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&session.user_id) {
            return Err(missing("User", session.user_id));
        }
        t.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> Result<Option<UserSession>> {
        let t = self.tables.read().await;
        Ok(t
            .sessions
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn list_sessions(&self, user_id: UserId) -> Result<Vec<UserSession>> {
        let t = self.tables.read().await;
        let sessions = t
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(sessions, |s: &UserSession| s.created_at))
    }

    async fn end_session(&self, id: SessionId, at: DateTime<Utc>) -> Result<bool> {
        let mut t = self.tables.write().await;
        match t.sessions.get_mut(&id) {
            Some(session) if session.ended_at.is_none() => {
                session.ended_at = Some(at);
                session.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&token.user_id) {
            return Err(missing("User", token.user_id));
        }
        t.reset_tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_reset_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>> {
        let t = self.tables.read().await;
        Ok(t
            .reset_tokens
            .values()
            .find(|r| r.token_hash == token_hash)
            .cloned())
    }

    async fn mark_reset_token_used(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut t = self.tables.write().await;
        let live = t
            .reset_tokens
            .values_mut()
            .find(|r| r.token_hash == token_hash && r.is_valid_at(at));
        Ok(match live {
            Some(token) => {
                token.used = true;
                token.updated_at = at;
                true
            }
            None => false,
        })
    }

    async fn insert_hospital_admin(&self, admin: &HospitalAdmin) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.hospitals.contains_key(&admin.hospital_id) {
            return Err(missing("Hospital", admin.hospital_id));
        }
        t.hospital_admins.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn find_hospital_admin_by_user(&self, user_id: UserId) -> Result<Option<HospitalAdmin>> {
        let t = self.tables.read().await;
        Ok(t
            .hospital_admins
            .values()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn insert_test_admin(&self, admin: &TestAdmin) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.hospitals.contains_key(&admin.hospital_id) {
            return Err(missing("Hospital", admin.hospital_id));
        }
        t.test_admins.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn find_test_admin_by_user(&self, user_id: UserId) -> Result<Option<TestAdmin>> {
        let t = self.tables.read().await;
        Ok(t.test_admins.values().find(|a| a.user_id == user_id).cloned())
    }

    async fn list_test_admins(&self, hospital_id: HospitalId) -> Result<Vec<TestAdmin>> {
        let t = self.tables.read().await;
        let admins = t
            .test_admins
            .values()
            .filter(|a| a.hospital_id == hospital_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(admins, |a: &TestAdmin| a.created_at))
    }

    async fn insert_admin_request(&self, request: &TestImageAdminRequest) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.hospitals.contains_key(&request.hospital_id) {
            return Err(missing("Hospital", request.hospital_id));
        }
        t.admin_requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get_admin_request(
        &self,
        id: AdminRequestId,
    ) -> Result<Option<TestImageAdminRequest>> {
        Ok(self.tables.read().await.admin_requests.get(&id).cloned())
    }

    async fn list_admin_requests(
        &self,
        hospital_id: Option<HospitalId>,
        status: Option<AdminRequestStatus>,
    ) -> Result<Vec<TestImageAdminRequest>> {
        let t = self.tables.read().await;
        let mut requests: Vec<TestImageAdminRequest> = t
            .admin_requests
            .values()
            .filter(|r| hospital_id.map_or(true, |h| r.hospital_id == h))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn update_admin_request(
        &self,
        request: &TestImageAdminRequest,
        expected: AdminRequestStatus,
    ) -> Result<bool> {
        let mut t = self.tables.write().await;
        match t.admin_requests.get_mut(&request.id) {
            Some(existing) if existing.status == expected => {
                *existing = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_doctor_note(&self, note: &DoctorNote) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.doctors.contains_key(&note.doctor_id) {
            return Err(missing("Doctor", note.doctor_id));
        }
        t.doctor_notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn list_doctor_notes(&self, doctor_id: DoctorId) -> Result<Vec<DoctorNote>> {
        let t = self.tables.read().await;
        let notes = t
            .doctor_notes
            .values()
            .filter(|n| n.doctor_id == doctor_id)
            .cloned()
            .collect();
        Ok(sorted_by_created(notes, |n: &DoctorNote| n.created_at))
    }
}

#[async_trait]
impl CareStore for MemoryStore {
    async fn insert_hospital(&self, hospital: &Hospital) -> Result<()> {
        self.tables
            .write()
            .await
            .hospitals
            .insert(hospital.id, hospital.clone());
        Ok(())
    }

    async fn get_hospital(&self, id: HospitalId) -> Result<Option<Hospital>> {
        Ok(self.tables.read().await.hospitals.get(&id).cloned())
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>> {
        let t = self.tables.read().await;
        let mut hospitals: Vec<Hospital> = t.hospitals.values().cloned().collect();
        hospitals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hospitals)
    }

    async fn update_hospital(&self, hospital: &Hospital) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.hospitals.get_mut(&hospital.id) {
            Some(existing) => {
                *existing = hospital.clone();
                Ok(())
            }
            None => Err(missing("Hospital", hospital.id)),
        }
    }

    async fn delete_hospital(&self, id: HospitalId) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.hospitals.remove(&id).is_none() {
            return Ok(false);
        }
        t.hospital_departments.retain(|(h, _)| *h != id);
        t.hospital_admins.retain(|_, a| a.hospital_id != id);
        t.test_admins.retain(|_, a| a.hospital_id != id);
        t.admin_requests.retain(|_, r| r.hospital_id != id);
        for doctor in t.doctors.values_mut() {
            if doctor.hospital_id == Some(id) {
                doctor.hospital_id = None;
            }
        }
        t.appointments.retain(|_, a| a.hospital_id != id);
        Ok(true)
    }

    async fn insert_department(&self, department: &Department) -> Result<()> {
        self.tables
            .write()
            .await
            .departments
            .insert(department.id, department.clone());
        Ok(())
    }

    async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        let t = self.tables.read().await;
        let mut departments: Vec<Department> = t.departments.values().cloned().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn update_department(&self, department: &Department) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.departments.get_mut(&department.id) {
            Some(existing) => {
                *existing = department.clone();
                Ok(())
            }
            None => Err(missing("Department", department.id)),
        }
    }

    async fn delete_department(&self, id: DepartmentId) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.departments.remove(&id).is_none() {
            return Ok(false);
        }
        t.hospital_departments.retain(|(_, d)| *d != id);
        for doctor in t.doctors.values_mut() {
            if doctor.department_id == Some(id) {
                doctor.department_id = None;
            }
        }
        t.appointments.retain(|_, a| a.department_id != id);
        Ok(true)
    }

    async fn link_department(
        &self,
        hospital_id: HospitalId,
        department_id: DepartmentId,
    ) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.hospitals.contains_key(&hospital_id) {
            return Err(missing("Hospital", hospital_id));
        }
        if !t.departments.contains_key(&department_id) {
            return Err(missing("Department", department_id));
        }
        t.hospital_departments.insert((hospital_id, department_id));
        Ok(())
    }

    async fn list_hospital_departments(&self, hospital_id: HospitalId) -> Result<Vec<Department>> {
        let t = self.tables.read().await;
        let mut departments: Vec<Department> = t
            .hospital_departments
            .iter()
            .filter(|(h, _)| *h == hospital_id)
            .filter_map(|(_, d)| t.departments.get(d).cloned())
            .collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn insert_patient(&self, patient: &Patient) -> Result<()> {
        self.tables
            .write()
            .await
            .patients
            .insert(patient.id, patient.clone());
        Ok(())
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn find_patient_by_user(&self, user_id: UserId) -> Result<Option<Patient>> {
        let t = self.tables.read().await;
        Ok(t
            .patients
            .values()
            .find(|p| p.user_id == Some(user_id))
            .cloned())
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let t = self.tables.read().await;
        let mut patients: Vec<Patient> = t.patients.values().cloned().collect();
        patients.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(patients)
    }

    async fn update_patient(&self, patient: &Patient) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.patients.get_mut(&patient.id) {
            Some(existing) => {
                *existing = patient.clone();
                Ok(())
            }
            None => Err(missing("Patient", patient.id)),
        }
    }

    async fn delete_patient(&self, id: PatientId) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.patients.remove(&id).is_none() {
            return Ok(false);
        }
        let ehr_ids: Vec<EhrId> = t
            .ehrs
            .values()
            .filter(|e| e.patient_id == id)
            .map(|e| e.id)
            .collect();
        for ehr_id in ehr_ids {
            t.remove_ehr_tree(ehr_id);
        }
        t.appointments.retain(|_, a| a.patient_id != id);
        Ok(true)
    }

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<()> {
        self.tables
            .write()
            .await
            .doctors
            .insert(doctor.id, doctor.clone());
        Ok(())
    }

    async fn get_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        Ok(self.tables.read().await.doctors.get(&id).cloned())
    }

    async fn find_doctor_by_user(&self, user_id: UserId) -> Result<Option<Doctor>> {
        let t = self.tables.read().await;
        Ok(t
            .doctors
            .values()
            .find(|d| d.user_id == Some(user_id))
            .cloned())
    }

    async fn list_doctors(&self, filter: DoctorFilter) -> Result<Vec<Doctor>> {
        let t = self.tables.read().await;
        let mut doctors: Vec<Doctor> = t
            .doctors
            .values()
            .filter(|d| filter.hospital_id.map_or(true, |h| d.hospital_id == Some(h)))
            .filter(|d| {
                filter
                    .department_id
                    .map_or(true, |dep| d.department_id == Some(dep))
            })
            .cloned()
            .collect();
        doctors.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(doctors)
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.doctors.get_mut(&doctor.id) {
            Some(existing) => {
                *existing = doctor.clone();
                Ok(())
            }
            None => Err(missing("Doctor", doctor.id)),
        }
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.doctors.remove(&id).is_none() {
            return Ok(false);
        }
        t.slots.retain(|_, s| s.doctor_id != id);
        t.doctor_notes.retain(|_, n| n.doctor_id != id);
        t.appointments.retain(|_, a| a.doctor_id != id);
        t.clear_doctor_references(id);
        Ok(true)
    }

    async fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.doctors.contains_key(&slot.doctor_id) {
            return Err(missing("Doctor", slot.doctor_id));
        }
        t.slots.insert(slot.id, slot.clone());
        Ok(())
    }

    async fn list_slots(&self, doctor_id: DoctorId) -> Result<Vec<AvailabilitySlot>> {
        let t = self.tables.read().await;
        let mut slots: Vec<AvailabilitySlot> = t
            .slots
            .values()
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.day_of_week, s.start_time));
        Ok(slots)
    }

    async fn delete_slot(&self, id: SlotId) -> Result<bool> {
        Ok(self.tables.write().await.slots.remove(&id).is_some())
    }

    async fn book_appointment(&self, appointment: &Appointment) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.patients.contains_key(&appointment.patient_id) {
            return Err(missing("Patient", appointment.patient_id));
        }
        if !t.doctors.contains_key(&appointment.doctor_id) {
            return Err(missing("Doctor", appointment.doctor_id));
        }
        if !t.hospitals.contains_key(&appointment.hospital_id) {
            return Err(missing("Hospital", appointment.hospital_id));
        }
        if !t.departments.contains_key(&appointment.department_id) {
            return Err(missing("Department", appointment.department_id));
        }
        let taken = t.appointments.values().any(|a| {
            a.doctor_id == appointment.doctor_id
                && a.date == appointment.date
                && a.status == AppointmentStatus::Scheduled
                && a.time_slot.overlaps(&appointment.time_slot)
        });
        if taken {
            return Err(ShasthoError::Conflict(
                "This time slot is no longer available".to_string(),
            ));
        }
        t.appointments.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.appointments.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(())
            }
            None => Err(missing("Appointment", appointment.id)),
        }
    }

    async fn list_patient_appointments(&self, patient_id: PatientId) -> Result<Vec<Appointment>> {
        let t = self.tables.read().await;
        let mut appointments: Vec<Appointment> = t
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.date, a.time_slot.start));
        Ok(appointments)
    }

    async fn list_doctor_appointments(
        &self,
        doctor_id: DoctorId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>> {
        let t = self.tables.read().await;
        let mut appointments: Vec<Appointment> = t
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .filter(|a| date.map_or(true, |d| a.date == d))
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.date, a.time_slot.start));
        Ok(appointments)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_ehr(&self, ehr: &Ehr) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.patients.contains_key(&ehr.patient_id) {
            return Err(missing("Patient", ehr.patient_id));
        }
        if t.ehrs.values().any(|e| e.patient_id == ehr.patient_id) {
            return Err(ShasthoError::Conflict(format!(
                "Patient {} already has an EHR",
                ehr.patient_id
            )));
        }
        t.ehrs.insert(ehr.id, ehr.clone());
        Ok(())
    }

    async fn get_ehr(&self, id: EhrId) -> Result<Option<Ehr>> {
        Ok(self.tables.read().await.ehrs.get(&id).cloned())
    }

    async fn find_ehr_by_patient(&self, patient_id: PatientId) -> Result<Option<Ehr>> {
        let t = self.tables.read().await;
        Ok(t.ehrs.values().find(|e| e.patient_id == patient_id).cloned())
    }

    async fn insert_visit(&self, visit: &Visit) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.ehrs.contains_key(&visit.ehr_id) {
            return Err(missing("EHR", visit.ehr_id));
        }
        t.visits.insert(visit.id, visit.clone());
        Ok(())
    }

    async fn get_visit(&self, id: VisitId) -> Result<Option<Visit>> {
        Ok(self.tables.read().await.visits.get(&id).cloned())
    }

    async fn list_visits(&self, ehr_id: EhrId, query: VisitQuery) -> Result<Vec<Visit>> {
        let t = self.tables.read().await;
        let mut visits: Vec<Visit> = t
            .visits
            .values()
            .filter(|v| v.ehr_id == ehr_id)
            .cloned()
            .collect();
        visits.sort_by_key(|v| (v.date, v.time, v.id));
        if query.newest_first {
            visits.reverse();
        }
        Ok(visits
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn delete_visit(&self, id: VisitId) -> Result<bool> {
        let mut t = self.tables.write().await;
        if !t.visits.contains_key(&id) {
            return Ok(false);
        }
        t.remove_visit_tree(id);
        Ok(true)
    }

    async fn insert_record(&self, record: &ClinicalRecord) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.parent_exists(record.parent()) {
            return Err(ShasthoError::NotFound(format!(
                "Parent of {} record not found",
                record.kind()
            )));
        }
        t.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn get_record(&self, kind: RecordKind, id: RecordId) -> Result<Option<ClinicalRecord>> {
        let t = self.tables.read().await;
        Ok(t.records.get(&id).filter(|r| r.kind() == kind).cloned())
    }

    async fn update_record(&self, record: &ClinicalRecord) -> Result<bool> {
        let mut t = self.tables.write().await;
        if !t.parent_exists(record.parent()) {
            return Err(ShasthoError::NotFound(format!(
                "Parent of {} record not found",
                record.kind()
            )));
        }
        match t.records.get_mut(&record.id()) {
            Some(existing) if existing.kind() == record.kind() => {
                *existing = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_record(&self, kind: RecordKind, id: RecordId) -> Result<bool> {
        let mut t = self.tables.write().await;
        let found = t.records.get(&id).is_some_and(|r| r.kind() == kind);
        if found {
            t.records.remove(&id);
        }
        Ok(found)
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        parent: RecordParent,
    ) -> Result<Vec<ClinicalRecord>> {
        let t = self.tables.read().await;
        let records = t
            .records
            .values()
            .filter(|r| r.kind() == kind && r.parent() == parent)
            .cloned()
            .collect();
        Ok(sorted_by_created(records, |r: &ClinicalRecord| r.created_at()))
    }
}

#[async_trait]
impl DatabaseClient for MemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, Language, ProviderNote, TimeSlot};
    use chrono::NaiveTime;

    fn patient() -> Patient {
        let now = Utc::now();
        Patient {
            id: PatientId::new(),
            user_id: None,
            full_name: "Rahim Uddin".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            gender: Gender::Male,
            contact_number: "01712345678".into(),
            address: "12 Lake Road, Dhaka".into(),
            emergency_contact_name: "Salma Uddin".into(),
            emergency_contact_number: "01812345678".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user(username: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: username.into(),
            password_hash: "x".into(),
            role: UserRole::Patient,
            status: UserStatus::Active,
            full_name: "Rahim Uddin".into(),
            language: Language::English,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(&user("rahim@example.com")).await.unwrap();
        let err = store
            .insert_user(&user("rahim@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_one_ehr_per_patient() {
        let store = MemoryStore::new();
        let p = patient();
        store.insert_patient(&p).await.unwrap();
        let now = Utc::now();
        let ehr = Ehr {
            id: EhrId::new(),
            patient_id: p.id,
            created_at: now,
            updated_at: now,
        };
        store.insert_ehr(&ehr).await.unwrap();
        let second = Ehr {
            id: EhrId::new(),
            ..ehr.clone()
        };
        assert!(matches!(
            store.insert_ehr(&second).await,
            Err(ShasthoError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_visit_removes_its_records() {
        let store = MemoryStore::new();
        let p = patient();
        store.insert_patient(&p).await.unwrap();
        let now = Utc::now();
        let ehr = Ehr {
            id: EhrId::new(),
            patient_id: p.id,
            created_at: now,
            updated_at: now,
        };
        store.insert_ehr(&ehr).await.unwrap();
        let visit = Visit {
            id: VisitId::new(),
            ehr_id: ehr.id,
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            visit_type: "Consultation".into(),
            provider_id: None,
            chief_complaint: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_visit(&visit).await.unwrap();
        let note = ClinicalRecord::ProviderNote(ProviderNote {
            id: RecordId::new(),
            visit_id: visit.id,
            note_text: "Stable".into(),
            created_by: None,
            created_at: now,
            updated_at: now,
        });
        store.insert_record(&note).await.unwrap();

        assert!(store.delete_visit(visit.id).await.unwrap());
        assert!(store
            .get_record(RecordKind::ProviderNote, note.id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_booking_checks_references_and_overlap() {
        let store = MemoryStore::new();
        let p = patient();
        store.insert_patient(&p).await.unwrap();
        let now = Utc::now();
        let doctor = Doctor {
            id: DoctorId::new(),
            user_id: None,
            full_name: "Dr. Ayesha Karim".into(),
            specialization: "Cardiology".into(),
            credentials: "MBBS".into(),
            contact_number: "01712345678".into(),
            hospital_id: None,
            department_id: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_doctor(&doctor).await.unwrap();
        let hospital = Hospital {
            id: HospitalId::new(),
            name: "Ibn Sina Hospital".into(),
            address: "House 48, Road 9/A, Dhanmondi".into(),
            city: "Dhaka".into(),
            state: "Dhaka".into(),
            postal_code: "1209".into(),
            phone: "0291267089".into(),
            email: None,
            website: None,
            created_at: now,
            updated_at: now,
        };
        let department = Department {
            id: DepartmentId::new(),
            name: "Cardiology".into(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_hospital(&hospital).await.unwrap();
        store.insert_department(&department).await.unwrap();
        let mut first = Appointment {
            id: AppointmentId::new(),
            patient_id: p.id,
            doctor_id: doctor.id,
            hospital_id: HospitalId::new(),
            department_id: department.id,
            date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            time_slot: "09:00 - 09:30".parse::<TimeSlot>().unwrap(),
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            store.book_appointment(&first).await,
            Err(ShasthoError::NotFound(_))
        ));
        first.hospital_id = hospital.id;
        store.book_appointment(&first).await.unwrap();

        let clash = Appointment {
            id: AppointmentId::new(),
            time_slot: "09:15 - 09:45".parse().unwrap(),
            ..first.clone()
        };
        assert!(matches!(
            store.book_appointment(&clash).await,
            Err(ShasthoError::Conflict(_))
        ));

        first.status = AppointmentStatus::Cancelled;
        store.update_appointment(&first).await.unwrap();
        store.book_appointment(&clash).await.unwrap();
    }

    #[tokio::test]
    async fn test_patients_with_the_same_name_list_by_id() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for _ in 0..4 {
            let p = patient();
            ids.push(p.id);
            store.insert_patient(&p).await.unwrap();
        }
        ids.sort();

        let listed: Vec<PatientId> = store
            .list_patients()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_reset_token_is_claimed_once_and_never_after_expiry() {
        let store = MemoryStore::new();
        let owner = user("rahim@example.com");
        store.insert_user(&owner).await.unwrap();
        let now = Utc::now();
        let token = |hash: &str, expires_at| PasswordResetToken {
            id: ResetTokenId::new(),
            user_id: owner.id,
            token_hash: hash.into(),
            expires_at,
            used: false,
            created_at: now,
            updated_at: now,
        };
        store
            .insert_reset_token(&token("live", now + chrono::Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert_reset_token(&token("stale", now - chrono::Duration::minutes(1)))
            .await
            .unwrap();

        assert!(store.mark_reset_token_used("live", now).await.unwrap());
        assert!(!store.mark_reset_token_used("live", now).await.unwrap());
        assert!(!store.mark_reset_token_used("stale", now).await.unwrap());
        assert!(!store.mark_reset_token_used("unknown", now).await.unwrap());
    }
}
