//! Hospitals, departments, patients and doctors

use crate::adapters::database::{CareStore, DatabaseClient, DoctorFilter};
use crate::domain::{
    Department, DepartmentId, Doctor, DoctorId, Hospital, HospitalId, Patient, PatientId, Result,
    ShasthoError, UserId,
};
use crate::validation::{rules, FormData};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const NO_HOSPITAL: &str = "No Hospital Assigned";
pub const NO_DEPARTMENT: &str = "No Department Assigned";

/// One page of search results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Doctor with the names of their hospital and department resolved
#[derive(Debug, Clone, Serialize)]
pub struct DoctorProfile {
    pub doctor: Doctor,
    pub hospital_name: String,
    pub department_name: String,
}

pub(crate) fn build_patient(
    form: &FormData,
    id: PatientId,
    user_id: Option<UserId>,
    created_at: DateTime<Utc>,
) -> Result<Patient> {
    Ok(Patient {
        id,
        user_id,
        full_name: form.require("full_name")?.to_string(),
        date_of_birth: form.date_required("date_of_birth")?,
        gender: form.parse_required("gender")?,
        contact_number: form.require("contact_number")?.to_string(),
        address: form.require("address")?.to_string(),
        emergency_contact_name: form.require("emergency_contact_name")?.to_string(),
        emergency_contact_number: form.require("emergency_contact_number")?.to_string(),
        created_at,
        updated_at: Utc::now(),
    })
}

pub(crate) fn build_doctor(
    form: &FormData,
    id: DoctorId,
    user_id: Option<UserId>,
    created_at: DateTime<Utc>,
) -> Result<Doctor> {
    Ok(Doctor {
        id,
        user_id,
        full_name: form.require("full_name")?.to_string(),
        specialization: form.require("specialization")?.to_string(),
        credentials: form.require("credentials")?.to_string(),
        contact_number: form.require("contact_number")?.to_string(),
        hospital_id: form.parse("hospital_id")?,
        department_id: form.parse("department_id")?,
        created_at,
        updated_at: Utc::now(),
    })
}

fn build_hospital(form: &FormData, id: HospitalId, created_at: DateTime<Utc>) -> Result<Hospital> {
    Ok(Hospital {
        id,
        name: form.require("name")?.to_string(),
        address: form.require("address")?.to_string(),
        city: form.require("city")?.to_string(),
        state: form.require("state")?.to_string(),
        postal_code: form.require("postal_code")?.to_string(),
        phone: form.require("phone")?.to_string(),
        email: form.get_string("email"),
        website: form.get_string("website"),
        created_at,
        updated_at: Utc::now(),
    })
}

fn build_department(
    form: &FormData,
    id: DepartmentId,
    created_at: DateTime<Utc>,
) -> Result<Department> {
    Ok(Department {
        id,
        name: form.require("name")?.to_string(),
        description: form.get_string("description"),
        created_at,
        updated_at: Utc::now(),
    })
}

/// Case-insensitive substring match on id or name, or an exact birth date
fn patient_matches(patient: &Patient, needle: &str, date: Option<NaiveDate>) -> bool {
    if let Some(date) = date {
        if patient.date_of_birth == date {
            return true;
        }
    }
    patient.full_name.to_lowercase().contains(needle)
        || patient.id.to_string().to_lowercase().contains(needle)
}

pub struct DirectoryService {
    db: Arc<dyn DatabaseClient>,
}

impl DirectoryService {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    pub async fn create_hospital(&self, form: &FormData) -> Result<Hospital> {
        rules::hospital().check(form)?;
        let hospital = build_hospital(form, HospitalId::new(), Utc::now())?;
        self.db.insert_hospital(&hospital).await?;
        tracing::info!(hospital_id = %hospital.id, name = %hospital.name, "Hospital created");
        Ok(hospital)
    }

    pub async fn get_hospital(&self, id: HospitalId) -> Result<Hospital> {
        self.db
            .get_hospital(id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Hospital {id} not found")))
    }

    pub async fn list_hospitals(&self) -> Result<Vec<Hospital>> {
        self.db.list_hospitals().await
    }

    pub async fn update_hospital(&self, id: HospitalId, form: &FormData) -> Result<Hospital> {
        let existing = self.get_hospital(id).await?;
        rules::hospital().check(form)?;
        let hospital = build_hospital(form, id, existing.created_at)?;
        self.db.update_hospital(&hospital).await?;
        Ok(hospital)
    }

    /// Removes the hospital; its admins, requests and appointments go with it
    /// and its doctors become unassigned
    pub async fn delete_hospital(&self, id: HospitalId) -> Result<()> {
        if !self.db.delete_hospital(id).await? {
            return Err(ShasthoError::NotFound(format!("Hospital {id} not found")));
        }
        tracing::info!(hospital_id = %id, "Hospital deleted");
        Ok(())
    }

    pub async fn create_department(&self, form: &FormData) -> Result<Department> {
        rules::department().check(form)?;
        let department = build_department(form, DepartmentId::new(), Utc::now())?;
        self.db.insert_department(&department).await?;
        Ok(department)
    }

    pub async fn get_department(&self, id: DepartmentId) -> Result<Department> {
        self.db
            .get_department(id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Department {id} not found")))
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        self.db.list_departments().await
    }

    pub async fn update_department(
        &self,
        id: DepartmentId,
        form: &FormData,
    ) -> Result<Department> {
        let existing = self.get_department(id).await?;
        rules::department().check(form)?;
        let department = build_department(form, id, existing.created_at)?;
        self.db.update_department(&department).await?;
        Ok(department)
    }

    pub async fn delete_department(&self, id: DepartmentId) -> Result<()> {
        if !self.db.delete_department(id).await? {
            return Err(ShasthoError::NotFound(format!("Department {id} not found")));
        }
        Ok(())
    }

    pub async fn link_department(
        &self,
        hospital_id: HospitalId,
        department_id: DepartmentId,
    ) -> Result<()> {
        self.db.link_department(hospital_id, department_id).await
    }

    pub async fn hospital_departments(&self, hospital_id: HospitalId) -> Result<Vec<Department>> {
        self.get_hospital(hospital_id).await?;
        self.db.list_hospital_departments(hospital_id).await
    }

    pub async fn create_patient(
        &self,
        form: &FormData,
        user_id: Option<UserId>,
    ) -> Result<Patient> {
        rules::patient().check(form)?;
        let patient = build_patient(form, PatientId::new(), user_id, Utc::now())?;
        self.db.insert_patient(&patient).await?;
        tracing::info!(patient_id = %patient.id, "Patient created");
        Ok(patient)
    }

    pub async fn get_patient(&self, id: PatientId) -> Result<Patient> {
        self.db
            .get_patient(id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Patient {id} not found")))
    }

    pub async fn patient_for_user(&self, user_id: UserId) -> Result<Patient> {
        self.db
            .find_patient_by_user(user_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound("Patient profile not found".to_string()))
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        self.db.list_patients().await
    }

    pub async fn update_patient(&self, id: PatientId, form: &FormData) -> Result<Patient> {
        let existing = self.get_patient(id).await?;
        rules::patient().check(form)?;
        let patient = build_patient(form, id, existing.user_id, existing.created_at)?;
        self.db.update_patient(&patient).await?;
        Ok(patient)
    }

    /// Removes the patient, their EHR with every visit and record, and their appointments
    pub async fn delete_patient(&self, id: PatientId) -> Result<()> {
        if !self.db.delete_patient(id).await? {
            return Err(ShasthoError::NotFound(format!("Patient {id} not found")));
        }
        tracing::info!(patient_id = %id, "Patient deleted with EHR and appointments");
        Ok(())
    }

    /// Paginated patient search; an empty query lists everyone
    pub async fn search_patients(
        &self,
        query: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Page<Patient>> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let needle = query.trim().to_lowercase();
        let date = NaiveDate::parse_from_str(query.trim(), "%Y-%m-%d").ok();

        let matches: Vec<Patient> = self
            .db
            .list_patients()
            .await?
            .into_iter()
            .filter(|p| needle.is_empty() || patient_matches(p, &needle, date))
            .collect();

        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    pub async fn create_doctor(&self, form: &FormData, user_id: Option<UserId>) -> Result<Doctor> {
        rules::doctor().check(form)?;
        let doctor = build_doctor(form, DoctorId::new(), user_id, Utc::now())?;
        self.ensure_assignment(&doctor).await?;
        self.db.insert_doctor(&doctor).await?;
        tracing::info!(doctor_id = %doctor.id, "Doctor created");
        Ok(doctor)
    }

    pub async fn get_doctor(&self, id: DoctorId) -> Result<Doctor> {
        self.db
            .get_doctor(id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Doctor {id} not found")))
    }

    pub async fn doctor_for_user(&self, user_id: UserId) -> Result<Doctor> {
        self.db
            .find_doctor_by_user(user_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound("Doctor profile not found".to_string()))
    }

    pub async fn list_doctors(&self, filter: DoctorFilter) -> Result<Vec<Doctor>> {
        self.db.list_doctors(filter).await
    }

    pub async fn update_doctor(&self, id: DoctorId, form: &FormData) -> Result<Doctor> {
        let existing = self.get_doctor(id).await?;
        rules::doctor().check(form)?;
        let doctor = build_doctor(form, id, existing.user_id, existing.created_at)?;
        self.ensure_assignment(&doctor).await?;
        self.db.update_doctor(&doctor).await?;
        Ok(doctor)
    }

    pub async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        if !self.db.delete_doctor(id).await? {
            return Err(ShasthoError::NotFound(format!("Doctor {id} not found")));
        }
        Ok(())
    }

    pub async fn doctor_profile(&self, id: DoctorId) -> Result<DoctorProfile> {
        let doctor = self.get_doctor(id).await?;
        self.describe_doctor(doctor).await
    }

    pub(crate) async fn describe_doctor(&self, doctor: Doctor) -> Result<DoctorProfile> {
        let hospital_name = match doctor.hospital_id {
            Some(id) => self.db.get_hospital(id).await?.map(|h| h.name),
            None => None,
        };
        let department_name = match doctor.department_id {
            Some(id) => self.db.get_department(id).await?.map(|d| d.name),
            None => None,
        };
        Ok(DoctorProfile {
            doctor,
            hospital_name: hospital_name.unwrap_or_else(|| NO_HOSPITAL.to_string()),
            department_name: department_name.unwrap_or_else(|| NO_DEPARTMENT.to_string()),
        })
    }

    /// Assigned hospital and department must exist
    pub(crate) async fn ensure_assignment(&self, doctor: &Doctor) -> Result<()> {
        if let Some(id) = doctor.hospital_id {
            if self.db.get_hospital(id).await?.is_none() {
                return Err(ShasthoError::invalid_field(
                    "hospital_id",
                    "Selected hospital does not exist",
                ));
            }
        }
        if let Some(id) = doctor.department_id {
            if self.db.get_department(id).await?.is_none() {
                return Err(ShasthoError::invalid_field(
                    "department_id",
                    "Selected department does not exist",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    fn service() -> DirectoryService {
        DirectoryService::new(Arc::new(MemoryStore::new()))
    }

    fn patient_form(name: &str, dob: &str) -> FormData {
        FormData::new()
            .with("full_name", name)
            .with("date_of_birth", dob)
            .with("gender", "female")
            .with("contact_number", "+8801712345678")
            .with("address", "House 12, Road 5, Dhanmondi")
            .with("emergency_contact_name", "Karim Rahman")
            .with("emergency_contact_number", "01812345678")
    }

    #[tokio::test]
    async fn test_create_patient_requires_fields() {
        let svc = service();
        let err = svc
            .create_patient(&FormData::new().with("full_name", "Nadia"), None)
            .await
            .unwrap_err();
        match err {
            ShasthoError::Validation(errors) => {
                assert_eq!(
                    errors.message_for("date_of_birth"),
                    Some("This field is required")
                );
                assert!(errors.message_for("full_name").is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_patients_by_name_and_birth_date() {
        let svc = service();
        svc.create_patient(&patient_form("Nadia Rahman", "1990-05-14"), None)
            .await
            .unwrap();
        svc.create_patient(&patient_form("Arif Hossain", "1985-01-02"), None)
            .await
            .unwrap();
        svc.create_patient(&patient_form("Nadim Chowdhury", "1990-05-14"), None)
            .await
            .unwrap();

        let by_name = svc.search_patients("NAD", 1, 10).await.unwrap();
        assert_eq!(by_name.total, 2);

        let by_date = svc.search_patients("1985-01-02", 1, 10).await.unwrap();
        assert_eq!(by_date.total, 1);
        assert_eq!(by_date.items[0].full_name, "Arif Hossain");

        let paged = svc.search_patients("", 2, 2).await.unwrap();
        assert_eq!(paged.total, 3);
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.page, 2);
    }

    #[tokio::test]
    async fn test_search_patients_page_far_past_the_end_is_empty() {
        let svc = service();
        svc.create_patient(&patient_form("Nadia Rahman", "1990-05-14"), None)
            .await
            .unwrap();

        let page = svc.search_patients("", usize::MAX, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_doctor_profile_fallbacks() {
        let db = Arc::new(MemoryStore::new());
        let svc = DirectoryService::new(db.clone());
        let now = Utc::now();
        let doctor = Doctor {
            id: DoctorId::new(),
            user_id: None,
            full_name: "Dr. Farhana Akter".into(),
            specialization: "Cardiology".into(),
            credentials: "MBBS, FCPS".into(),
            contact_number: "01712345678".into(),
            hospital_id: None,
            department_id: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_doctor(&doctor).await.unwrap();

        let profile = svc.doctor_profile(doctor.id).await.unwrap();
        assert_eq!(profile.hospital_name, NO_HOSPITAL);
        assert_eq!(profile.department_name, NO_DEPARTMENT);
    }

    #[tokio::test]
    async fn test_doctor_with_unknown_hospital_rejected() {
        let svc = service();
        let form = FormData::new()
            .with("full_name", "Dr. Farhana Akter")
            .with("specialization", "Cardiology")
            .with("credentials", "MBBS, FCPS")
            .with("contact_number", "01712345678")
            .with("hospital_id", HospitalId::new().to_string())
            .with("department_id", DepartmentId::new().to_string());
        let err = svc.create_doctor(&form, None).await.unwrap_err();
        assert!(matches!(err, ShasthoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_hospital_is_not_found() {
        let err = service()
            .delete_hospital(HospitalId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::NotFound(_)));
    }
}
