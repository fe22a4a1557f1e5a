//! Delete rules: owned children go with their parent, optional references are cleared

use shastho::adapters::database::{CareStore, RecordStore};
use shastho::adapters::memory::MemoryStore;
use shastho::config::SecurityConfig;
use shastho::domain::{
    ClinicalRecord, Department, Doctor, Ehr, Hospital, Patient, RecordKind, RecordParent,
    ShasthoError, Visit,
};
use shastho::services::{Authorship, Services};
use shastho::validation::FormData;
use std::sync::Arc;

struct Clinic {
    services: Services,
    hospital: Hospital,
    department: Department,
    doctor: Doctor,
    patient: Patient,
    ehr: Ehr,
    visit: Visit,
}

async fn clinic() -> Clinic {
    let services = Services::new(Arc::new(MemoryStore::new()), &SecurityConfig::default());
    let directory = &services.directory;

    let hospital = directory
        .create_hospital(
            &FormData::new()
                .with("name", "Chittagong Medical")
                .with("address", "57 K.B. Fazlul Kader Road")
                .with("city", "Chattogram")
                .with("state", "Chattogram")
                .with("postal_code", "4203")
                .with("phone", "0312550011"),
        )
        .await
        .unwrap();
    let department = directory
        .create_department(&FormData::new().with("name", "Cardiology"))
        .await
        .unwrap();
    directory
        .link_department(hospital.id, department.id)
        .await
        .unwrap();

    let doctor = directory
        .create_doctor(
            &FormData::new()
                .with("full_name", "Dr. Anwar Hossain")
                .with("specialization", "Cardiology")
                .with("credentials", "MBBS, FCPS")
                .with("contact_number", "01911223344")
                .with("hospital_id", hospital.id.to_string())
                .with("department_id", department.id.to_string()),
            None,
        )
        .await
        .unwrap();

    let patient = directory
        .create_patient(
            &FormData::new()
                .with("full_name", "Salma Khatun")
                .with("date_of_birth", "1985-09-30")
                .with("gender", "female")
                .with("contact_number", "01555667788")
                .with("address", "Agrabad, Chattogram")
                .with("emergency_contact_name", "Jamal Khan")
                .with("emergency_contact_number", "01666778899"),
            None,
        )
        .await
        .unwrap();

    let ehr = services.ehr.create_patient_ehr(patient.id).await.unwrap();
    let visit = services
        .ehr
        .add_visit(
            ehr.id,
            &FormData::new()
                .with("date", "2025-03-02")
                .with("time", "10:30")
                .with("visit_type", "Follow-up"),
            Some(doctor.id),
        )
        .await
        .unwrap();

    Clinic {
        services,
        hospital,
        department,
        doctor,
        patient,
        ehr,
        visit,
    }
}

fn by(doctor: &Doctor) -> Authorship {
    Authorship {
        doctor: Some(doctor.id),
        user: None,
    }
}

#[tokio::test]
async fn test_deleting_patient_removes_the_whole_record_tree() {
    let c = clinic().await;
    let vital = c
        .services
        .ehr
        .add_record(
            RecordKind::Vital,
            &FormData::new()
                .with("visit_id", c.visit.id.to_string())
                .with("temperature", "37.2")
                .with("pulse", "72"),
            by(&c.doctor),
        )
        .await
        .unwrap();
    c.services
        .ehr
        .add_record(
            RecordKind::Allergy,
            &FormData::new()
                .with("ehr_id", c.ehr.id.to_string())
                .with("allergen", "Penicillin")
                .with("reaction", "Hives")
                .with("severity", "Moderate"),
            by(&c.doctor),
        )
        .await
        .unwrap();

    c.services
        .directory
        .delete_patient(c.patient.id)
        .await
        .unwrap();

    let db = &c.services.db;
    assert!(db.get_ehr(c.ehr.id).await.unwrap().is_none());
    assert!(db.get_visit(c.visit.id).await.unwrap().is_none());
    assert!(db
        .get_record(RecordKind::Vital, vital.id())
        .await
        .unwrap()
        .is_none());
    assert!(db
        .list_records(RecordKind::Allergy, RecordParent::Ehr(c.ehr.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deleting_visit_keeps_ehr_scoped_records() {
    let c = clinic().await;
    c.services
        .ehr
        .add_record(
            RecordKind::ProviderNote,
            &FormData::new()
                .with("visit_id", c.visit.id.to_string())
                .with("note_text", "Stable, continue medication"),
            by(&c.doctor),
        )
        .await
        .unwrap();
    c.services
        .ehr
        .add_record(
            RecordKind::Allergy,
            &FormData::new()
                .with("ehr_id", c.ehr.id.to_string())
                .with("allergen", "Peanuts")
                .with("reaction", "Swelling")
                .with("severity", "Severe"),
            by(&c.doctor),
        )
        .await
        .unwrap();

    c.services.ehr.delete_visit(c.visit.id).await.unwrap();

    let ehr = &c.services.ehr;
    assert!(ehr
        .list_visit_records(RecordKind::ProviderNote, c.visit.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        ehr.list_ehr_records(RecordKind::Allergy, c.ehr.id)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(
        ehr.get_visit(c.visit.id).await,
        Err(ShasthoError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleting_doctor_clears_authorship_but_keeps_history() {
    let c = clinic().await;
    let diagnosis = c
        .services
        .ehr
        .add_record(
            RecordKind::Diagnosis,
            &FormData::new()
                .with("visit_id", c.visit.id.to_string())
                .with("diagnosis_description", "Essential hypertension")
                .with("diagnosis_code", "I10"),
            by(&c.doctor),
        )
        .await
        .unwrap();

    c.services.directory.delete_doctor(c.doctor.id).await.unwrap();

    let visit = c.services.ehr.get_visit(c.visit.id).await.unwrap();
    assert_eq!(visit.provider_id, None);

    match c
        .services
        .ehr
        .get_record(RecordKind::Diagnosis, diagnosis.id())
        .await
        .unwrap()
    {
        ClinicalRecord::Diagnosis(d) => assert_eq!(d.diagnosed_by, None),
        other => panic!("expected a diagnosis, got {other:?}"),
    }
}

#[tokio::test]
async fn test_deleting_department_unassigns_doctors() {
    let c = clinic().await;

    c.services
        .directory
        .delete_department(c.department.id)
        .await
        .unwrap();

    let doctor = c.services.directory.get_doctor(c.doctor.id).await.unwrap();
    assert_eq!(doctor.department_id, None);
    assert_eq!(doctor.hospital_id, Some(c.hospital.id));
    assert!(c
        .services
        .directory
        .hospital_departments(c.hospital.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deleting_hospital_cancels_its_appointments() {
    let c = clinic().await;
    let appointment = c
        .services
        .booking
        .book(
            c.patient.id,
            &FormData::new()
                .with("hospital_id", c.hospital.id.to_string())
                .with("department_id", c.department.id.to_string())
                .with("doctor_id", c.doctor.id.to_string())
                .with("appointment_date", "2030-01-07")
                .with("appointment_time", "09:00 - 09:30"),
        )
        .await
        .unwrap();

    c.services
        .directory
        .delete_hospital(c.hospital.id)
        .await
        .unwrap();

    assert!(c
        .services
        .db
        .get_appointment(appointment.id)
        .await
        .unwrap()
        .is_none());
    let doctor = c.services.directory.get_doctor(c.doctor.id).await.unwrap();
    assert_eq!(doctor.hospital_id, None);
}
