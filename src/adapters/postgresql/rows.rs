//! Row mapping between PostgreSQL and the domain types
//!
//! Enumerations are stored as text, identifiers as `UUID`, and appointment
//! time slots as a `slot_start`/`slot_end` pair of `TIME` columns.

use crate::domain::{
    Allergy, Appointment, AvailabilitySlot, ClinicalRecord, Department, Diagnosis, Doctor,
    DoctorNote, Ehr, Hospital, HospitalAdmin, Immunization, Medication, PasswordResetToken,
    Patient, Prescription, Procedure, ProviderNote, RecordKind, RecordScope, Result,
    ShasthoError, TestAdmin, TestImageAdminRequest, TestResult, TimeSlot, User, UserSession,
    Visit, Vital,
};
use std::fmt::Display;
use std::str::FromStr;
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::Row;
use uuid::Uuid;

/// Owned, thread-safe SQL parameter
pub type SqlValue = Box<dyn ToSql + Sync + Send>;

fn get<'a, T: FromSql<'a>>(row: &'a Row, column: &str) -> Result<T> {
    row.try_get(column)
        .map_err(|e| ShasthoError::Database(format!("Failed to read column {column}: {e}")))
}

fn id<T: From<Uuid>>(row: &Row, column: &str) -> Result<T> {
    get::<Uuid>(row, column).map(T::from)
}

fn id_opt<T: From<Uuid>>(row: &Row, column: &str) -> Result<Option<T>> {
    get::<Option<Uuid>>(row, column).map(|v| v.map(T::from))
}

fn text_enum<T>(row: &Row, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = get(row, column)?;
    raw.parse()
        .map_err(|e| ShasthoError::Database(format!("Bad value in column {column}: {e}")))
}

pub fn user(row: &Row) -> Result<User> {
    Ok(User {
        id: id(row, "id")?,
        username: get(row, "username")?,
        password_hash: get(row, "password_hash")?,
        role: text_enum(row, "role")?,
        status: text_enum(row, "status")?,
        full_name: get(row, "full_name")?,
        language: text_enum(row, "language")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn session(row: &Row) -> Result<UserSession> {
    Ok(UserSession {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        token_hash: get(row, "token_hash")?,
        user_agent: get(row, "user_agent")?,
        ip_address: get(row, "ip_address")?,
        expires_at: get(row, "expires_at")?,
        ended_at: get(row, "ended_at")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn reset_token(row: &Row) -> Result<PasswordResetToken> {
    Ok(PasswordResetToken {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        token_hash: get(row, "token_hash")?,
        expires_at: get(row, "expires_at")?,
        used: get(row, "used")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn hospital_admin(row: &Row) -> Result<HospitalAdmin> {
    Ok(HospitalAdmin {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        full_name: get(row, "full_name")?,
        hospital_id: id(row, "hospital_id")?,
        contact_number: get(row, "contact_number")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn test_admin(row: &Row) -> Result<TestAdmin> {
    Ok(TestAdmin {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        full_name: get(row, "full_name")?,
        hospital_id: id(row, "hospital_id")?,
        contact_number: get(row, "contact_number")?,
        department: get(row, "department")?,
        qualification: get(row, "qualification")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn admin_request(row: &Row) -> Result<TestImageAdminRequest> {
    Ok(TestImageAdminRequest {
        id: id(row, "id")?,
        hospital_id: id(row, "hospital_id")?,
        full_name: get(row, "full_name")?,
        email: get(row, "email")?,
        contact_number: get(row, "contact_number")?,
        department: get(row, "department")?,
        qualification: get(row, "qualification")?,
        experience: get(row, "experience")?,
        reason: get(row, "reason")?,
        submitted_by: id(row, "submitted_by")?,
        status: text_enum(row, "status")?,
        reviewed_by: id_opt(row, "reviewed_by")?,
        reviewed_at: get(row, "reviewed_at")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn doctor_note(row: &Row) -> Result<DoctorNote> {
    Ok(DoctorNote {
        id: id(row, "id")?,
        doctor_id: id(row, "doctor_id")?,
        note_type: get(row, "note_type")?,
        content: get(row, "content")?,
        created_by: id_opt(row, "created_by")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn hospital(row: &Row) -> Result<Hospital> {
    Ok(Hospital {
        id: id(row, "id")?,
        name: get(row, "name")?,
        address: get(row, "address")?,
        city: get(row, "city")?,
        state: get(row, "state")?,
        postal_code: get(row, "postal_code")?,
        phone: get(row, "phone")?,
        email: get(row, "email")?,
        website: get(row, "website")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn department(row: &Row) -> Result<Department> {
    Ok(Department {
        id: id(row, "id")?,
        name: get(row, "name")?,
        description: get(row, "description")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn patient(row: &Row) -> Result<Patient> {
    Ok(Patient {
        id: id(row, "id")?,
        user_id: id_opt(row, "user_id")?,
        full_name: get(row, "full_name")?,
        date_of_birth: get(row, "date_of_birth")?,
        gender: text_enum(row, "gender")?,
        contact_number: get(row, "contact_number")?,
        address: get(row, "address")?,
        emergency_contact_name: get(row, "emergency_contact_name")?,
        emergency_contact_number: get(row, "emergency_contact_number")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn doctor(row: &Row) -> Result<Doctor> {
    Ok(Doctor {
        id: id(row, "id")?,
        user_id: id_opt(row, "user_id")?,
        full_name: get(row, "full_name")?,
        specialization: get(row, "specialization")?,
        credentials: get(row, "credentials")?,
        contact_number: get(row, "contact_number")?,
        hospital_id: id_opt(row, "hospital_id")?,
        department_id: id_opt(row, "department_id")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn slot(row: &Row) -> Result<AvailabilitySlot> {
    let day: i16 = get(row, "day_of_week")?;
    let duration: i32 = get(row, "slot_duration_minutes")?;
    Ok(AvailabilitySlot {
        id: id(row, "id")?,
        doctor_id: id(row, "doctor_id")?,
        day_of_week: u8::try_from(day)
            .map_err(|_| ShasthoError::Database(format!("Bad day_of_week {day}")))?,
        start_time: get(row, "start_time")?,
        end_time: get(row, "end_time")?,
        is_available: get(row, "is_available")?,
        slot_duration_minutes: u32::try_from(duration)
            .map_err(|_| ShasthoError::Database(format!("Bad slot duration {duration}")))?,
        valid_from: get(row, "valid_from")?,
        valid_until: get(row, "valid_until")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn appointment(row: &Row) -> Result<Appointment> {
    let time_slot = TimeSlot::new(get(row, "slot_start")?, get(row, "slot_end")?)
        .map_err(ShasthoError::Database)?;
    Ok(Appointment {
        id: id(row, "id")?,
        patient_id: id(row, "patient_id")?,
        doctor_id: id(row, "doctor_id")?,
        hospital_id: id(row, "hospital_id")?,
        department_id: id(row, "department_id")?,
        date: get(row, "date")?,
        time_slot,
        status: text_enum(row, "status")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn ehr(row: &Row) -> Result<Ehr> {
    Ok(Ehr {
        id: id(row, "id")?,
        patient_id: id(row, "patient_id")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub fn visit(row: &Row) -> Result<Visit> {
    Ok(Visit {
        id: id(row, "id")?,
        ehr_id: id(row, "ehr_id")?,
        date: get(row, "date")?,
        time: get(row, "time")?,
        visit_type: get(row, "visit_type")?,
        provider_id: id_opt(row, "provider_id")?,
        chief_complaint: get(row, "chief_complaint")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

/// Foreign key column linking a record kind to its parent
pub fn parent_column(kind: RecordKind) -> &'static str {
    match kind.scope() {
        RecordScope::Visit => "visit_id",
        RecordScope::Ehr => "ehr_id",
    }
}

pub fn clinical_record(kind: RecordKind, row: &Row) -> Result<ClinicalRecord> {
    Ok(match kind {
        RecordKind::Diagnosis => ClinicalRecord::Diagnosis(Diagnosis {
            id: id(row, "id")?,
            visit_id: id(row, "visit_id")?,
            diagnosis_code: get(row, "diagnosis_code")?,
            diagnosis_description: get(row, "diagnosis_description")?,
            diagnosed_by: id_opt(row, "diagnosed_by")?,
            diagnosed_at: get(row, "diagnosed_at")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::Medication => ClinicalRecord::Medication(Medication {
            id: id(row, "id")?,
            visit_id: id(row, "visit_id")?,
            medication_name: get(row, "medication_name")?,
            dosage: get(row, "dosage")?,
            frequency: get(row, "frequency")?,
            start_date: get(row, "start_date")?,
            end_date: get(row, "end_date")?,
            prescribed_by: id_opt(row, "prescribed_by")?,
            prescribed_at: get(row, "prescribed_at")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::Procedure => ClinicalRecord::Procedure(Procedure {
            id: id(row, "id")?,
            visit_id: id(row, "visit_id")?,
            procedure_code: get(row, "procedure_code")?,
            procedure_description: get(row, "procedure_description")?,
            performed_by: id_opt(row, "performed_by")?,
            performed_at: get(row, "performed_at")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::Vital => ClinicalRecord::Vital(Vital {
            id: id(row, "id")?,
            visit_id: id(row, "visit_id")?,
            temperature: get(row, "temperature")?,
            pulse: get(row, "pulse")?,
            blood_pressure: get(row, "blood_pressure")?,
            respiratory_rate: get(row, "respiratory_rate")?,
            recorded_at: get(row, "recorded_at")?,
            recorded_by: id_opt(row, "recorded_by")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::ProviderNote => ClinicalRecord::ProviderNote(ProviderNote {
            id: id(row, "id")?,
            visit_id: id(row, "visit_id")?,
            note_text: get(row, "note_text")?,
            created_by: id_opt(row, "created_by")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::Prescription => ClinicalRecord::Prescription(Prescription {
            id: id(row, "id")?,
            visit_id: id(row, "visit_id")?,
            medication_name: get(row, "medication_name")?,
            dosage: get(row, "dosage")?,
            frequency: get(row, "frequency")?,
            instructions: get(row, "instructions")?,
            prescribed_by: id_opt(row, "prescribed_by")?,
            prescribed_at: get(row, "prescribed_at")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::Allergy => ClinicalRecord::Allergy(Allergy {
            id: id(row, "id")?,
            ehr_id: id(row, "ehr_id")?,
            allergen: get(row, "allergen")?,
            reaction: get(row, "reaction")?,
            severity: text_enum(row, "severity")?,
            noted_at: get(row, "noted_at")?,
            noted_by: id_opt(row, "noted_by")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::Immunization => ClinicalRecord::Immunization(Immunization {
            id: id(row, "id")?,
            ehr_id: id(row, "ehr_id")?,
            vaccine: get(row, "vaccine")?,
            date_administered: get(row, "date_administered")?,
            administered_by: id_opt(row, "administered_by")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
        RecordKind::TestResult => ClinicalRecord::TestResult(TestResult {
            id: id(row, "id")?,
            ehr_id: id(row, "ehr_id")?,
            test_type: get(row, "test_type")?,
            test_date: get(row, "test_date")?,
            result_data: get(row, "result_data")?,
            file_path: get(row, "file_path")?,
            uploaded_by: id_opt(row, "uploaded_by")?,
            uploaded_at: get(row, "uploaded_at")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        }),
    })
}

fn value<T: ToSql + Sync + Send + 'static>(v: T) -> SqlValue {
    Box::new(v)
}

/// Column/value pairs of a record, `id` first and `created_at`/`updated_at` last
pub fn clinical_record_columns(record: &ClinicalRecord) -> Vec<(&'static str, SqlValue)> {
    let mut cols: Vec<(&'static str, SqlValue)> = vec![("id", value(*record.id().as_uuid()))];
    let (created_at, updated_at) = match record {
        ClinicalRecord::Diagnosis(r) => {
            cols.push(("visit_id", value(*r.visit_id.as_uuid())));
            cols.push(("diagnosis_code", value(r.diagnosis_code.clone())));
            cols.push(("diagnosis_description", value(r.diagnosis_description.clone())));
            cols.push(("diagnosed_by", value(r.diagnosed_by.map(|d| *d.as_uuid()))));
            cols.push(("diagnosed_at", value(r.diagnosed_at)));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::Medication(r) => {
            cols.push(("visit_id", value(*r.visit_id.as_uuid())));
            cols.push(("medication_name", value(r.medication_name.clone())));
            cols.push(("dosage", value(r.dosage.clone())));
            cols.push(("frequency", value(r.frequency.clone())));
            cols.push(("start_date", value(r.start_date)));
            cols.push(("end_date", value(r.end_date)));
            cols.push(("prescribed_by", value(r.prescribed_by.map(|d| *d.as_uuid()))));
            cols.push(("prescribed_at", value(r.prescribed_at)));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::Procedure(r) => {
            cols.push(("visit_id", value(*r.visit_id.as_uuid())));
            cols.push(("procedure_code", value(r.procedure_code.clone())));
            cols.push(("procedure_description", value(r.procedure_description.clone())));
            cols.push(("performed_by", value(r.performed_by.map(|d| *d.as_uuid()))));
            cols.push(("performed_at", value(r.performed_at)));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::Vital(r) => {
            cols.push(("visit_id", value(*r.visit_id.as_uuid())));
            cols.push(("temperature", value(r.temperature)));
            cols.push(("pulse", value(r.pulse)));
            cols.push(("blood_pressure", value(r.blood_pressure.clone())));
            cols.push(("respiratory_rate", value(r.respiratory_rate)));
            cols.push(("recorded_at", value(r.recorded_at)));
            cols.push(("recorded_by", value(r.recorded_by.map(|d| *d.as_uuid()))));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::ProviderNote(r) => {
            cols.push(("visit_id", value(*r.visit_id.as_uuid())));
            cols.push(("note_text", value(r.note_text.clone())));
            cols.push(("created_by", value(r.created_by.map(|d| *d.as_uuid()))));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::Prescription(r) => {
            cols.push(("visit_id", value(*r.visit_id.as_uuid())));
            cols.push(("medication_name", value(r.medication_name.clone())));
            cols.push(("dosage", value(r.dosage.clone())));
            cols.push(("frequency", value(r.frequency.clone())));
            cols.push(("instructions", value(r.instructions.clone())));
            cols.push(("prescribed_by", value(r.prescribed_by.map(|d| *d.as_uuid()))));
            cols.push(("prescribed_at", value(r.prescribed_at)));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::Allergy(r) => {
            cols.push(("ehr_id", value(*r.ehr_id.as_uuid())));
            cols.push(("allergen", value(r.allergen.clone())));
            cols.push(("reaction", value(r.reaction.clone())));
            cols.push(("severity", value(r.severity.as_str())));
            cols.push(("noted_at", value(r.noted_at)));
            cols.push(("noted_by", value(r.noted_by.map(|d| *d.as_uuid()))));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::Immunization(r) => {
            cols.push(("ehr_id", value(*r.ehr_id.as_uuid())));
            cols.push(("vaccine", value(r.vaccine.clone())));
            cols.push(("date_administered", value(r.date_administered)));
            cols.push((
                "administered_by",
                value(r.administered_by.map(|d| *d.as_uuid())),
            ));
            (r.created_at, r.updated_at)
        }
        ClinicalRecord::TestResult(r) => {
            cols.push(("ehr_id", value(*r.ehr_id.as_uuid())));
            cols.push(("test_type", value(r.test_type.clone())));
            cols.push(("test_date", value(r.test_date)));
            cols.push(("result_data", value(r.result_data.clone())));
            cols.push(("file_path", value(r.file_path.clone())));
            cols.push(("uploaded_by", value(r.uploaded_by.map(|d| *d.as_uuid()))));
            cols.push(("uploaded_at", value(r.uploaded_at)));
            (r.created_at, r.updated_at)
        }
    };
    cols.push(("created_at", value(created_at)));
    cols.push(("updated_at", value(updated_at)));
    cols
}

/// `INSERT` statement for the given column list
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `UPDATE … WHERE id = $n` where `$n` follows the assigned columns
pub fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE id = ${}",
        assignments.join(", "),
        columns.len() + 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_placeholders() {
        let sql = insert_sql("ehr_provider_notes", &["id", "visit_id", "note_text"]);
        assert_eq!(
            sql,
            "INSERT INTO ehr_provider_notes (id, visit_id, note_text) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_update_sql_puts_id_last() {
        let sql = update_sql("ehr_vitals", &["pulse", "updated_at"]);
        assert_eq!(
            sql,
            "UPDATE ehr_vitals SET pulse = $1, updated_at = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_parent_column_follows_scope() {
        assert_eq!(parent_column(RecordKind::Medication), "visit_id");
        assert_eq!(parent_column(RecordKind::Immunization), "ehr_id");
    }
}
