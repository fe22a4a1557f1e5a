//! Rule sets for each kind of submission

use super::{ModelValidator, PHONE_MESSAGE, PHONE_PATTERN};
use crate::domain::{AllergySeverity, Gender};
use chrono::{NaiveDate, Utc};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn gender_choices() -> Vec<&'static str> {
    Gender::ALL.iter().map(|g| g.as_str()).collect()
}

pub fn patient() -> ModelValidator {
    ModelValidator::new()
        .required("full_name")
        .string_length("full_name", Some(2), Some(100))
        .required("date_of_birth")
        .date("date_of_birth", None, Some(today()))
        .required("gender")
        .one_of("gender", &gender_choices())
        .required("contact_number")
        .pattern("contact_number", &PHONE_PATTERN, PHONE_MESSAGE)
        .required("address")
        .string_length("address", Some(5), Some(255))
        .required("emergency_contact_name")
        .string_length("emergency_contact_name", Some(2), Some(100))
        .required("emergency_contact_number")
        .pattern("emergency_contact_number", &PHONE_PATTERN, PHONE_MESSAGE)
}

pub fn doctor() -> ModelValidator {
    ModelValidator::new()
        .required("full_name")
        .string_length("full_name", Some(2), Some(100))
        .required("specialization")
        .string_length("specialization", Some(2), Some(100))
        .required("credentials")
        .string_length("credentials", Some(2), Some(500))
        .required("hospital_id")
        .required("department_id")
        .required("contact_number")
        .pattern("contact_number", &PHONE_PATTERN, PHONE_MESSAGE)
}

/// Account fields shared by every registration form
pub fn registration(password_min_length: usize) -> ModelValidator {
    ModelValidator::new()
        .required("username")
        .email("username")
        .required("password")
        .string_length("password", Some(password_min_length), Some(128))
        .required("full_name")
        .string_length("full_name", Some(2), Some(100))
}

pub fn hospital_admin() -> ModelValidator {
    ModelValidator::new()
        .required("hospital_id")
        .required("contact_number")
        .pattern("contact_number", &PHONE_PATTERN, PHONE_MESSAGE)
}

pub fn test_admin() -> ModelValidator {
    ModelValidator::new()
        .required("hospital_id")
        .required("contact_number")
        .pattern("contact_number", &PHONE_PATTERN, PHONE_MESSAGE)
        .string_length("department", None, Some(100))
        .string_length("qualification", None, Some(255))
}

pub fn test_image_admin_request() -> ModelValidator {
    ModelValidator::new()
        .required("hospital_id")
        .required("full_name")
        .string_length("full_name", Some(2), Some(100))
        .required("email")
        .email("email")
        .required("contact_number")
        .pattern("contact_number", &PHONE_PATTERN, PHONE_MESSAGE)
        .required("department")
        .string_length("department", Some(2), Some(100))
        .required("qualification")
        .string_length("qualification", Some(2), Some(255))
        .required("experience")
        .string_length("experience", Some(1), Some(2000))
        .required("reason")
        .string_length("reason", Some(5), Some(2000))
}

pub fn hospital() -> ModelValidator {
    ModelValidator::new()
        .required("name")
        .string_length("name", Some(2), Some(200))
        .required("address")
        .string_length("address", Some(5), Some(255))
        .required("city")
        .required("state")
        .required("postal_code")
        .required("phone")
        .pattern("phone", &PHONE_PATTERN, PHONE_MESSAGE)
        .email("email")
}

pub fn department() -> ModelValidator {
    ModelValidator::new()
        .required("name")
        .string_length("name", Some(2), Some(100))
        .string_length("description", None, Some(1000))
}

pub fn visit() -> ModelValidator {
    ModelValidator::new()
        .required("date")
        .date("date", None, None)
        .required("time")
        .required("visit_type")
        .string_length("visit_type", Some(2), Some(50))
        .string_length("chief_complaint", None, Some(1000))
}

pub fn availability_slot() -> ModelValidator {
    ModelValidator::new()
        .required("day_of_week")
        .integer("day_of_week", Some(0.0), Some(6.0))
        .required("start_time")
        .required("end_time")
        .integer("slot_duration_minutes", Some(5.0), Some(240.0))
        .date("valid_from", None, None)
        .date("valid_until", None, None)
}

pub fn appointment() -> ModelValidator {
    ModelValidator::new()
        .required("hospital_id")
        .required("department_id")
        .required("doctor_id")
        .required("appointment_date")
        .date("appointment_date", None, None)
        .required("appointment_time")
}

pub fn diagnosis() -> ModelValidator {
    ModelValidator::new()
        .required("diagnosis_description")
        .string_length("diagnosis_description", Some(2), Some(500))
        .required("diagnosis_code")
        .string_length("diagnosis_code", Some(2), Some(20))
        .required("visit_id")
        .date("diagnosed_at", None, None)
}

pub fn medication() -> ModelValidator {
    ModelValidator::new()
        .required("medication_name")
        .string_length("medication_name", Some(2), Some(100))
        .required("dosage")
        .string_length("dosage", Some(1), Some(50))
        .required("frequency")
        .string_length("frequency", Some(1), Some(100))
        .required("start_date")
        .date("start_date", None, None)
        .date("end_date", None, None)
        .required("visit_id")
}

pub fn procedure() -> ModelValidator {
    ModelValidator::new()
        .required("procedure_code")
        .string_length("procedure_code", Some(2), Some(20))
        .required("procedure_description")
        .string_length("procedure_description", Some(2), Some(500))
        .required("visit_id")
        .date("performed_at", None, None)
}

pub fn vital() -> ModelValidator {
    ModelValidator::new()
        .required("visit_id")
        .numeric("temperature", Some(25.0), Some(45.0))
        .integer("pulse", Some(0.0), Some(300.0))
        .string_length("blood_pressure", Some(3), Some(20))
        .integer("respiratory_rate", Some(0.0), Some(100.0))
}

pub fn provider_note() -> ModelValidator {
    ModelValidator::new()
        .required("note_text")
        .string_length("note_text", Some(2), Some(10_000))
        .required("visit_id")
}

pub fn prescription() -> ModelValidator {
    ModelValidator::new()
        .required("medication_name")
        .string_length("medication_name", Some(2), Some(100))
        .required("dosage")
        .string_length("dosage", Some(1), Some(50))
        .required("frequency")
        .string_length("frequency", Some(1), Some(100))
        .string_length("instructions", None, Some(1000))
        .required("visit_id")
}

pub fn allergy() -> ModelValidator {
    let severities: Vec<&str> = AllergySeverity::ALL.iter().map(|s| s.as_str()).collect();
    ModelValidator::new()
        .required("allergen")
        .string_length("allergen", Some(2), Some(100))
        .required("reaction")
        .string_length("reaction", Some(2), Some(255))
        .required("severity")
        .one_of("severity", &severities)
        .date("noted_at", None, Some(today()))
}

pub fn immunization() -> ModelValidator {
    ModelValidator::new()
        .required("vaccine")
        .string_length("vaccine", Some(2), Some(100))
        .required("date_administered")
        .date("date_administered", None, Some(today()))
}

pub fn test_result() -> ModelValidator {
    ModelValidator::new()
        .required("test_type")
        .string_length("test_type", Some(2), Some(100))
        .required("test_date")
        .date("test_date", None, Some(today()))
        .string_length("file_path", None, Some(500))
}
