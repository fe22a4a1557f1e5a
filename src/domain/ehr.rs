//! Electronic health record model
//!
//! A patient owns at most one [`Ehr`]. The EHR owns visits and the
//! patient-wide records (allergies, immunizations, test results); each visit
//! owns the encounter records (diagnoses, medications, procedures, vitals,
//! provider notes, prescriptions). Deleting a parent removes all of its
//! children.

use super::enums::AllergySeverity;
use super::ids::{DoctorId, EhrId, PatientId, RecordId, UserId, VisitId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ehr {
    pub id: EhrId,
    pub patient_id: PatientId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single patient encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub ehr_id: EhrId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub visit_type: String,
    pub provider_id: Option<DoctorId>,
    pub chief_complaint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: RecordId,
    pub visit_id: VisitId,
    pub diagnosis_code: String,
    pub diagnosis_description: String,
    pub diagnosed_by: Option<DoctorId>,
    pub diagnosed_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: RecordId,
    pub visit_id: VisitId,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub prescribed_by: Option<DoctorId>,
    pub prescribed_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: RecordId,
    pub visit_id: VisitId,
    pub procedure_code: String,
    pub procedure_description: String,
    pub performed_by: Option<DoctorId>,
    pub performed_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vital {
    pub id: RecordId,
    pub visit_id: VisitId,
    pub temperature: Option<f64>,
    pub pulse: Option<i32>,
    pub blood_pressure: Option<String>,
    pub respiratory_rate: Option<i32>,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<DoctorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderNote {
    pub id: RecordId,
    pub visit_id: VisitId,
    pub note_text: String,
    pub created_by: Option<DoctorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: RecordId,
    pub visit_id: VisitId,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub prescribed_by: Option<DoctorId>,
    pub prescribed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: RecordId,
    pub ehr_id: EhrId,
    pub allergen: String,
    pub reaction: String,
    pub severity: AllergySeverity,
    pub noted_at: NaiveDate,
    pub noted_by: Option<DoctorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Immunization {
    pub id: RecordId,
    pub ehr_id: EhrId,
    pub vaccine: String,
    pub date_administered: NaiveDate,
    pub administered_by: Option<DoctorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: RecordId,
    pub ehr_id: EhrId,
    pub test_type: String,
    pub test_date: NaiveDate,
    pub result_data: serde_json::Value,
    pub file_path: Option<String>,
    pub uploaded_by: Option<UserId>,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which parent a record kind hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    Visit,
    Ehr,
}

/// Parent key of a stored clinical record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordParent {
    Visit(VisitId),
    Ehr(EhrId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Diagnosis,
    Medication,
    Procedure,
    Vital,
    ProviderNote,
    Prescription,
    Allergy,
    Immunization,
    TestResult,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        RecordKind::Diagnosis,
        RecordKind::Medication,
        RecordKind::Procedure,
        RecordKind::Vital,
        RecordKind::ProviderNote,
        RecordKind::Prescription,
        RecordKind::Allergy,
        RecordKind::Immunization,
        RecordKind::TestResult,
    ];

    pub fn scope(&self) -> RecordScope {
        match self {
            RecordKind::Allergy | RecordKind::Immunization | RecordKind::TestResult => {
                RecordScope::Ehr
            }
            _ => RecordScope::Visit,
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Diagnosis => "ehr_diagnoses",
            RecordKind::Medication => "ehr_medications",
            RecordKind::Procedure => "ehr_procedures",
            RecordKind::Vital => "ehr_vitals",
            RecordKind::ProviderNote => "ehr_provider_notes",
            RecordKind::Prescription => "prescriptions",
            RecordKind::Allergy => "ehr_allergies",
            RecordKind::Immunization => "ehr_immunizations",
            RecordKind::TestResult => "ehr_test_results",
        }
    }

    /// Plural path segment used in URLs
    pub fn slug(&self) -> &'static str {
        match self {
            RecordKind::Diagnosis => "diagnoses",
            RecordKind::Medication => "medications",
            RecordKind::Procedure => "procedures",
            RecordKind::Vital => "vitals",
            RecordKind::ProviderNote => "notes",
            RecordKind::Prescription => "prescriptions",
            RecordKind::Allergy => "allergies",
            RecordKind::Immunization => "immunizations",
            RecordKind::TestResult => "test-results",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .iter()
            .copied()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("Unknown record type '{s}'"))
    }
}

/// Any clinical record, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClinicalRecord {
    Diagnosis(Diagnosis),
    Medication(Medication),
    Procedure(Procedure),
    Vital(Vital),
    ProviderNote(ProviderNote),
    Prescription(Prescription),
    Allergy(Allergy),
    Immunization(Immunization),
    TestResult(TestResult),
}

impl ClinicalRecord {
    pub fn id(&self) -> RecordId {
        match self {
            ClinicalRecord::Diagnosis(r) => r.id,
            ClinicalRecord::Medication(r) => r.id,
            ClinicalRecord::Procedure(r) => r.id,
            ClinicalRecord::Vital(r) => r.id,
            ClinicalRecord::ProviderNote(r) => r.id,
            ClinicalRecord::Prescription(r) => r.id,
            ClinicalRecord::Allergy(r) => r.id,
            ClinicalRecord::Immunization(r) => r.id,
            ClinicalRecord::TestResult(r) => r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            ClinicalRecord::Diagnosis(_) => RecordKind::Diagnosis,
            ClinicalRecord::Medication(_) => RecordKind::Medication,
            ClinicalRecord::Procedure(_) => RecordKind::Procedure,
            ClinicalRecord::Vital(_) => RecordKind::Vital,
            ClinicalRecord::ProviderNote(_) => RecordKind::ProviderNote,
            ClinicalRecord::Prescription(_) => RecordKind::Prescription,
            ClinicalRecord::Allergy(_) => RecordKind::Allergy,
            ClinicalRecord::Immunization(_) => RecordKind::Immunization,
            ClinicalRecord::TestResult(_) => RecordKind::TestResult,
        }
    }

    pub fn parent(&self) -> RecordParent {
        match self {
            ClinicalRecord::Diagnosis(r) => RecordParent::Visit(r.visit_id),
            ClinicalRecord::Medication(r) => RecordParent::Visit(r.visit_id),
            ClinicalRecord::Procedure(r) => RecordParent::Visit(r.visit_id),
            ClinicalRecord::Vital(r) => RecordParent::Visit(r.visit_id),
            ClinicalRecord::ProviderNote(r) => RecordParent::Visit(r.visit_id),
            ClinicalRecord::Prescription(r) => RecordParent::Visit(r.visit_id),
            ClinicalRecord::Allergy(r) => RecordParent::Ehr(r.ehr_id),
            ClinicalRecord::Immunization(r) => RecordParent::Ehr(r.ehr_id),
            ClinicalRecord::TestResult(r) => RecordParent::Ehr(r.ehr_id),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ClinicalRecord::Diagnosis(r) => r.created_at,
            ClinicalRecord::Medication(r) => r.created_at,
            ClinicalRecord::Procedure(r) => r.created_at,
            ClinicalRecord::Vital(r) => r.created_at,
            ClinicalRecord::ProviderNote(r) => r.created_at,
            ClinicalRecord::Prescription(r) => r.created_at,
            ClinicalRecord::Allergy(r) => r.created_at,
            ClinicalRecord::Immunization(r) => r.created_at,
            ClinicalRecord::TestResult(r) => r.created_at,
        }
    }

    /// Replaces identity and creation time with those of `existing`, so an
    /// edited record keeps its key and history
    pub fn adopt_identity(&mut self, id: RecordId, created_at: DateTime<Utc>) {
        macro_rules! adopt {
            ($r:expr) => {{
                $r.id = id;
                $r.created_at = created_at;
            }};
        }
        match self {
            ClinicalRecord::Diagnosis(r) => adopt!(r),
            ClinicalRecord::Medication(r) => adopt!(r),
            ClinicalRecord::Procedure(r) => adopt!(r),
            ClinicalRecord::Vital(r) => adopt!(r),
            ClinicalRecord::ProviderNote(r) => adopt!(r),
            ClinicalRecord::Prescription(r) => adopt!(r),
            ClinicalRecord::Allergy(r) => adopt!(r),
            ClinicalRecord::Immunization(r) => adopt!(r),
            ClinicalRecord::TestResult(r) => adopt!(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_scope() {
        assert_eq!(RecordKind::Allergy.scope(), RecordScope::Ehr);
        assert_eq!(RecordKind::TestResult.scope(), RecordScope::Ehr);
        assert_eq!(RecordKind::Diagnosis.scope(), RecordScope::Visit);
        assert_eq!(RecordKind::Prescription.scope(), RecordScope::Visit);
    }

    #[test]
    fn test_record_kind_slug_parse() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.slug().parse::<RecordKind>().unwrap(), kind);
        }
        assert!("x-rays".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_clinical_record_serializes_with_kind_tag() {
        let now = Utc::now();
        let record = ClinicalRecord::ProviderNote(ProviderNote {
            id: RecordId::new(),
            visit_id: VisitId::new(),
            note_text: "Follow up in two weeks".into(),
            created_by: None,
            created_at: now,
            updated_at: now,
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "provider_note");
        assert_eq!(json["note_text"], "Follow up in two weeks");
        assert!(matches!(record.parent(), RecordParent::Visit(_)));
    }
}
