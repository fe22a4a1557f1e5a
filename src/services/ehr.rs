//! Electronic health records: visits and clinical records
//!
//! Clinical records arrive as [`FormData`] and are checked against the rule
//! set of their [`RecordKind`] before being turned into a typed
//! [`ClinicalRecord`]. The parent key (`visit_id` or `ehr_id`) travels in the
//! form; HTTP handlers copy it from the path.

use crate::adapters::database::{CareStore, DatabaseClient, VisitQuery};
use crate::domain::{
    Allergy, ClinicalRecord, Diagnosis, DoctorId, Ehr, EhrId, Immunization, Medication, Patient,
    PatientId, Prescription, Procedure, ProviderNote, RecordId, RecordKind, RecordParent,
    RecordScope, Result, ShasthoError, TestResult, UserId, Visit, VisitId, Vital,
};
use crate::validation::{rules, FormData, ModelValidator};
use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

/// Number of visits shown in a medical summary
pub const SUMMARY_VISITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(format!("Invalid sort direction '{other}'. Use asc or desc")),
        }
    }
}

/// A visit together with every record written during it
#[derive(Debug, Clone, Serialize)]
pub struct VisitDetails {
    pub visit: Visit,
    pub diagnoses: Vec<Diagnosis>,
    pub medications: Vec<Medication>,
    pub procedures: Vec<Procedure>,
    pub vitals: Vec<Vital>,
    pub provider_notes: Vec<ProviderNote>,
    pub prescriptions: Vec<Prescription>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicalSummary {
    pub patient: Patient,
    pub ehr: Ehr,
    pub recent_visits: Vec<Visit>,
    pub medications: Vec<Medication>,
    pub allergies: Vec<Allergy>,
    pub immunizations: Vec<Immunization>,
    pub test_results: Vec<TestResult>,
}

/// Who is writing a record: the treating doctor and/or the uploading account
#[derive(Debug, Clone, Copy, Default)]
pub struct Authorship {
    pub doctor: Option<DoctorId>,
    pub user: Option<UserId>,
}

fn rules_for(kind: RecordKind) -> ModelValidator {
    match kind {
        RecordKind::Diagnosis => rules::diagnosis(),
        RecordKind::Medication => rules::medication(),
        RecordKind::Procedure => rules::procedure(),
        RecordKind::Vital => rules::vital(),
        RecordKind::ProviderNote => rules::provider_note(),
        RecordKind::Prescription => rules::prescription(),
        RecordKind::Allergy => rules::allergy().required("ehr_id"),
        RecordKind::Immunization => rules::immunization().required("ehr_id"),
        RecordKind::TestResult => rules::test_result().required("ehr_id"),
    }
}

fn parent_field(kind: RecordKind) -> &'static str {
    match kind.scope() {
        RecordScope::Visit => "visit_id",
        RecordScope::Ehr => "ehr_id",
    }
}

fn parse_time(form: &FormData, field: &str) -> Result<NaiveTime> {
    let raw = form.require(field)?;
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ShasthoError::invalid_field(field, "Invalid time format. Use HH:MM"))
}

/// Free-form JSON payload; plain text is kept as a JSON string
fn result_data(form: &FormData) -> serde_json::Value {
    match form.get("result_data") {
        None => serde_json::Value::Object(serde_json::Map::new()),
        Some(raw) => serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
    }
}

fn build_record(
    kind: RecordKind,
    form: &FormData,
    by: Authorship,
    id: RecordId,
    now: DateTime<Utc>,
) -> Result<ClinicalRecord> {
    let today = now.date_naive();
    let record = match kind {
        RecordKind::Diagnosis => ClinicalRecord::Diagnosis(Diagnosis {
            id,
            visit_id: form.parse_required("visit_id")?,
            diagnosis_code: form.require("diagnosis_code")?.to_string(),
            diagnosis_description: form.require("diagnosis_description")?.to_string(),
            diagnosed_by: by.doctor,
            diagnosed_at: form.date("diagnosed_at")?.unwrap_or(today),
            created_at: now,
            updated_at: now,
        }),
        RecordKind::Medication => ClinicalRecord::Medication(Medication {
            id,
            visit_id: form.parse_required("visit_id")?,
            medication_name: form.require("medication_name")?.to_string(),
            dosage: form.require("dosage")?.to_string(),
            frequency: form.require("frequency")?.to_string(),
            start_date: form.date_required("start_date")?,
            end_date: form.date("end_date")?,
            prescribed_by: by.doctor,
            prescribed_at: form.date("prescribed_at")?.unwrap_or(today),
            created_at: now,
            updated_at: now,
        }),
        RecordKind::Procedure => ClinicalRecord::Procedure(Procedure {
            id,
            visit_id: form.parse_required("visit_id")?,
            procedure_code: form.require("procedure_code")?.to_string(),
            procedure_description: form.require("procedure_description")?.to_string(),
            performed_by: by.doctor,
            performed_at: form.date("performed_at")?.unwrap_or(today),
            created_at: now,
            updated_at: now,
        }),
        RecordKind::Vital => ClinicalRecord::Vital(Vital {
            id,
            visit_id: form.parse_required("visit_id")?,
            temperature: form.parse("temperature")?,
            pulse: form.parse("pulse")?,
            blood_pressure: form.get_string("blood_pressure"),
            respiratory_rate: form.parse("respiratory_rate")?,
            recorded_at: now,
            recorded_by: by.doctor,
            created_at: now,
            updated_at: now,
        }),
        RecordKind::ProviderNote => ClinicalRecord::ProviderNote(ProviderNote {
            id,
            visit_id: form.parse_required("visit_id")?,
            note_text: form.require("note_text")?.to_string(),
            created_by: by.doctor,
            created_at: now,
            updated_at: now,
        }),
        RecordKind::Prescription => ClinicalRecord::Prescription(Prescription {
            id,
            visit_id: form.parse_required("visit_id")?,
            medication_name: form.require("medication_name")?.to_string(),
            dosage: form.require("dosage")?.to_string(),
            frequency: form.require("frequency")?.to_string(),
            instructions: form.get_string("instructions"),
            prescribed_by: by.doctor,
            prescribed_at: now,
            created_at: now,
            updated_at: now,
        }),
        RecordKind::Allergy => ClinicalRecord::Allergy(Allergy {
            id,
            ehr_id: form.parse_required("ehr_id")?,
            allergen: form.require("allergen")?.to_string(),
            reaction: form.require("reaction")?.to_string(),
            severity: form.parse_required("severity")?,
            noted_at: form.date("noted_at")?.unwrap_or(today),
            noted_by: by.doctor,
            created_at: now,
            updated_at: now,
        }),
        RecordKind::Immunization => ClinicalRecord::Immunization(Immunization {
            id,
            ehr_id: form.parse_required("ehr_id")?,
            vaccine: form.require("vaccine")?.to_string(),
            date_administered: form.date_required("date_administered")?,
            administered_by: by.doctor,
            created_at: now,
            updated_at: now,
        }),
        RecordKind::TestResult => ClinicalRecord::TestResult(TestResult {
            id,
            ehr_id: form.parse_required("ehr_id")?,
            test_type: form.require("test_type")?.to_string(),
            test_date: form.date_required("test_date")?,
            result_data: result_data(form),
            file_path: form.get_string("file_path"),
            uploaded_by: by.user,
            uploaded_at: now,
            created_at: now,
            updated_at: now,
        }),
    };
    Ok(record)
}

macro_rules! pick {
    ($records:expr, $variant:ident) => {
        $records
            .into_iter()
            .filter_map(|r| match r {
                ClinicalRecord::$variant(inner) => Some(inner),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
}

pub struct EhrService {
    db: Arc<dyn DatabaseClient>,
}

impl EhrService {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    async fn require_patient(&self, patient_id: PatientId) -> Result<Patient> {
        self.db
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Patient {patient_id} not found")))
    }

    pub async fn get_ehr(&self, ehr_id: EhrId) -> Result<Ehr> {
        self.db
            .get_ehr(ehr_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("EHR {ehr_id} not found")))
    }

    pub async fn get_patient_ehr(&self, patient_id: PatientId) -> Result<Option<Ehr>> {
        self.db.find_ehr_by_patient(patient_id).await
    }

    /// Returns the patient's EHR, creating it on first use
    pub async fn create_patient_ehr(&self, patient_id: PatientId) -> Result<Ehr> {
        self.require_patient(patient_id).await?;
        if let Some(existing) = self.db.find_ehr_by_patient(patient_id).await? {
            return Ok(existing);
        }
        let now = Utc::now();
        let ehr = Ehr {
            id: EhrId::new(),
            patient_id,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_ehr(&ehr).await?;
        tracing::info!(patient_id = %patient_id, ehr_id = %ehr.id, "EHR created");
        Ok(ehr)
    }

    pub async fn get_ehr_visits(
        &self,
        ehr_id: EhrId,
        limit: usize,
        offset: usize,
        sort: SortDir,
    ) -> Result<Vec<Visit>> {
        let query = VisitQuery {
            limit,
            offset,
            newest_first: sort == SortDir::Desc,
        };
        self.db.list_visits(ehr_id, query).await
    }

    pub async fn add_visit(
        &self,
        ehr_id: EhrId,
        form: &FormData,
        provider: Option<DoctorId>,
    ) -> Result<Visit> {
        self.get_ehr(ehr_id).await?;
        rules::visit().check(form)?;
        let now = Utc::now();
        let visit = Visit {
            id: VisitId::new(),
            ehr_id,
            date: form.date_required("date")?,
            time: parse_time(form, "time")?,
            visit_type: form.require("visit_type")?.to_string(),
            provider_id: form.parse("provider_id")?.or(provider),
            chief_complaint: form.get_string("chief_complaint"),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_visit(&visit).await?;
        tracing::info!(ehr_id = %ehr_id, visit_id = %visit.id, "Visit recorded");
        Ok(visit)
    }

    pub async fn get_visit(&self, visit_id: VisitId) -> Result<Visit> {
        self.db
            .get_visit(visit_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Visit {visit_id} not found")))
    }

    pub async fn get_visit_details(&self, visit_id: VisitId) -> Result<VisitDetails> {
        let visit = self.get_visit(visit_id).await?;
        let parent = RecordParent::Visit(visit_id);
        Ok(VisitDetails {
            diagnoses: pick!(self.db.list_records(RecordKind::Diagnosis, parent).await?, Diagnosis),
            medications: pick!(
                self.db.list_records(RecordKind::Medication, parent).await?,
                Medication
            ),
            procedures: pick!(self.db.list_records(RecordKind::Procedure, parent).await?, Procedure),
            vitals: pick!(self.db.list_records(RecordKind::Vital, parent).await?, Vital),
            provider_notes: pick!(
                self.db.list_records(RecordKind::ProviderNote, parent).await?,
                ProviderNote
            ),
            prescriptions: pick!(
                self.db.list_records(RecordKind::Prescription, parent).await?,
                Prescription
            ),
            visit,
        })
    }

    /// Removes the visit and every record written during it
    pub async fn delete_visit(&self, visit_id: VisitId) -> Result<()> {
        if !self.db.delete_visit(visit_id).await? {
            return Err(ShasthoError::NotFound(format!("Visit {visit_id} not found")));
        }
        tracing::info!(visit_id = %visit_id, "Visit deleted");
        Ok(())
    }

    pub async fn add_record(
        &self,
        kind: RecordKind,
        form: &FormData,
        by: Authorship,
    ) -> Result<ClinicalRecord> {
        rules_for(kind).check(form)?;
        let record = build_record(kind, form, by, RecordId::new(), Utc::now())?;
        self.db.insert_record(&record).await?;
        tracing::info!(kind = %kind, record_id = %record.id(), "Clinical record added");
        Ok(record)
    }

    pub async fn get_record(&self, kind: RecordKind, id: RecordId) -> Result<ClinicalRecord> {
        self.db
            .get_record(kind, id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("{kind} record {id} not found")))
    }

    /// Replaces a record's content; id, parent and creation time are kept
    pub async fn update_record(
        &self,
        kind: RecordKind,
        id: RecordId,
        form: &FormData,
        by: Authorship,
    ) -> Result<ClinicalRecord> {
        let existing = self.get_record(kind, id).await?;

        let mut form = form.clone();
        let parent = match existing.parent() {
            RecordParent::Visit(visit_id) => visit_id.to_string(),
            RecordParent::Ehr(ehr_id) => ehr_id.to_string(),
        };
        form.set(parent_field(kind), parent);

        rules_for(kind).check(&form)?;
        let mut record = build_record(kind, &form, by, id, Utc::now())?;
        record.adopt_identity(existing.id(), existing.created_at());
        if !self.db.update_record(&record).await? {
            return Err(ShasthoError::NotFound(format!("{kind} record {id} not found")));
        }
        Ok(record)
    }

    pub async fn delete_record(&self, kind: RecordKind, id: RecordId) -> Result<()> {
        if !self.db.delete_record(kind, id).await? {
            return Err(ShasthoError::NotFound(format!("{kind} record {id} not found")));
        }
        Ok(())
    }

    pub async fn list_visit_records(
        &self,
        kind: RecordKind,
        visit_id: VisitId,
    ) -> Result<Vec<ClinicalRecord>> {
        if kind.scope() != RecordScope::Visit {
            return Err(ShasthoError::InvalidState(format!(
                "{kind} records belong to an EHR, not a visit"
            )));
        }
        self.db.list_records(kind, RecordParent::Visit(visit_id)).await
    }

    pub async fn list_ehr_records(
        &self,
        kind: RecordKind,
        ehr_id: EhrId,
    ) -> Result<Vec<ClinicalRecord>> {
        if kind.scope() != RecordScope::Ehr {
            return Err(ShasthoError::InvalidState(format!(
                "{kind} records belong to a visit, not an EHR"
            )));
        }
        self.db.list_records(kind, RecordParent::Ehr(ehr_id)).await
    }

    pub async fn get_patient_medical_summary(&self, patient_id: PatientId) -> Result<MedicalSummary> {
        let patient = self.require_patient(patient_id).await?;
        let ehr = self.db.find_ehr_by_patient(patient_id).await?.ok_or_else(|| {
            ShasthoError::NotFound(format!("No EHR found for patient {patient_id}"))
        })?;

        let recent_visits = self
            .get_ehr_visits(ehr.id, SUMMARY_VISITS, 0, SortDir::Desc)
            .await?;
        let mut medications = Vec::new();
        for visit in &recent_visits {
            let records = self
                .db
                .list_records(RecordKind::Medication, RecordParent::Visit(visit.id))
                .await?;
            medications.extend(pick!(records, Medication));
        }

        let parent = RecordParent::Ehr(ehr.id);
        Ok(MedicalSummary {
            allergies: pick!(self.db.list_records(RecordKind::Allergy, parent).await?, Allergy),
            immunizations: pick!(
                self.db.list_records(RecordKind::Immunization, parent).await?,
                Immunization
            ),
            test_results: pick!(
                self.db.list_records(RecordKind::TestResult, parent).await?,
                TestResult
            ),
            patient,
            ehr,
            recent_visits,
            medications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::Gender;
    use chrono::NaiveDate;

    async fn setup() -> (EhrService, Arc<MemoryStore>, PatientId) {
        let db = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let patient = Patient {
            id: PatientId::new(),
            user_id: None,
            full_name: "Nadia Rahman".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 14).unwrap(),
            gender: Gender::Female,
            contact_number: "+8801712345678".into(),
            address: "House 12, Road 5, Dhanmondi".into(),
            emergency_contact_name: "Karim Rahman".into(),
            emergency_contact_number: "01812345678".into(),
            created_at: now,
            updated_at: now,
        };
        db.insert_patient(&patient).await.unwrap();
        (EhrService::new(db.clone()), db, patient.id)
    }

    fn visit_form(date: &str, time: &str) -> FormData {
        FormData::new()
            .with("date", date)
            .with("time", time)
            .with("visit_type", "Outpatient")
    }

    #[tokio::test]
    async fn test_create_patient_ehr_is_idempotent() {
        let (svc, _, patient_id) = setup().await;
        let first = svc.create_patient_ehr(patient_id).await.unwrap();
        let second = svc.create_patient_ehr(patient_id).await.unwrap();
        assert_eq!(first.id, second.id);

        let err = svc.create_patient_ehr(PatientId::new()).await.unwrap_err();
        assert!(matches!(err, ShasthoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_visits_sorted_by_date_and_time() {
        let (svc, _, patient_id) = setup().await;
        let ehr = svc.create_patient_ehr(patient_id).await.unwrap();
        svc.add_visit(ehr.id, &visit_form("2025-01-10", "09:00"), None)
            .await
            .unwrap();
        svc.add_visit(ehr.id, &visit_form("2025-03-02", "14:30"), None)
            .await
            .unwrap();
        svc.add_visit(ehr.id, &visit_form("2025-03-02", "08:15:00"), None)
            .await
            .unwrap();

        let newest = svc.get_ehr_visits(ehr.id, 10, 0, SortDir::Desc).await.unwrap();
        let times: Vec<String> = newest
            .iter()
            .map(|v| format!("{} {}", v.date, v.time.format("%H:%M")))
            .collect();
        assert_eq!(
            times,
            vec!["2025-03-02 14:30", "2025-03-02 08:15", "2025-01-10 09:00"]
        );

        let oldest = svc.get_ehr_visits(ehr.id, 1, 0, SortDir::Asc).await.unwrap();
        assert_eq!(oldest.len(), 1);
        assert_eq!(oldest[0].date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }

    #[tokio::test]
    async fn test_visit_rejects_bad_time() {
        let (svc, _, patient_id) = setup().await;
        let ehr = svc.create_patient_ehr(patient_id).await.unwrap();
        let err = svc
            .add_visit(ehr.id, &visit_form("2025-01-10", "9am"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid time format"));
    }

    #[tokio::test]
    async fn test_diagnosis_without_visit_is_rejected() {
        let (svc, _, _) = setup().await;
        let form = FormData::new()
            .with("diagnosis_code", "I10")
            .with("diagnosis_description", "Essential hypertension");
        let err = svc
            .add_record(RecordKind::Diagnosis, &form, Authorship::default())
            .await
            .unwrap_err();
        let ShasthoError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.message_for("visit_id"), Some("This field is required"));
    }

    #[tokio::test]
    async fn test_visit_details_collects_records() {
        let (svc, _, patient_id) = setup().await;
        let ehr = svc.create_patient_ehr(patient_id).await.unwrap();
        let visit = svc
            .add_visit(ehr.id, &visit_form("2025-03-02", "10:00"), None)
            .await
            .unwrap();
        let doctor = DoctorId::new();
        let by = Authorship {
            doctor: Some(doctor),
            user: None,
        };

        svc.add_record(
            RecordKind::Diagnosis,
            &FormData::new()
                .with("visit_id", visit.id.to_string())
                .with("diagnosis_code", "I10")
                .with("diagnosis_description", "Essential hypertension"),
            by,
        )
        .await
        .unwrap();
        svc.add_record(
            RecordKind::Vital,
            &FormData::new()
                .with("visit_id", visit.id.to_string())
                .with("temperature", "37.2")
                .with("pulse", "72")
                .with("blood_pressure", "120/80"),
            by,
        )
        .await
        .unwrap();

        let details = svc.get_visit_details(visit.id).await.unwrap();
        assert_eq!(details.diagnoses.len(), 1);
        assert_eq!(details.diagnoses[0].diagnosed_by, Some(doctor));
        assert_eq!(details.vitals[0].pulse, Some(72));
        assert!(details.medications.is_empty());
    }

    #[tokio::test]
    async fn test_update_record_keeps_identity() {
        let (svc, _, patient_id) = setup().await;
        let ehr = svc.create_patient_ehr(patient_id).await.unwrap();
        let form = FormData::new()
            .with("ehr_id", ehr.id.to_string())
            .with("allergen", "Penicillin")
            .with("reaction", "Hives")
            .with("severity", "Moderate");
        let created = svc
            .add_record(RecordKind::Allergy, &form, Authorship::default())
            .await
            .unwrap();

        let edit = FormData::new()
            .with("allergen", "Penicillin")
            .with("reaction", "Anaphylaxis")
            .with("severity", "Severe");
        let updated = svc
            .update_record(RecordKind::Allergy, created.id(), &edit, Authorship::default())
            .await
            .unwrap();
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.created_at(), created.created_at());
        assert_eq!(updated.parent(), RecordParent::Ehr(ehr.id));

        let stored = svc.get_record(RecordKind::Allergy, created.id()).await.unwrap();
        let ClinicalRecord::Allergy(allergy) = stored else {
            panic!("expected allergy");
        };
        assert_eq!(allergy.reaction, "Anaphylaxis");
    }

    #[tokio::test]
    async fn test_record_scope_is_checked_on_listing() {
        let (svc, _, patient_id) = setup().await;
        let ehr = svc.create_patient_ehr(patient_id).await.unwrap();
        let err = svc
            .list_ehr_records(RecordKind::Diagnosis, ehr.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::InvalidState(_)));
        assert!(svc
            .list_ehr_records(RecordKind::Allergy, ehr.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_medical_summary() {
        let (svc, _, patient_id) = setup().await;
        let err = svc
            .get_patient_medical_summary(patient_id)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No EHR found"));

        let ehr = svc.create_patient_ehr(patient_id).await.unwrap();
        let mut visits = Vec::new();
        for day in 1..=4 {
            let visit = svc
                .add_visit(ehr.id, &visit_form(&format!("2025-02-0{day}"), "09:00"), None)
                .await
                .unwrap();
            visits.push(visit);
        }
        // medication on the oldest visit falls outside the summary window
        for visit in [&visits[0], &visits[3]] {
            svc.add_record(
                RecordKind::Medication,
                &FormData::new()
                    .with("visit_id", visit.id.to_string())
                    .with("medication_name", "Amlodipine")
                    .with("dosage", "5mg")
                    .with("frequency", "Once daily")
                    .with("start_date", "2025-02-01"),
                Authorship::default(),
            )
            .await
            .unwrap();
        }

        let summary = svc.get_patient_medical_summary(patient_id).await.unwrap();
        assert_eq!(summary.recent_visits.len(), SUMMARY_VISITS);
        assert_eq!(summary.recent_visits[0].id, visits[3].id);
        assert_eq!(summary.medications.len(), 1);
        assert_eq!(summary.medications[0].visit_id, visits[3].id);
    }

    #[test]
    fn test_sort_dir_parse() {
        assert_eq!("ASC".parse::<SortDir>().unwrap(), SortDir::Asc);
        assert_eq!(SortDir::default(), SortDir::Desc);
        assert!("sideways".parse::<SortDir>().is_err());
    }
}
