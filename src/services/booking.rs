//! Doctor availability and appointment booking

use crate::adapters::database::{CareStore, DatabaseClient};
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, AvailabilitySlot, Doctor, DoctorId, PatientId,
    Result, ShasthoError, SlotId, TimeSlot,
};
use crate::validation::{rules, FormData};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A bookable window on a specific date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenSlot {
    pub start: String,
    pub end: String,
    pub duration: u32,
}

fn parse_clock(form: &FormData, field: &str) -> Result<NaiveTime> {
    let raw = form.require(field)?;
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ShasthoError::invalid_field(field, "Invalid time format. Use HH:MM"))
}

/// Cuts `slot` into consecutive windows of its duration that end by `end_time`
fn windows(slot: &AvailabilitySlot) -> Vec<TimeSlot> {
    let step = Duration::minutes(i64::from(slot.slot_duration_minutes));
    let mut out = Vec::new();
    if step <= Duration::zero() {
        return out;
    }
    let mut cursor = slot.start_time;
    loop {
        let (next, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 || next > slot.end_time {
            break;
        }
        if let Ok(window) = TimeSlot::new(cursor, next) {
            out.push(window);
        }
        cursor = next;
    }
    out
}

pub struct BookingService {
    db: Arc<dyn DatabaseClient>,
}

impl BookingService {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    async fn require_doctor(&self, doctor_id: DoctorId) -> Result<Doctor> {
        self.db
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Doctor {doctor_id} not found")))
    }

    async fn require_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        self.db
            .get_appointment(id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("Appointment {id} not found")))
    }

    pub async fn add_slot(&self, doctor_id: DoctorId, form: &FormData) -> Result<AvailabilitySlot> {
        self.require_doctor(doctor_id).await?;
        rules::availability_slot().check(form)?;

        let start_time = parse_clock(form, "start_time")?;
        let end_time = parse_clock(form, "end_time")?;
        if end_time <= start_time {
            return Err(ShasthoError::invalid_field(
                "end_time",
                "End time must be after start time",
            ));
        }

        let now = Utc::now();
        let valid_from = form.date("valid_from")?.unwrap_or_else(|| now.date_naive());
        let valid_until = form.date("valid_until")?;
        if valid_until.is_some_and(|until| until < valid_from) {
            return Err(ShasthoError::invalid_field(
                "valid_until",
                "Must not be before valid_from",
            ));
        }

        let slot = AvailabilitySlot {
            id: SlotId::new(),
            doctor_id,
            day_of_week: form.parse_required("day_of_week")?,
            start_time,
            end_time,
            is_available: form.flag("is_available", true),
            slot_duration_minutes: form
                .parse("slot_duration_minutes")?
                .unwrap_or(AvailabilitySlot::DEFAULT_DURATION_MINUTES),
            valid_from,
            valid_until,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_slot(&slot).await?;
        tracing::info!(
            doctor_id = %doctor_id,
            day_of_week = slot.day_of_week,
            "Availability slot added"
        );
        Ok(slot)
    }

    pub async fn list_slots(&self, doctor_id: DoctorId) -> Result<Vec<AvailabilitySlot>> {
        self.db.list_slots(doctor_id).await
    }

    /// Removes one of `doctor_id`'s slots
    pub async fn delete_slot(&self, doctor_id: DoctorId, slot_id: SlotId) -> Result<()> {
        let owned = self
            .db
            .list_slots(doctor_id)
            .await?
            .iter()
            .any(|s| s.id == slot_id);
        if !owned || !self.db.delete_slot(slot_id).await? {
            return Err(ShasthoError::NotFound(format!("Slot {slot_id} not found")));
        }
        Ok(())
    }

    /// Free windows for `doctor_id` on `date`, earliest first
    pub async fn available_slots(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<OpenSlot>> {
        let booked: Vec<TimeSlot> = self
            .db
            .list_doctor_appointments(doctor_id, Some(date))
            .await?
            .into_iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .map(|a| a.time_slot)
            .collect();

        let mut open = BTreeSet::new();
        for slot in self.db.list_slots(doctor_id).await? {
            if !slot.is_available || !slot.applies_on(date) {
                continue;
            }
            for window in windows(&slot) {
                if booked.iter().any(|b| b.overlaps(&window)) {
                    continue;
                }
                open.insert((window.start, window.end, slot.slot_duration_minutes));
            }
        }

        Ok(open
            .into_iter()
            .map(|(start, end, duration)| OpenSlot {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
                duration,
            })
            .collect())
    }

    pub async fn book(&self, patient_id: PatientId, form: &FormData) -> Result<Appointment> {
        rules::appointment().check(form)?;
        let doctor_id: DoctorId = form.parse_required("doctor_id")?;
        self.require_doctor(doctor_id).await?;

        let time_slot: TimeSlot = form
            .require("appointment_time")?
            .parse::<TimeSlot>()
            .map_err(|e| ShasthoError::invalid_field("appointment_time", e))?;

        let now = Utc::now();
        let appointment = Appointment {
            id: AppointmentId::new(),
            patient_id,
            doctor_id,
            hospital_id: form.parse_required("hospital_id")?,
            department_id: form.parse_required("department_id")?,
            date: form.date_required("appointment_date")?,
            time_slot,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        self.db.book_appointment(&appointment).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            doctor_id = %doctor_id,
            date = %appointment.date,
            slot = %appointment.time_slot,
            "Appointment booked"
        );
        Ok(appointment)
    }

    /// Patient-initiated cancellation of an upcoming appointment
    pub async fn cancel(
        &self,
        patient_id: PatientId,
        appointment_id: AppointmentId,
    ) -> Result<Appointment> {
        let mut appointment = self.require_appointment(appointment_id).await?;
        if appointment.patient_id != patient_id {
            return Err(ShasthoError::Forbidden(
                "You can only cancel your own appointments".to_string(),
            ));
        }
        match appointment.status {
            AppointmentStatus::Completed => {
                return Err(ShasthoError::InvalidState(
                    "Cannot cancel a completed appointment".to_string(),
                ))
            }
            AppointmentStatus::Cancelled => {
                return Err(ShasthoError::InvalidState(
                    "Appointment is already cancelled".to_string(),
                ))
            }
            _ => {}
        }
        if appointment.date < Utc::now().date_naive() {
            return Err(ShasthoError::InvalidState(
                "Cannot cancel past appointments".to_string(),
            ));
        }

        let previous = appointment.status;
        appointment.status = AppointmentStatus::Cancelled;
        appointment.updated_at = Utc::now();
        self.db.update_appointment(&appointment).await?;
        crate::log_status_transition!("appointment", appointment.id, previous, appointment.status);
        Ok(appointment)
    }

    /// Doctor marks one of their appointments completed or no-show
    pub async fn set_status(
        &self,
        doctor_id: DoctorId,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        if !matches!(
            status,
            AppointmentStatus::Completed | AppointmentStatus::NoShow
        ) {
            return Err(ShasthoError::invalid_field(
                "status",
                "Must be one of: completed, no-show",
            ));
        }
        let mut appointment = self.require_appointment(appointment_id).await?;
        if appointment.doctor_id != doctor_id {
            return Err(ShasthoError::Forbidden(
                "Appointment belongs to another doctor".to_string(),
            ));
        }
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(ShasthoError::InvalidState(
                "Appointment has been cancelled".to_string(),
            ));
        }

        let previous = appointment.status;
        appointment.status = status;
        appointment.updated_at = Utc::now();
        self.db.update_appointment(&appointment).await?;
        crate::log_status_transition!("appointment", appointment.id, previous, status);
        Ok(appointment)
    }

    pub async fn patient_appointments(&self, patient_id: PatientId) -> Result<Vec<Appointment>> {
        self.db.list_patient_appointments(patient_id).await
    }

    pub async fn doctor_appointments(
        &self,
        doctor_id: DoctorId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>> {
        self.db.list_doctor_appointments(doctor_id, date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{Department, DepartmentId, Gender, Hospital, HospitalId, Patient};
    use chrono::Datelike;

    struct Fixture {
        svc: BookingService,
        doctor: DoctorId,
        patient: PatientId,
        hospital: HospitalId,
        department: DepartmentId,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(MemoryStore::new());
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
        let hospital = Hospital {
            id: HospitalId::new(),
            name: "Square Hospital".into(),
            address: "18/F Bir Uttam Qazi Nuruzzaman Sarak".into(),
            city: "Dhaka".into(),
            state: "Dhaka".into(),
            postal_code: "1205".into(),
            phone: "0281441999".into(),
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
        db.insert_hospital(&hospital).await.unwrap();
        db.insert_department(&department).await.unwrap();
        db.insert_doctor(&doctor).await.unwrap();
        db.insert_patient(&patient).await.unwrap();
        Fixture {
            svc: BookingService::new(db),
            doctor: doctor.id,
            patient: patient.id,
            hospital: hospital.id,
            department: department.id,
        }
    }

    /// Next Monday strictly after today
    fn next_monday() -> NaiveDate {
        let today = Utc::now().date_naive();
        let ahead = 7 - today.weekday().num_days_from_monday();
        today + Duration::days(i64::from(ahead))
    }

    fn slot_form(start: &str, end: &str) -> FormData {
        FormData::new()
            .with("day_of_week", "0")
            .with("start_time", start)
            .with("end_time", end)
            .with("valid_from", "2020-01-01")
    }

    fn booking_form(f: &Fixture, date: NaiveDate, time: &str) -> FormData {
        FormData::new()
            .with("doctor_id", f.doctor.to_string())
            .with("hospital_id", f.hospital.to_string())
            .with("department_id", f.department.to_string())
            .with("appointment_date", date.format("%Y-%m-%d").to_string())
            .with("appointment_time", time)
    }

    #[tokio::test]
    async fn test_slot_end_must_follow_start() {
        let f = fixture().await;
        let err = f
            .svc
            .add_slot(f.doctor, &slot_form("10:00", "09:00"))
            .await
            .unwrap_err();
        let ShasthoError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.message_for("end_time"),
            Some("End time must be after start time")
        );
    }

    #[tokio::test]
    async fn test_slot_defaults() {
        let f = fixture().await;
        let slot = f
            .svc
            .add_slot(
                f.doctor,
                &FormData::new()
                    .with("day_of_week", "2")
                    .with("start_time", "09:00")
                    .with("end_time", "12:00"),
            )
            .await
            .unwrap();
        assert_eq!(slot.slot_duration_minutes, 30);
        assert!(slot.is_available);
        assert_eq!(slot.valid_from, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_available_slots_skip_booked_windows() {
        let f = fixture().await;
        f.svc
            .add_slot(f.doctor, &slot_form("09:00", "10:40"))
            .await
            .unwrap();
        let monday = next_monday();

        let open = f.svc.available_slots(f.doctor, monday).await.unwrap();
        let starts: Vec<&str> = open.iter().map(|s| s.start.as_str()).collect();
        // 10:30 - 11:00 would overrun the slot
        assert_eq!(starts, vec!["09:00", "09:30", "10:00"]);
        assert!(open.iter().all(|s| s.duration == 30));

        f.svc
            .book(f.patient, &booking_form(&f, monday, "09:30 - 10:00"))
            .await
            .unwrap();
        let open = f.svc.available_slots(f.doctor, monday).await.unwrap();
        let starts: Vec<&str> = open.iter().map(|s| s.start.as_str()).collect();
        assert_eq!(starts, vec!["09:00", "10:00"]);

        let tuesday = monday + Duration::days(1);
        assert!(f.svc.available_slots(f.doctor, tuesday).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_double_booking_conflicts() {
        let f = fixture().await;
        let monday = next_monday();
        f.svc
            .book(f.patient, &booking_form(&f, monday, "09:00 - 09:30"))
            .await
            .unwrap();
        let err = f
            .svc
            .book(f.patient, &booking_form(&f, monday, "9:15 AM - 9:45 AM"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Conflict: This time slot is no longer available"
        );
        // adjacent window is fine
        f.svc
            .book(f.patient, &booking_form(&f, monday, "09:30 - 10:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_booking_unknown_hospital_not_found() {
        let f = fixture().await;
        let form = booking_form(&f, next_monday(), "09:00 - 09:30")
            .with("hospital_id", HospitalId::new().to_string());
        let err = f.svc.book(f.patient, &form).await.unwrap_err();
        assert!(matches!(err, ShasthoError::NotFound(_)));
        assert!(f
            .svc
            .patient_appointments(f.patient)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_booking_requires_fields() {
        let f = fixture().await;
        let err = f
            .svc
            .book(f.patient, &FormData::new().with("doctor_id", f.doctor.to_string()))
            .await
            .unwrap_err();
        let ShasthoError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.message_for("appointment_time").is_some());
        assert!(errors.message_for("hospital_id").is_some());
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let f = fixture().await;
        let monday = next_monday();
        let appointment = f
            .svc
            .book(f.patient, &booking_form(&f, monday, "09:00 - 09:30"))
            .await
            .unwrap();

        let err = f
            .svc
            .cancel(PatientId::new(), appointment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Forbidden(_)));

        let cancelled = f.svc.cancel(f.patient, appointment.id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let err = f.svc.cancel(f.patient, appointment.id).await.unwrap_err();
        assert!(matches!(err, ShasthoError::InvalidState(_)));

        // the freed window can be booked again
        f.svc
            .book(f.patient, &booking_form(&f, monday, "09:00 - 09:30"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_past_appointment_cannot_be_cancelled() {
        let f = fixture().await;
        let past = Utc::now().date_naive() - Duration::days(3);
        let appointment = f
            .svc
            .book(f.patient, &booking_form(&f, past, "09:00 - 09:30"))
            .await
            .unwrap();
        let err = f.svc.cancel(f.patient, appointment.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid state: Cannot cancel past appointments");
    }

    #[tokio::test]
    async fn test_doctor_sets_status() {
        let f = fixture().await;
        let appointment = f
            .svc
            .book(f.patient, &booking_form(&f, next_monday(), "11:00 - 11:30"))
            .await
            .unwrap();
        let err = f
            .svc
            .set_status(f.doctor, appointment.id, AppointmentStatus::Scheduled)
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Validation(_)));

        let done = f
            .svc
            .set_status(f.doctor, appointment.id, AppointmentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);
        let err = f.svc.cancel(f.patient, appointment.id).await.unwrap_err();
        assert!(err.to_string().contains("completed"));
    }
}
