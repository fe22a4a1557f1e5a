//! Care delivery records: hospitals, departments, patients, doctors and the
//! scheduling tables that connect them.

use super::enums::{AppointmentStatus, Gender};
use super::ids::{
    AppointmentId, DepartmentId, DoctorId, HospitalId, PatientId, SlotId, UserId,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub contact_number: String,
    pub address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub specialization: String,
    pub credentials: String,
    pub contact_number: String,
    pub hospital_id: Option<HospitalId>,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Weekly recurring window in which a doctor accepts bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: SlotId,
    pub doctor_id: DoctorId,
    /// 0 = Monday … 6 = Sunday
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub slot_duration_minutes: u32,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    pub const DEFAULT_DURATION_MINUTES: u32 = 30;

    /// True when this slot repeats on `date` and `date` is inside its validity window
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_monday() as u8;
        weekday == self.day_of_week
            && date >= self.valid_from
            && self.valid_until.map_or(true, |until| date <= until)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub hospital_id: HospitalId,
    pub department_id: DepartmentId,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Half-open time window `[start, end)` within one day, written `HH:MM - HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if end <= start {
            return Err(format!(
                "Slot end {} must be after start {}",
                end.format("%H:%M"),
                start.format("%H:%M")
            ));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} - {:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%I:%M %p"))
        .ok()
}

impl FromStr for TimeSlot {
    type Err = String;

    /// Accepts `09:00 - 09:30` and `9:00 AM - 9:30 AM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(" - ")
            .ok_or_else(|| "Invalid time slot format".to_string())?;
        let start = parse_clock(start).ok_or_else(|| "Invalid time format".to_string())?;
        let end = parse_clock(end).ok_or_else(|| "Invalid time format".to_string())?;
        TimeSlot::new(start, end)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_time_slot_parse_24h_and_12h() {
        let a: TimeSlot = "09:00 - 09:30".parse().unwrap();
        let b: TimeSlot = "9:00 AM - 9:30 AM".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "09:00 - 09:30");
        assert_eq!(a.duration_minutes(), 30);
    }

    #[test]
    fn test_time_slot_rejects_reversed_window() {
        assert!("10:00 - 09:00".parse::<TimeSlot>().is_err());
        assert!("10:00".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = TimeSlot::new(t(9, 0), t(9, 30)).unwrap();
        let b = TimeSlot::new(t(9, 30), t(10, 0)).unwrap();
        let c = TimeSlot::new(t(9, 15), t(9, 45)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_slot_applies_on_weekday_within_validity() {
        let now = Utc::now();
        let slot = AvailabilitySlot {
            id: SlotId::new(),
            doctor_id: DoctorId::new(),
            day_of_week: 0,
            start_time: t(9, 0),
            end_time: t(12, 0),
            is_available: true,
            slot_duration_minutes: 30,
            valid_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            valid_until: Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            created_at: now,
            updated_at: now,
        };
        // 2025-03-03 is a Monday
        assert!(slot.applies_on(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()));
        assert!(!slot.applies_on(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()));
        assert!(!slot.applies_on(NaiveDate::from_ymd_opt(2025, 7, 7).unwrap()));
    }
}
