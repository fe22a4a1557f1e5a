//! Domain models and types for Shastho.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`DoctorId`], [`EhrId`], …)
//! - **Enumerated column values** ([`UserRole`], [`AppointmentStatus`], [`AdminRequestStatus`], …)
//! - **Records** for accounts, care delivery and the electronic health record
//! - **Error types** ([`ShasthoError`]) and the [`Result`] alias
//!
//! ```rust
//! use shastho::domain::{PatientId, DoctorId};
//!
//! let patient = PatientId::new();
//! let doctor = DoctorId::new();
//! // let wrong: PatientId = doctor; // does not compile
//! # let _ = (patient, doctor);
//! ```

pub mod accounts;
pub mod care;
pub mod ehr;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod result;

pub use accounts::{
    DoctorNote, HospitalAdmin, PasswordResetToken, RoleProfile, TestAdmin, TestImageAdminRequest,
    User, UserSession,
};
pub use care::{Appointment, AvailabilitySlot, Department, Doctor, Hospital, Patient, TimeSlot};
pub use ehr::{
    Allergy, ClinicalRecord, Diagnosis, Ehr, Immunization, Medication, Prescription, Procedure,
    ProviderNote, RecordKind, RecordParent, RecordScope, TestResult, Visit, Vital,
};
pub use enums::{
    AdminRequestStatus, AllergySeverity, AppointmentStatus, Gender, Language, UserRole, UserStatus,
};
pub use errors::{FieldError, ShasthoError, ValidationErrors};
pub use ids::{
    AdminRequestId, AppointmentId, DepartmentId, DoctorId, DoctorNoteId, EhrId, HospitalAdminId,
    HospitalId, PatientId, RecordId, ResetTokenId, SessionId, SlotId, TestAdminId, UserId,
    VisitId,
};
pub use result::Result;
