//! Domain identifier types
//!
//! Every table is keyed by a UUID v4. Each entity kind gets its own newtype so a
//! `PatientId` can never be handed to a function expecting a `DoctorId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| format!("Invalid {} '{}'", $label, s))
            }
        }
    };
}

define_id!(
    /// Login account identifier
    UserId, "user id"
);
define_id!(HospitalId, "hospital id");
define_id!(DepartmentId, "department id");
define_id!(
    /// Patient profile identifier (distinct from the patient's login account)
    PatientId, "patient id"
);
define_id!(
    /// Doctor profile identifier (distinct from the doctor's login account)
    DoctorId, "doctor id"
);
define_id!(SlotId, "availability slot id");
define_id!(AppointmentId, "appointment id");
define_id!(HospitalAdminId, "hospital admin id");
define_id!(TestAdminId, "test admin id");
define_id!(AdminRequestId, "admin request id");
define_id!(DoctorNoteId, "doctor note id");
define_id!(SessionId, "session id");
define_id!(ResetTokenId, "reset token id");
define_id!(
    /// Electronic health record identifier; one per patient
    EhrId, "EHR id"
);
define_id!(VisitId, "visit id");
define_id!(
    /// Identifier of any clinical record hanging off a visit or an EHR
    RecordId, "record id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let id = PatientId::new();
        let parsed: PatientId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<VisitId>().unwrap_err();
        assert!(err.contains("visit id"));
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = EhrId::from_uuid(uuid);
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            serde_json::Value::String(uuid.to_string())
        );
    }
}
