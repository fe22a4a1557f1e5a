//! Enumerated column values
//!
//! Each enum is stored as lowercase text in PostgreSQL (guarded by a CHECK
//! constraint) and serialized with the same spelling over JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Comma separated list of accepted spellings
            pub fn choices() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "Invalid {} '{}'. Must be one of: {}",
                        stringify!($name),
                        other,
                        Self::choices()
                    )),
                }
            }
        }
    };
}

text_enum!(
    /// Account role; decides which routes a user may reach
    UserRole {
        Admin => "admin",
        Doctor => "doctor",
        Patient => "patient",
        Staff => "staff",
        HospitalAdmin => "hospital_admin",
        TestAdmin => "test_admin",
        RegulatoryBody => "regulatory_body",
    }
);

impl UserRole {
    /// Roles whose accounts must be approved before they can sign in
    pub fn requires_approval(&self) -> bool {
        matches!(
            self,
            UserRole::Doctor | UserRole::HospitalAdmin | UserRole::TestAdmin
        )
    }
}

text_enum!(
    UserStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
);

text_enum!(
    Language {
        English => "english",
        Bangla => "bangla",
    }
);

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

text_enum!(
    Gender {
        Male => "male",
        Female => "female",
        Other => "other",
    }
);

text_enum!(
    AppointmentStatus {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
        NoShow => "no-show",
    }
);

text_enum!(
    /// Review state of an administrative request
    AdminRequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

impl AdminRequestStatus {
    /// Only a pending request can be decided, and only once
    pub fn can_transition_to(&self, next: AdminRequestStatus) -> bool {
        matches!(
            (self, next),
            (AdminRequestStatus::Pending, AdminRequestStatus::Approved)
                | (AdminRequestStatus::Pending, AdminRequestStatus::Rejected)
        )
    }
}

text_enum!(
    AllergySeverity {
        Mild => "Mild",
        Moderate => "Moderate",
        Severe => "Severe",
        LifeThreatening => "Life-threatening",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_text_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), *role);
        }
    }

    #[test]
    fn test_unknown_value_lists_choices() {
        let err = "unknown".parse::<Gender>().unwrap_err();
        assert!(err.contains("male, female, other"));
    }

    #[test]
    fn test_no_show_spelling() {
        assert_eq!(AppointmentStatus::NoShow.as_str(), "no-show");
        assert_eq!(
            serde_json::to_value(AppointmentStatus::NoShow).unwrap(),
            serde_json::json!("no-show")
        );
    }

    #[test]
    fn test_admin_request_transitions() {
        use AdminRequestStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_roles_requiring_approval() {
        assert!(UserRole::Doctor.requires_approval());
        assert!(UserRole::TestAdmin.requires_approval());
        assert!(!UserRole::Patient.requires_approval());
        assert!(!UserRole::Admin.requires_approval());
    }
}
