//! Field validation for submitted forms
//!
//! A [`ModelValidator`] is a declarative list of checks keyed by field name.
//! Running it over a [`FormData`] collects every failing check into
//! [`ValidationErrors`]; nothing short-circuits, so a client sees all problems
//! at once.
//!
//! A field that is absent or blank only ever reports `required`; the other
//! checks apply to submitted values.
//!
//! ```rust
//! use shastho::validation::{FormData, ModelValidator};
//!
//! let rules = ModelValidator::new()
//!     .required("note_text")
//!     .string_length("note_text", Some(2), Some(10_000));
//!
//! let errors = rules.validate(&FormData::new());
//! assert_eq!(errors.message_for("note_text"), Some("This field is required"));
//! ```

pub mod form;
pub mod rules;

pub use form::FormData;

use crate::domain::{Result, ValidationErrors};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

pub static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

pub static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid phone pattern"));

pub const PHONE_MESSAGE: &str = "Phone number must be 10-15 digits";

#[derive(Debug, Clone)]
enum Check {
    Required,
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Email,
    Date {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    Pattern {
        regex: Regex,
        message: String,
    },
    OneOf {
        choices: Vec<String>,
    },
}

/// Ordered set of field checks
#[derive(Debug, Clone, Default)]
pub struct ModelValidator {
    checks: Vec<(String, Check)>,
}

impl ModelValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(mut self, field: &str, check: Check) -> Self {
        self.checks.push((field.to_string(), check));
        self
    }

    pub fn required(self, field: &str) -> Self {
        self.add(field, Check::Required)
    }

    pub fn string_length(self, field: &str, min: Option<usize>, max: Option<usize>) -> Self {
        self.add(field, Check::Length { min, max })
    }

    pub fn email(self, field: &str) -> Self {
        self.add(field, Check::Email)
    }

    pub fn date(self, field: &str, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        self.add(field, Check::Date { min, max })
    }

    pub fn numeric(self, field: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.add(
            field,
            Check::Numeric {
                min,
                max,
                integer: false,
            },
        )
    }

    pub fn integer(self, field: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.add(
            field,
            Check::Numeric {
                min,
                max,
                integer: true,
            },
        )
    }

    pub fn pattern(self, field: &str, regex: &Regex, message: &str) -> Self {
        self.add(
            field,
            Check::Pattern {
                regex: regex.clone(),
                message: message.to_string(),
            },
        )
    }

    pub fn one_of(self, field: &str, choices: &[&str]) -> Self {
        self.add(
            field,
            Check::OneOf {
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
        )
    }

    /// Runs every check and returns all failures
    pub fn validate(&self, form: &FormData) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for (field, check) in &self.checks {
            let value = form.get(field);
            let Some(value) = value else {
                if matches!(check, Check::Required) {
                    errors.push(field.as_str(), "This field is required", None);
                }
                continue;
            };

            if let Some(message) = run_check(check, value) {
                errors.push(field.as_str(), message, Some(value.to_string()));
            }
        }

        errors
    }

    /// Runs every check and fails with [`crate::domain::ShasthoError::Validation`]
    pub fn check(&self, form: &FormData) -> Result<()> {
        self.validate(form).into_result()
    }
}

fn run_check(check: &Check, value: &str) -> Option<String> {
    match check {
        Check::Required => None,
        Check::Length { min, max } => {
            let len = value.chars().count();
            if let Some(min) = min.filter(|min| len < *min) {
                return Some(format!("Must be at least {min} characters"));
            }
            if let Some(max) = max.filter(|max| len > *max) {
                return Some(format!("Must not exceed {max} characters"));
            }
            None
        }
        Check::Email => {
            (!EMAIL_PATTERN.is_match(value)).then(|| "Invalid email format".to_string())
        }
        Check::Date { min, max } => {
            let Some(date) = form::parse_date(value) else {
                return Some(form::INVALID_DATE.to_string());
            };
            if let Some(min) = min.filter(|min| date < *min) {
                return Some(format!("Date must be on or after {}", min.format("%Y-%m-%d")));
            }
            if let Some(max) = max.filter(|max| date > *max) {
                return Some(format!(
                    "Date must be on or before {}",
                    max.format("%Y-%m-%d")
                ));
            }
            None
        }
        Check::Numeric { min, max, integer } => {
            let number = if *integer {
                value.parse::<i64>().ok().map(|n| n as f64)
            } else {
                value.parse::<f64>().ok().filter(|n| n.is_finite())
            };
            let Some(number) = number else {
                return Some(if *integer {
                    "Must be an integer".to_string()
                } else {
                    "Must be a number".to_string()
                });
            };
            if let Some(min) = min.filter(|min| number < *min) {
                return Some(format!("Must be at least {min}"));
            }
            if let Some(max) = max.filter(|max| number > *max) {
                return Some(format!("Must not exceed {max}"));
            }
            None
        }
        Check::Pattern { regex, message } => {
            (!regex.is_match(value)).then(|| message.clone())
        }
        Check::OneOf { choices } => (!choices.iter().any(|c| c == value))
            .then(|| format!("Must be one of: {}", choices.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_required_reports_missing_and_blank() {
        let rules = ModelValidator::new().required("a").required("b");
        let errors = rules.validate(&FormData::new().with("b", "  "));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message_for("a"), Some("This field is required"));
        assert_eq!(errors.message_for("b"), Some("This field is required"));
    }

    #[test]
    fn test_absent_optional_field_skips_other_checks() {
        let rules = ModelValidator::new()
            .string_length("chief_complaint", Some(2), Some(10))
            .email("email");
        assert!(rules.validate(&FormData::new()).is_empty());
    }

    #[test_case("a", Some("Must be at least 2 characters") ; "too short")]
    #[test_case("ab", None ; "at minimum")]
    #[test_case("abcdef", Some("Must not exceed 5 characters") ; "too long")]
    fn test_string_length(value: &str, expected: Option<&str>) {
        let rules = ModelValidator::new().string_length("f", Some(2), Some(5));
        let errors = rules.validate(&FormData::new().with("f", value));
        assert_eq!(errors.message_for("f"), expected);
    }

    #[test_case("nadia@example.com", true)]
    #[test_case("nadia.rahman+clinic@mail.example.org", true)]
    #[test_case("nadia@", false)]
    #[test_case("nadia@example", false)]
    fn test_email(value: &str, ok: bool) {
        let rules = ModelValidator::new().email("email");
        let errors = rules.validate(&FormData::new().with("email", value));
        assert_eq!(errors.is_empty(), ok);
    }

    #[test_case("+8801712345678", true)]
    #[test_case("0171234567", true)]
    #[test_case("12345", false)]
    #[test_case("017-1234-5678", false)]
    fn test_phone_pattern(value: &str, ok: bool) {
        let rules =
            ModelValidator::new().pattern("contact_number", &PHONE_PATTERN, PHONE_MESSAGE);
        let errors = rules.validate(&FormData::new().with("contact_number", value));
        assert_eq!(errors.is_empty(), ok);
        if !ok {
            assert_eq!(errors.message_for("contact_number"), Some(PHONE_MESSAGE));
        }
    }

    #[test]
    fn test_date_bounds() {
        let max = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let rules = ModelValidator::new().date("dob", None, Some(max));
        let errors = rules.validate(&FormData::new().with("dob", "2025-01-02"));
        assert_eq!(
            errors.message_for("dob"),
            Some("Date must be on or before 2025-01-01")
        );
        let errors = rules.validate(&FormData::new().with("dob", "01/01/2020"));
        assert_eq!(errors.message_for("dob"), Some(form::INVALID_DATE));
        assert!(rules
            .validate(&FormData::new().with("dob", "2024-12-31"))
            .is_empty());
    }

    #[test]
    fn test_numeric_bounds() {
        let rules = ModelValidator::new()
            .numeric("temperature", Some(30.0), Some(45.0))
            .integer("pulse", Some(0.0), None);
        let errors = rules.validate(
            &FormData::new()
                .with("temperature", "50")
                .with("pulse", "72.5"),
        );
        assert_eq!(errors.message_for("temperature"), Some("Must not exceed 45"));
        assert_eq!(errors.message_for("pulse"), Some("Must be an integer"));
    }

    #[test]
    fn test_one_of() {
        let rules = ModelValidator::new().one_of("gender", &["male", "female", "other"]);
        let errors = rules.validate(&FormData::new().with("gender", "unknown"));
        assert_eq!(
            errors.message_for("gender"),
            Some("Must be one of: male, female, other")
        );
    }

    #[test]
    fn test_check_returns_validation_error() {
        let rules = ModelValidator::new().required("visit_id");
        let err = rules.check(&FormData::new()).unwrap_err();
        assert!(matches!(err, crate::domain::ShasthoError::Validation(_)));
    }
}
