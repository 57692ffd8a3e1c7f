//! Signup form validation.
//!
//! Validation is exhaustive: every offending field is reported at once so the
//! form can be redisplayed with all messages. Nothing is written until a form
//! validates.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use rolegate_core::Email;

use crate::{Gender, RequestedRole};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Secret that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Raw signup submission as posted by the browser.
#[derive(Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: String,
}

impl core::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("gender", &self.gender)
            .field("date_of_birth", &self.date_of_birth)
            .finish_non_exhaustive()
    }
}

/// A signup that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSignup {
    pub email: Email,
    pub password: Password,
    pub requested_role: RequestedRole,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid fields: {}", .fields.iter().map(|f| f.field).collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// One line per field, suitable for redisplaying the form.
    pub fn user_message(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl SignupForm {
    /// Validate against `today` (dates of birth in the future are refused).
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedSignup, ValidationErrors> {
        let mut fields = Vec::new();
        let mut fail = |field: &'static str, message: String| fields.push(FieldError { field, message });

        let email = Email::parse(&self.email)
            .map_err(|e| fail("email", e.reason().to_string()))
            .ok();

        if self.password.is_empty() {
            fail("password", "password is required".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            fail("password", format!("password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        if self.confirm != self.password {
            fail("confirm", "passwords must match".into());
        }

        let requested_role = self
            .role
            .parse::<RequestedRole>()
            .map_err(|_| fail("role", "role must be one of: student, lecturer, admin".into()))
            .ok();

        let gender = self
            .gender
            .parse::<Gender>()
            .map_err(|e| fail("gender", e.reason().to_string()))
            .ok();

        let date_of_birth = match self.date_of_birth.trim() {
            "" => {
                fail("date_of_birth", "please enter your date of birth".into());
                None
            }
            raw => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(d) if d > today => {
                    fail("date_of_birth", "date of birth cannot be in the future".into());
                    None
                }
                Ok(d) => Some(d),
                Err(_) => {
                    fail("date_of_birth", "date of birth must be YYYY-MM-DD".into());
                    None
                }
            },
        };

        match (email, requested_role, gender, date_of_birth) {
            (Some(email), Some(requested_role), Some(gender), Some(date_of_birth)) if fields.is_empty() => {
                Ok(ValidatedSignup {
                    email,
                    password: Password::new(self.password.clone()),
                    requested_role,
                    gender,
                    date_of_birth,
                })
            }
            _ => Err(ValidationErrors { fields }),
        }
    }
}
