//! Typed form records for the login and registration screens.
//!
//! Each form validates field by field and reports one message per named
//! slot, so a screen can render every problem at once.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::UserType;

pub const MIN_PASSWORD_LEN: usize = 6;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email regex"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("code regex"));

/// Mainland mobile number: 11 digits starting with 13-19.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: UserType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirm_password: Option<&'static str>,
}

impl RegistrationErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

impl fmt::Display for RegistrationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = [
            ("name", self.name),
            ("email", self.email),
            ("password", self.password),
            ("confirm_password", self.confirm_password),
        ];
        let messages: Vec<String> = slots
            .iter()
            .filter_map(|(field, message)| message.map(|m| format!("{field}: {m}")))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), RegistrationErrors> {
        let mut errors = RegistrationErrors::default();

        if self.name.trim().is_empty() {
            errors.name = Some("name is required");
        }

        if self.email.is_empty() {
            errors.email = Some("email is required");
        } else if !is_valid_email(&self.email) {
            errors.email = Some("email is invalid");
        }

        if self.password.is_empty() {
            errors.password = Some("password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.password = Some("password must be at least 6 characters");
        }

        if self.password != self.confirm_password {
            errors.confirm_password = Some("passwords do not match");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Phone number + SMS code login.
#[derive(Debug, Clone, Default)]
pub struct PhoneLoginForm {
    pub phone: String,
    pub code: String,
    /// The code field is only required once a code has been requested.
    pub code_sent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneLoginErrors {
    pub phone: Option<&'static str>,
    pub code: Option<&'static str>,
}

impl PhoneLoginForm {
    pub fn validate(&self) -> Result<(), PhoneLoginErrors> {
        let mut errors = PhoneLoginErrors::default();

        if self.phone.is_empty() {
            errors.phone = Some("phone number is required");
        } else if !is_valid_phone(&self.phone) {
            errors.phone = Some("phone number is invalid");
        }

        if self.code_sent && self.code.is_empty() {
            errors.code = Some("verification code is required");
        }

        if errors.phone.is_none() && errors.code.is_none() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
