use thiserror::Error;

use crate::forms::RegistrationErrors;

/// The key-value store could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("failed to encode record: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("verification code is wrong or expired")]
    InvalidCode,
    #[error("email or password is incorrect")]
    InvalidCredentials,
    #[error("login provider unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("registration form is invalid: {0}")]
    Invalid(RegistrationErrors),
    #[error("an account already exists for {0}")]
    DuplicateEmail(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Umbrella error for callers driving several session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
