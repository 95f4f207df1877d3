use std::collections::HashMap;

use uuid::Uuid;

use crate::common::{Credentials, LoginError, RegistrationError, Token, User, UserType};
use crate::forms::{self, RegistrationForm};

pub const DEFAULT_PROFILE_IMAGE: &str =
    "https://images.pexels.com/photos/3771836/pexels-photo-3771836.jpeg";

/// Turns a login or registration attempt into a token + user pair.
pub trait CredentialService {
    /// Requests an SMS code for `phone`.
    fn send_verification_code(&mut self, phone: &str) -> Result<(), LoginError>;

    fn verify_code(&mut self, phone: &str, code: &str) -> Result<Credentials, LoginError>;

    fn login_with_wechat(&mut self) -> Result<Credentials, LoginError>;

    fn verify_password(&mut self, email: &str, password: &str) -> Result<Credentials, LoginError>;

    fn register(&mut self, form: &RegistrationForm) -> Result<Credentials, RegistrationError>;
}

struct Account {
    password: String,
    user: User,
}

/// Local stand-in for the account backend.
///
/// Accepts any well-formed phone/code pair and any password for an email it
/// has not seen; emails registered through it must log in with their
/// password and cannot be registered twice.
#[derive(Default)]
pub struct MockCredentialService {
    accounts: HashMap<String, Account>,
}

impl MockCredentialService {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(prefix: &str) -> Token {
        Token::new(format!("{prefix}_{}", Uuid::new_v4().simple()))
    }
}

impl CredentialService for MockCredentialService {
    fn send_verification_code(&mut self, phone: &str) -> Result<(), LoginError> {
        if !forms::is_valid_phone(phone) {
            return Err(LoginError::InvalidPhone);
        }
        log::info!("Sending verification code to {phone}");
        Ok(())
    }

    fn verify_code(&mut self, phone: &str, code: &str) -> Result<Credentials, LoginError> {
        if !forms::is_valid_phone(phone) {
            return Err(LoginError::InvalidPhone);
        }
        if !forms::is_valid_code(code) {
            return Err(LoginError::InvalidCode);
        }

        let suffix = &phone[phone.len() - 4..];
        let mut user = User::new(format!("user_{}", Uuid::new_v4().simple()), format!("用户{suffix}"));
        user.phone = Some(phone.to_string());
        user.profile_image = Some(DEFAULT_PROFILE_IMAGE.to_string());
        user.user_type = Some(UserType::Employer);

        Ok(Credentials {
            token: Self::issue("mock_token"),
            user,
        })
    }

    fn login_with_wechat(&mut self) -> Result<Credentials, LoginError> {
        let mut user = User::new(format!("wechat_user_{}", Uuid::new_v4().simple()), "微信用户");
        user.profile_image = Some(DEFAULT_PROFILE_IMAGE.to_string());
        user.user_type = Some(UserType::Employer);

        Ok(Credentials {
            token: Self::issue("wechat_token"),
            user,
        })
    }

    fn verify_password(&mut self, email: &str, password: &str) -> Result<Credentials, LoginError> {
        if !forms::is_valid_email(email) || password.is_empty() {
            return Err(LoginError::InvalidCredentials);
        }

        let key = email.to_lowercase();
        if let Some(account) = self.accounts.get(&key) {
            if account.password != password {
                return Err(LoginError::InvalidCredentials);
            }
            return Ok(Credentials {
                token: Self::issue("mock_token"),
                user: account.user.clone(),
            });
        }

        let name = email.split('@').next().unwrap_or(email);
        let mut user = User::new(format!("user_{}", Uuid::new_v4().simple()), name);
        user.email = Some(email.to_string());
        user.profile_image = Some(DEFAULT_PROFILE_IMAGE.to_string());
        user.user_type = Some(UserType::Employer);

        Ok(Credentials {
            token: Self::issue("mock_token"),
            user,
        })
    }

    fn register(&mut self, form: &RegistrationForm) -> Result<Credentials, RegistrationError> {
        form.validate().map_err(RegistrationError::Invalid)?;

        let key = form.email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(RegistrationError::DuplicateEmail(form.email.clone()));
        }

        let mut user = User::new(format!("user_{}", Uuid::new_v4().simple()), form.name.trim());
        user.email = Some(form.email.clone());
        user.profile_image = Some(DEFAULT_PROFILE_IMAGE.to_string());
        user.user_type = Some(form.user_type);

        self.accounts.insert(
            key,
            Account {
                password: form.password.clone(),
                user: user.clone(),
            },
        );

        Ok(Credentials {
            token: Self::issue("mock_token"),
            user,
        })
    }
}
