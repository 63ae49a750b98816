use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sigmut::{ActionContext, SignalContext, State};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
}

/// Which fields the password sign-in/sign-up form asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasswordSignupFields {
    UsernameAndEmail,
    UsernameAndOptionalEmail,
    #[default]
    UsernameOnly,
    EmailOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Username,
    Email,
    OptionalEmail,
    Password,
}

impl SignupField {
    pub fn label(self) -> &'static str {
        match self {
            SignupField::Username => "Username",
            SignupField::Email => "Email",
            SignupField::OptionalEmail => "Email (optional)",
            SignupField::Password => "Password",
        }
    }

    pub fn input_type(self) -> &'static str {
        match self {
            SignupField::Username => "text",
            SignupField::Email | SignupField::OptionalEmail => "email",
            SignupField::Password => "password",
        }
    }
}

impl PasswordSignupFields {
    pub fn fields(self) -> &'static [SignupField] {
        use SignupField::*;
        match self {
            PasswordSignupFields::UsernameAndEmail => &[Username, Email, Password],
            PasswordSignupFields::UsernameAndOptionalEmail => &[Username, OptionalEmail, Password],
            PasswordSignupFields::UsernameOnly => &[Username, Password],
            PasswordSignupFields::EmailOnly => &[Email, Password],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PasswordSignupFields::UsernameAndEmail => "USERNAME_AND_EMAIL",
            PasswordSignupFields::UsernameAndOptionalEmail => "USERNAME_AND_OPTIONAL_EMAIL",
            PasswordSignupFields::UsernameOnly => "USERNAME_ONLY",
            PasswordSignupFields::EmailOnly => "EMAIL_ONLY",
        }
    }
}

impl fmt::Display for PasswordSignupFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountsError {
    #[error("unknown password signup fields: {0}")]
    UnknownSignupFields(String),
}

impl FromStr for PasswordSignupFields {
    type Err = AccountsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "USERNAME_AND_EMAIL" => Ok(PasswordSignupFields::UsernameAndEmail),
            "USERNAME_AND_OPTIONAL_EMAIL" => Ok(PasswordSignupFields::UsernameAndOptionalEmail),
            "USERNAME_ONLY" => Ok(PasswordSignupFields::UsernameOnly),
            "EMAIL_ONLY" => Ok(PasswordSignupFields::EmailOnly),
            _ => Err(AccountsError::UnknownSignupFields(raw.to_string())),
        }
    }
}

/// Account UI configuration applied at start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountsConfig {
    pub password_signup_fields: PasswordSignupFields,
}

/// Body of a sign-in or sign-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Only configured fields are sent; a blank optional email is dropped.
    pub fn credentials(&self, fields: PasswordSignupFields) -> Credentials {
        let mut credentials = Credentials {
            username: None,
            email: None,
            password: self.password.clone(),
        };
        for field in fields.fields() {
            match field {
                SignupField::Username => credentials.username = Some(self.username.trim().to_string()),
                SignupField::Email => credentials.email = Some(self.email.trim().to_string()),
                SignupField::OptionalEmail => {
                    let email = self.email.trim();
                    if !email.is_empty() {
                        credentials.email = Some(email.to_string());
                    }
                }
                SignupField::Password => {}
            }
        }
        credentials
    }

    pub fn clear_password(&mut self) {
        self.password.clear();
    }
}

/// The signed-in user for this session, if any.
#[derive(Clone)]
pub struct AccountState {
    user: State<Option<UserIdentity>>,
}

impl Default for AccountState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountState").finish_non_exhaustive()
    }
}

impl AccountState {
    pub fn new() -> Self {
        Self {
            user: State::new(None),
        }
    }

    pub fn current_user(&self, sc: &mut SignalContext) -> Option<UserIdentity> {
        self.user.get(sc)
    }

    pub fn is_signed_in(&self, sc: &mut SignalContext) -> bool {
        self.user.borrow(sc).is_some()
    }

    pub fn set_user(&self, user: Option<UserIdentity>, ac: &mut ActionContext) {
        tracing::debug!(signed_in = user.is_some(), "current user set");
        self.user.set_dedup(user, ac);
    }
}
