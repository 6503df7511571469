//! Email/password credentials with client-side checks.

use std::fmt;

use crate::domain::foundation::ValidationError;

/// Minimum password length accepted before contacting the provider.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Email and password pair for sign-in and sign-up.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials, trimming the email.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the email is blank
    /// - `InvalidFormat` if the email has no `@` or the password is shorter
    ///   than [`MIN_PASSWORD_LENGTH`] characters
    pub fn new(email: impl AsRef<str>, password: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing '@'"));
        }

        let password = password.into();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::invalid_format(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }

        Ok(Self {
            email: email.to_string(),
            password,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
