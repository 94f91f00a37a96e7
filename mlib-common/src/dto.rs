//! Transfer objects for the web boundary
//!
//! A [`UserDto`] is what the signup and profile forms bind to. It carries the
//! plaintext password only on its way in; DTOs built from a stored user leave
//! it empty.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::entities::{Authority, Entity, Key, User};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 40;

/// Field name → message, in field order
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Which form is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Password required
    Signup,
    /// Blank password keeps the current one
    ProfileEdit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<Key>,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub enabled: bool,
    /// Never bound from a request; filled in server-side
    #[serde(default, skip_deserializing, rename = "userAuthorities")]
    pub user_authorities: Vec<Authority>,
}

impl UserDto {
    pub fn validate(&self, mode: Validation) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required".to_string());
        } else if email.chars().count() > MAX_EMAIL_LEN {
            errors.insert("email", format!("Email must be at most {} characters", MAX_EMAIL_LEN));
        } else if !looks_like_email(email) {
            errors.insert("email", "Email is not valid".to_string());
        }

        let password_required = mode == Validation::Signup;
        if self.password.is_empty() {
            if password_required {
                errors.insert("password", "Password is required".to_string());
            }
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }

        for (field, value) in [("firstName", &self.first_name), ("lastName", &self.last_name)] {
            if let Some(value) = value {
                if value.trim().chars().count() > MAX_NAME_LEN {
                    errors.insert(field, format!("Must be at most {} characters", MAX_NAME_LEN));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.identity().key(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password: String::new(),
            enabled: user.enabled,
            user_authorities: user.authorities().iter().map(|a| a.authority).collect(),
        }
    }
}

/// Trimmed value, or `None` when blank
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `local@domain.tld` with no whitespace; enough to catch typos
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Form posts send `id=` for a missing key
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Key>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawKey {
        Key(Key),
        Text(String),
    }

    match Option::<RawKey>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawKey::Key(key)) => Ok(Some(key)),
        Some(RawKey::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawKey::Text(text)) => text.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
