use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Record identifier, derived from the creation time in milliseconds.
pub type UserId = i64;

/// `local@domain.tld` shape only; not RFC 5322. U+FEFF counts as whitespace,
/// as it does in browser regexes.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s\x{FEFF}@]+@[^\s\x{FEFF}@]+\.[^\s\x{FEFF}@]+$").expect("email pattern compiles")
});

pub const MSG_REQUIRED: &str = "name and email are required";
pub const MSG_INVALID_EMAIL: &str = "invalid email";

/// A registered user as stored in the collection blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "crate::timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: UserId, input: UserInput, now: DateTime<Utc>) -> Self {
        Self { id, name: input.name, email: input.email, created_at: now, updated_at: None }
    }

    /// Replace name and email; `id` and `created_at` never change.
    pub fn apply(&mut self, input: UserInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.email = input.email;
        self.updated_at = Some(now);
    }

    /// Case-insensitive email comparison used for uniqueness.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// Validated, trimmed name/email pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub email: String,
}

impl UserInput {
    /// Trim both fields, then require them and check the email shape.
    pub fn parse(name: &str, email: &str) -> Result<Self, ModelError> {
        let name = trim(name);
        let email = trim(email);
        if name.is_empty() || email.is_empty() {
            return Err(ModelError::Validation(MSG_REQUIRED.into()));
        }
        validate_email(email)?;
        Ok(Self { name: name.to_string(), email: email.to_string() })
    }
}

/// `str::trim` plus U+FEFF, matching browser `String#trim`.
fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if EMAIL_SHAPE.is_match(email) {
        Ok(())
    } else {
        Err(ModelError::Validation(MSG_INVALID_EMAIL.into()))
    }
}
