//! User entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication state shared by every account.
///
/// Composed into [`User`] rather than modelled as a separate table: the
/// columns live on the `users` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Argon2 PHC string, or a marker starting with `!` when no usable
    /// password is set.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub account: Account,
}

impl User {
    pub fn is_staff(&self) -> bool {
        self.account.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.account.is_superuser
    }

    pub fn is_active(&self) -> bool {
        self.account.is_active
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Fully-resolved row for insertion. The email must already be normalized
/// and the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

/// Profile edit. `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    #[serde(default)]
    pub name: Option<Option<String>>,
    #[serde(default)]
    pub bio: Option<Option<String>>,
    #[serde(default)]
    pub avatar: Option<Option<String>>,
}
