//! Account factory: creation of regular users and superusers, password
//! changes and credential checks.

use serde::{Deserialize, Serialize};
use studybud_config::AccountsConfig;
use studybud_database::{DatabaseConnection, DatabaseError, NewUser, User, UserRepository};
use tracing::{info, warn};

use crate::types::{AccountError, AccountResult};
use crate::utils::email::normalize_email;
use crate::utils::password::{hash_password, make_unusable_password, verify_password};

/// Optional attributes supplied alongside email and password.
///
/// Unset fields take their defaults: no name or bio, the configured
/// placeholder avatar, not staff, not superuser, active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ExtraFields {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Creates accounts and checks credentials on top of [`UserRepository`].
#[derive(Clone)]
pub struct UserManager {
    users: UserRepository,
    config: AccountsConfig,
}

impl UserManager {
    pub fn new(users: UserRepository, config: AccountsConfig) -> Self {
        Self { users, config }
    }

    pub fn from_connection(db: &DatabaseConnection, config: AccountsConfig) -> Self {
        Self::new(db.users(), config)
    }

    /// Create and persist a regular account.
    ///
    /// Fails with [`AccountError::Validation`] when `email` is blank and with
    /// [`AccountError::EmailTaken`] when the normalized email already
    /// belongs to another account. With `password` absent the account gets
    /// an unusable password. Nothing is written on failure.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        extra_fields: ExtraFields,
    ) -> AccountResult<User> {
        if email.trim().is_empty() {
            warn!("rejected account without email");
            return Err(AccountError::Validation("The Email field must be set".to_string()));
        }

        let email = normalize_email(email);

        let password_hash = match password {
            Some(password) => hash_password(password)?,
            None => make_unusable_password(self.config.unusable_password_length),
        };

        let new_user = NewUser {
            email,
            name: extra_fields.name,
            bio: extra_fields.bio,
            avatar: Some(
                extra_fields
                    .avatar
                    .unwrap_or_else(|| self.config.default_avatar.clone()),
            ),
            password_hash,
            is_staff: extra_fields.is_staff.unwrap_or(false),
            is_superuser: extra_fields.is_superuser.unwrap_or(false),
            is_active: extra_fields.is_active.unwrap_or(true),
        };

        match self.users.insert(&new_user).await {
            Ok(user) => Ok(user),
            Err(DatabaseError::Duplicate(_)) => Err(AccountError::EmailTaken(new_user.email)),
            Err(DatabaseError::ValidationError(reason)) => Err(AccountError::Validation(reason)),
            Err(e) => Err(e.into()),
        }
    }

    /// Create and persist an account with both privilege flags set.
    ///
    /// Unset flags default to `true`; an explicit `false` for either is a
    /// validation error.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        mut extra_fields: ExtraFields,
    ) -> AccountResult<User> {
        let is_staff = *extra_fields.is_staff.get_or_insert(true);
        let is_superuser = *extra_fields.is_superuser.get_or_insert(true);

        if !is_staff {
            warn!("rejected superuser with is_staff=false");
            return Err(AccountError::Validation(
                "Superuser must have is_staff=True.".to_string(),
            ));
        }
        if !is_superuser {
            warn!("rejected superuser with is_superuser=false");
            return Err(AccountError::Validation(
                "Superuser must have is_superuser=True.".to_string(),
            ));
        }

        let user = self.create_user(email, password, extra_fields).await?;
        info!(user_id = user.id, "created superuser");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Returns the account only when it exists, is active and the password
    /// matches; a successful check records `last_login`.
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountResult<Option<User>> {
        let email = normalize_email(email);

        let Some(mut user) = self.users.find_by_email(&email).await? else {
            return Ok(None);
        };

        if !verify_password(password, &user.account.password_hash)? {
            warn!(user_id = user.id, "password check failed");
            return Ok(None);
        }

        if !user.is_active() {
            warn!(user_id = user.id, "inactive account refused");
            return Ok(None);
        }

        self.users.touch_last_login(user.id).await?;
        if let Some(stored) = self.users.find_by_id(user.id).await? {
            user = stored;
        }

        info!(user_id = user.id, "authenticated user");
        Ok(Some(user))
    }

    /// Replace an account's password; `None` makes it unusable.
    pub async fn set_password(&self, user_id: i64, password: Option<&str>) -> AccountResult<()> {
        let password_hash = match password {
            Some(password) => hash_password(password)?,
            None => make_unusable_password(self.config.unusable_password_length),
        };

        match self.users.set_password_hash(user_id, &password_hash).await {
            Ok(()) => {
                info!(user_id, usable = password.is_some(), "password changed");
                Ok(())
            }
            Err(DatabaseError::NotFound(_)) => Err(AccountError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
