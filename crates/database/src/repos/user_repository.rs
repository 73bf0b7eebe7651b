//! User repository for database operations.

use crate::entities::{Account, NewUser, UpdateProfile, User};
use crate::types::{format_timestamp, now, validate_length, DatabaseError, DatabaseResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

pub(crate) const USER_COLUMNS: &str = "id, email, name, bio, avatar, password_hash, is_staff, is_superuser, is_active, last_login, date_joined";

/// Maximum length of the display name.
pub const NAME_MAX_CHARS: usize = 200;

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

pub(crate) fn user_from_row(row: &SqliteRow) -> DatabaseResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        bio: row.try_get("bio")?,
        avatar: row.try_get("avatar")?,
        account: Account {
            password_hash: row.try_get("password_hash")?,
            is_staff: row.try_get("is_staff")?,
            is_superuser: row.try_get("is_superuser")?,
            is_active: row.try_get("is_active")?,
            last_login: row.try_get("last_login")?,
            date_joined: row.try_get("date_joined")?,
        },
    })
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find user by email. The lookup is exact: callers pass the normalized
    /// form.
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Insert a fully-prepared user row in a single statement.
    ///
    /// A second row with the same email is rejected by the UNIQUE
    /// constraint and surfaces as [`DatabaseError::Duplicate`].
    pub async fn insert(&self, user: &NewUser) -> DatabaseResult<User> {
        if user.email.is_empty() {
            return Err(DatabaseError::ValidationError("email must be set".to_string()));
        }
        if let Some(name) = &user.name {
            validate_length("name", name, NAME_MAX_CHARS)?;
        }

        let joined = now();

        let result = sqlx::query(
            "INSERT INTO users (email, name, bio, avatar, password_hash, is_staff, is_superuser, is_active, date_joined)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.avatar)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .bind(format_timestamp(&joined))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = DatabaseError::from(e);
            if err.is_duplicate() {
                warn!(email = %user.email, "rejected duplicate email");
            }
            err
        })?;

        let id = result.last_insert_rowid();

        info!(
            user_id = id,
            email = %user.email,
            is_staff = user.is_staff,
            is_superuser = user.is_superuser,
            "created new user"
        );

        Ok(User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            account: Account {
                password_hash: user.password_hash.clone(),
                is_staff: user.is_staff,
                is_superuser: user.is_superuser,
                is_active: user.is_active,
                last_login: None,
                date_joined: joined,
            },
        })
    }

    /// Apply a profile edit and return the stored result
    pub async fn update_profile(&self, id: i64, update: &UpdateProfile) -> DatabaseResult<User> {
        let mut user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {id}")))?;

        if let Some(name) = &update.name {
            if let Some(name) = name {
                validate_length("name", name, NAME_MAX_CHARS)?;
            }
            user.name = name.clone();
        }
        if let Some(bio) = &update.bio {
            user.bio = bio.clone();
        }
        if let Some(avatar) = &update.avatar {
            user.avatar = avatar.clone();
        }

        let result = sqlx::query("UPDATE users SET name = ?, bio = ?, avatar = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.bio)
            .bind(&user.avatar)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {id}")));
        }

        info!(user_id = id, "updated user profile");
        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {id}")));
        }

        Ok(())
    }

    /// Set the active flag
    pub async fn set_active(&self, id: i64, is_active: bool) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {id}")));
        }

        Ok(())
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(format_timestamp(&now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {id}")));
        }

        Ok(())
    }

    /// Delete a user. Hosted rooms keep existing with the host cleared;
    /// authored messages and room memberships are removed.
    pub async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {id}")));
        }

        info!(user_id = id, "deleted user");
        Ok(())
    }

    /// Get user count
    pub async fn count(&self) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
