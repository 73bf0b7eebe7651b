//! Shared fixtures for repository tests.

use crate::entities::{NewRoom, NewUser, Room, User};
use crate::{initialize_database, DatabaseConnection};
use chrono::{DateTime, Utc};
use studybud_config::DatabaseConfig;

pub async fn test_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    initialize_database(&config).await.unwrap()
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: Some(format!("Name of {email}")),
        bio: None,
        avatar: Some("avatar.svg".to_string()),
        password_hash: "!unusable".to_string(),
        is_staff: false,
        is_superuser: false,
        is_active: true,
    }
}

pub async fn insert_user(db: &DatabaseConnection, email: &str) -> User {
    db.users().insert(&new_user(email)).await.unwrap()
}

pub async fn insert_room(db: &DatabaseConnection, host_id: Option<i64>, name: &str) -> Room {
    db.rooms()
        .create(&NewRoom {
            host_id,
            topic_id: None,
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
}

/// Pin `created_at`/`updated_at` of a row so ordering assertions do not
/// depend on wall-clock resolution.
pub async fn set_timestamps(
    db: &DatabaseConnection,
    table: &str,
    id: i64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
) {
    let sql = format!("UPDATE {table} SET created_at = ?, updated_at = ? WHERE id = ?");
    sqlx::query(&sql)
        .bind(crate::types::format_timestamp(&created))
        .bind(crate::types::format_timestamp(&updated))
        .bind(id)
        .execute(db.pool())
        .await
        .unwrap();
}

/// Make every UPDATE on `table` skip its row, as if the row had been
/// deleted between a read and the write that follows it.
pub async fn skip_updates(db: &DatabaseConnection, table: &str) {
    let sql = format!(
        "CREATE TRIGGER skip_{table}_updates BEFORE UPDATE ON {table} BEGIN SELECT RAISE(IGNORE); END"
    );
    sqlx::query(&sql).execute(db.pool()).await.unwrap();
}
