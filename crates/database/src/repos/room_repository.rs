//! Repository for room data access operations.

use crate::entities::{NewRoom, Room, UpdateRoom, User};
use crate::repos::user_repository::{user_from_row, USER_COLUMNS};
use crate::types::{format_timestamp, now, validate_text, DatabaseError, DatabaseResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Maximum length of a room name.
pub const ROOM_NAME_MAX_CHARS: usize = 200;

const ROOM_COLUMNS: &str = "r.id, r.host_id, r.topic_id, r.name, r.description, r.created_at, r.updated_at";

/// Most recently updated first, then most recently created.
const ROOM_ORDERING: &str = "ORDER BY r.updated_at DESC, r.created_at DESC, r.id DESC";

/// Repository for room database operations
#[derive(Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

fn room_from_row(row: &SqliteRow) -> DatabaseResult<Room> {
    Ok(Room {
        id: row.try_get("id")?,
        host_id: row.try_get("host_id")?,
        topic_id: row.try_get("topic_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl RoomRepository {
    /// Create a new room repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find room by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms r WHERE r.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(room_from_row).transpose()
    }

    /// Create a new room
    pub async fn create(&self, request: &NewRoom) -> DatabaseResult<Room> {
        validate_text("room name", &request.name, Some(ROOM_NAME_MAX_CHARS))?;

        let created = now();
        let stamp = format_timestamp(&created);

        let result = sqlx::query(
            "INSERT INTO rooms (host_id, topic_id, name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(request.host_id)
        .bind(request.topic_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await?;

        let room_id = result.last_insert_rowid();

        info!(
            room_id,
            host_id = ?request.host_id,
            topic_id = ?request.topic_id,
            "created new room"
        );

        Ok(Room {
            id: room_id,
            host_id: request.host_id,
            topic_id: request.topic_id,
            name: request.name.clone(),
            description: request.description.clone(),
            created_at: created,
            updated_at: created,
        })
    }

    /// All rooms, most recently updated first
    pub async fn list(&self) -> DatabaseResult<Vec<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms r {ROOM_ORDERING}");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(room_from_row).collect()
    }

    /// Rooms filed under a topic
    pub async fn list_by_topic(&self, topic_id: i64) -> DatabaseResult<Vec<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms r WHERE r.topic_id = ? {ROOM_ORDERING}");
        let rows = sqlx::query(&sql)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(room_from_row).collect()
    }

    /// Rooms hosted by a user
    pub async fn list_by_host(&self, host_id: i64) -> DatabaseResult<Vec<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms r WHERE r.host_id = ? {ROOM_ORDERING}");
        let rows = sqlx::query(&sql)
            .bind(host_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(room_from_row).collect()
    }

    /// Apply an edit. `updated_at` is bumped even when no field changes.
    pub async fn update(&self, id: i64, request: &UpdateRoom) -> DatabaseResult<Room> {
        let mut room = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("room {id}")))?;

        if let Some(name) = &request.name {
            validate_text("room name", name, Some(ROOM_NAME_MAX_CHARS))?;
            room.name = name.clone();
        }
        if let Some(description) = &request.description {
            room.description = description.clone();
        }
        if let Some(topic_id) = request.topic_id {
            room.topic_id = topic_id;
        }
        room.updated_at = now();

        let result = sqlx::query(
            "UPDATE rooms SET name = ?, description = ?, topic_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.topic_id)
        .bind(format_timestamp(&room.updated_at))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("room {id}")));
        }

        info!(room_id = id, "updated room");
        Ok(room)
    }

    /// Delete a room together with its messages and memberships
    pub async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("room {id}")));
        }

        info!(room_id = id, "deleted room");
        Ok(())
    }

    /// Add a user to the participant set. Returns `false` when the user
    /// was already a participant. Membership changes do not touch the
    /// room's `updated_at`.
    pub async fn add_participant(&self, room_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO room_participants (room_id, user_id) VALUES (?, ?)",
        )
        .bind(room_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            info!(room_id, user_id, "added participant to room");
        }
        Ok(added)
    }

    /// Remove a user from the participant set. Returns `false` when the
    /// user was not a participant.
    pub async fn remove_participant(&self, room_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM room_participants WHERE room_id = ? AND user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(room_id, user_id, "removed participant from room");
        }
        Ok(removed)
    }

    /// Participants of a room, by user id
    pub async fn participants(&self, room_id: i64) -> DatabaseResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             JOIN room_participants rp ON rp.user_id = users.id
             WHERE rp.room_id = ? ORDER BY users.id"
        );
        let rows = sqlx::query(&sql)
            .bind(room_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Number of participants in a room
    pub async fn participant_count(&self, room_id: i64) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_participants WHERE room_id = ?")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Rooms a user has joined
    pub async fn rooms_for_participant(&self, user_id: i64) -> DatabaseResult<Vec<Room>> {
        let sql = format!(
            "SELECT {ROOM_COLUMNS} FROM rooms r
             JOIN room_participants rp ON rp.room_id = r.id
             WHERE rp.user_id = ? {ROOM_ORDERING}"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(room_from_row).collect()
    }
}
