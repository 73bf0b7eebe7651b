//! Repository for message data access operations.

use crate::entities::{Message, NewMessage};
use crate::types::{format_timestamp, now, validate_text, DatabaseError, DatabaseResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const MESSAGE_COLUMNS: &str = "id, user_id, room_id, body, created_at, updated_at";

const MESSAGE_ORDERING: &str = "ORDER BY updated_at DESC, created_at DESC, id DESC";

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

fn message_from_row(row: &SqliteRow) -> DatabaseResult<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        room_id: row.try_get("room_id")?,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a message by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(message_from_row).transpose()
    }

    /// Create a new message. Both the author and the room must exist.
    pub async fn create(&self, request: &NewMessage) -> DatabaseResult<Message> {
        validate_text("message body", &request.body, None)?;

        let created = now();
        let stamp = format_timestamp(&created);

        let result = sqlx::query(
            "INSERT INTO messages (user_id, room_id, body, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(request.user_id)
        .bind(request.room_id)
        .bind(&request.body)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id,
            room_id = request.room_id,
            user_id = request.user_id,
            "created new message"
        );

        Ok(Message {
            id: message_id,
            user_id: request.user_id,
            room_id: request.room_id,
            body: request.body.clone(),
            created_at: created,
            updated_at: created,
        })
    }

    /// Messages in a room, most recently updated first
    pub async fn list_for_room(&self, room_id: i64) -> DatabaseResult<Vec<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE room_id = ? {MESSAGE_ORDERING}");
        let rows = sqlx::query(&sql)
            .bind(room_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(message_from_row).collect()
    }

    /// Messages written by a user, most recently updated first
    pub async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE user_id = ? {MESSAGE_ORDERING}");
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(message_from_row).collect()
    }

    /// Activity feed across all rooms
    pub async fn list_recent(&self, limit: Option<i64>) -> DatabaseResult<Vec<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages {MESSAGE_ORDERING} LIMIT ?");
        // SQLite treats a negative LIMIT as unbounded.
        let rows = sqlx::query(&sql)
            .bind(limit.unwrap_or(-1))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(message_from_row).collect()
    }

    /// Replace the body and bump `updated_at`
    pub async fn update_body(&self, id: i64, body: &str) -> DatabaseResult<Message> {
        validate_text("message body", body, None)?;

        let mut message = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("message {id}")))?;

        message.body = body.to_string();
        message.updated_at = now();

        let result = sqlx::query("UPDATE messages SET body = ?, updated_at = ? WHERE id = ?")
            .bind(&message.body)
            .bind(format_timestamp(&message.updated_at))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("message {id}")));
        }

        info!(message_id = id, "updated message");
        Ok(message)
    }

    /// Delete a message
    pub async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("message {id}")));
        }

        info!(message_id = id, "deleted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::entities::NewMessage;
    use crate::test_utils::{insert_room, insert_user, set_timestamps, skip_updates, test_db};
    use crate::DatabaseError;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_messages_list_most_recently_updated_first() {
        let db = test_db().await;
        let user = insert_user(&db, "author@example.com").await;
        let room = insert_room(&db, Some(user.id), "Chatter").await;
        let messages = db.messages();

        let mut ids = Vec::new();
        for body in ["first", "second", "third"] {
            let message = messages
                .create(&NewMessage { user_id: user.id, room_id: room.id, body: body.into() })
                .await
                .unwrap();
            ids.push(message.id);
        }

        let t = |m| Utc.with_ymd_and_hms(2024, 6, 1, 12, m, 0).unwrap();
        set_timestamps(&db, "messages", ids[0], t(1), t(30)).await;
        set_timestamps(&db, "messages", ids[1], t(2), t(10)).await;
        set_timestamps(&db, "messages", ids[2], t(3), t(20)).await;

        let bodies: Vec<String> = messages
            .list_for_room(room.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.body)
            .collect();
        assert_eq!(bodies, vec!["first", "third", "second"]);

        let recent = messages.list_recent(Some(2)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, ids[0]);
        assert_eq!(messages.list_recent(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_body_moves_message_to_front() {
        let db = test_db().await;
        let user = insert_user(&db, "editor@example.com").await;
        let room = insert_room(&db, None, "Edits").await;
        let messages = db.messages();

        let old = messages
            .create(&NewMessage { user_id: user.id, room_id: room.id, body: "old".into() })
            .await
            .unwrap();
        let newer = messages
            .create(&NewMessage { user_id: user.id, room_id: room.id, body: "newer".into() })
            .await
            .unwrap();
        let early = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        set_timestamps(&db, "messages", old.id, early, early).await;
        set_timestamps(&db, "messages", newer.id, later, later).await;

        let edited = messages.update_body(old.id, "edited").await.unwrap();
        assert_eq!(edited.created_at, early);
        assert!(edited.updated_at > later);

        let listed = messages.list_for_room(room.id).await.unwrap();
        assert_eq!(listed[0].id, old.id);
        assert_eq!(listed[0].body, "edited");
    }

    #[tokio::test]
    async fn test_update_body_of_vanished_row_is_not_found() {
        let db = test_db().await;
        let user = insert_user(&db, "ghost@example.com").await;
        let room = insert_room(&db, None, "Ghosts").await;
        let message = db
            .messages()
            .create(&NewMessage { user_id: user.id, room_id: room.id, body: "boo".into() })
            .await
            .unwrap();
        skip_updates(&db, "messages").await;

        let err = db.messages().update_body(message.id, "edited").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_message_requires_existing_author_and_room() {
        let db = test_db().await;
        let user = insert_user(&db, "ghost@example.com").await;
        let room = insert_room(&db, None, "Haunted").await;
        let messages = db.messages();

        assert!(messages
            .create(&NewMessage { user_id: 777, room_id: room.id, body: "boo".into() })
            .await
            .is_err());
        assert!(messages
            .create(&NewMessage { user_id: user.id, room_id: 777, body: "boo".into() })
            .await
            .is_err());

        let blank = messages
            .create(&NewMessage { user_id: user.id, room_id: room.id, body: "\n".into() })
            .await
            .unwrap_err();
        assert!(matches!(blank, DatabaseError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_message() {
        let db = test_db().await;
        let user = insert_user(&db, "deleter@example.com").await;
        let room = insert_room(&db, None, "Cleanup").await;
        let messages = db.messages();

        let message = messages
            .create(&NewMessage { user_id: user.id, room_id: room.id, body: "bye".into() })
            .await
            .unwrap();
        messages.delete(message.id).await.unwrap();

        assert!(messages.find_by_id(message.id).await.unwrap().is_none());
        assert!(matches!(messages.delete(message.id).await, Err(DatabaseError::NotFound(_))));
    }
}
