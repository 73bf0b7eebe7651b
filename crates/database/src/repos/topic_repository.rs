//! Repository for topic data access operations.

use crate::entities::Topic;
use crate::types::{validate_text, DatabaseError, DatabaseResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Maximum length of a topic name.
pub const TOPIC_NAME_MAX_CHARS: usize = 200;

/// Repository for topic database operations
#[derive(Clone)]
pub struct TopicRepository {
    pool: SqlitePool,
}

fn topic_from_row(row: &SqliteRow) -> DatabaseResult<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

impl TopicRepository {
    /// Create a new topic repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Topic>> {
        let row = sqlx::query("SELECT id, name FROM topics WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(topic_from_row).transpose()
    }

    /// Insert a topic. Names are not unique.
    pub async fn create(&self, name: &str) -> DatabaseResult<Topic> {
        validate_text("topic name", name, Some(TOPIC_NAME_MAX_CHARS))?;

        let result = sqlx::query("INSERT INTO topics (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!(topic_id = id, topic = %name, "created new topic");

        Ok(Topic {
            id,
            name: name.to_string(),
        })
    }

    /// Return the oldest topic with exactly this name, creating it when
    /// none exists.
    pub async fn find_or_create(&self, name: &str) -> DatabaseResult<(Topic, bool)> {
        let existing = sqlx::query("SELECT id, name FROM topics WHERE name = ? ORDER BY id LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = existing {
            return Ok((topic_from_row(&row)?, false));
        }

        Ok((self.create(name).await?, true))
    }

    /// All topics ordered by name
    pub async fn list(&self) -> DatabaseResult<Vec<Topic>> {
        let rows = sqlx::query("SELECT id, name FROM topics ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(topic_from_row).collect()
    }

    /// Delete a topic. Rooms filed under it keep existing with no topic.
    pub async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("topic {id}")));
        }

        info!(topic_id = id, "deleted topic");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::entities::NewRoom;
    use crate::test_utils::test_db;
    use crate::DatabaseError;

    #[tokio::test]
    async fn test_find_or_create_reuses_existing() {
        let db = test_db().await;
        let topics = db.topics();

        let (first, created) = topics.find_or_create("Python").await.unwrap();
        assert!(created);
        let (second, created) = topics.find_or_create("Python").await.unwrap();
        assert!(!created);
        assert_eq!(first, second);

        // Names are not unique when inserted directly.
        topics.create("Python").await.unwrap();
        let (third, _) = topics.find_or_create("Python").await.unwrap();
        assert_eq!(third.id, first.id);

        let names: Vec<String> = topics.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Python", "Python"]);
    }

    #[tokio::test]
    async fn test_blank_topic_rejected() {
        let db = test_db().await;
        let err = db.topics().create("  ").await.unwrap_err();
        assert!(matches!(err, DatabaseError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_deleting_topic_clears_room_reference() {
        let db = test_db().await;
        let topic = db.topics().create("Rust").await.unwrap();
        let room = db
            .rooms()
            .create(&NewRoom {
                host_id: None,
                topic_id: Some(topic.id),
                name: "Borrow checker".into(),
                description: None,
            })
            .await
            .unwrap();

        db.topics().delete(topic.id).await.unwrap();

        let stored = db.rooms().find_by_id(room.id).await.unwrap().unwrap();
        assert!(stored.topic_id.is_none());
        assert!(db.topics().find_by_id(topic.id).await.unwrap().is_none());
    }
}
