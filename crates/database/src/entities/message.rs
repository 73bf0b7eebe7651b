//! Message entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the body preview used by the `Display` impl.
pub const PREVIEW_CHARS: usize = 50;

/// A post inside a room. Removed together with its author or its room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// First [`PREVIEW_CHARS`] characters of the body.
    pub fn preview(&self) -> &str {
        match self.body.char_indices().nth(PREVIEW_CHARS) {
            Some((idx, _)) => &self.body[..idx],
            None => &self.body,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preview())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub user_id: i64,
    pub room_id: i64,
    pub body: String,
}
