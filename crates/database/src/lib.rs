//! StudyBud Database Crate
//!
//! Connection management, embedded migrations, entity types, and repository
//! implementations for users, topics, rooms, and messages.

use studybud_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

pub use repos::{MessageRepository, RoomRepository, TopicRepository, UserRepository};

pub use entities::{
    message::{Message, NewMessage},
    room::{NewRoom, Room, UpdateRoom},
    topic::Topic,
    user::{Account, NewUser, UpdateProfile, User},
};

pub use types::{errors::DatabaseError, DatabaseResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<DatabaseConnection> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(DatabaseConnection::from_pool(pool))
}

