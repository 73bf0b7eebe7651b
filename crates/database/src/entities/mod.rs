//! Domain entities for the database layer

pub mod message;
pub mod room;
pub mod topic;
pub mod user;

pub use message::{Message, NewMessage};
pub use room::{NewRoom, Room, UpdateRoom};
pub use topic::Topic;
pub use user::{Account, NewUser, UpdateProfile, User};
