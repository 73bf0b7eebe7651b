//! Account layer for StudyBud.
//!
//! [`UserManager`] is the only way new accounts should enter the database:
//! it normalizes the email, hashes the password and enforces the privilege
//! flag rules for superusers before handing a fully-resolved row to the
//! user repository.

pub mod services;
pub mod types;
pub mod utils;

pub use services::user_manager::{ExtraFields, UserManager};
pub use types::{AccountError, AccountResult};
pub use utils::email::normalize_email;
pub use utils::password::{
    hash_password, is_usable_password, make_unusable_password, verify_password,
};
