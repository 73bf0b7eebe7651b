pub mod user_manager;
