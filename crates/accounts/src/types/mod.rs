//! Error and result types for the account layer

pub mod errors;

pub use errors::AccountError;

pub type AccountResult<T> = Result<T, AccountError>;
