// Shared errors
pub mod auth_error;

pub use auth_error::*;
