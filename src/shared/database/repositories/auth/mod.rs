// Auth repositories
pub mod traits;
pub mod user_repository;
pub mod refresh_token_repository;
pub mod memory;

pub use traits::*;
pub use user_repository::*;
pub use refresh_token_repository::*;
pub use memory::*;
