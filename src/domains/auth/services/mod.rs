// Auth domain services
pub mod auth_service;
pub mod jwt_service;
pub mod purge_scheduler;
pub mod secret_hasher;
pub mod state;
pub mod token_authority;

pub use auth_service::*;
pub use jwt_service::*;
pub use purge_scheduler::*;
pub use secret_hasher::*;
pub use state::*;
pub use token_authority::*;
