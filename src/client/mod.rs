//! Client authorization layer.
//!
//! Holds the access token in process memory, attaches it to requests,
//! runs a single shared refresh when the server answers 401, and restores
//! a session after restart from the refresh cookie alone.

pub mod config;
pub mod error;
pub mod interceptor;
pub mod session;
pub mod single_flight;
pub mod token;

pub use config::ClientConfig;
pub use error::ClientError;
pub use interceptor::AuthClient;
pub use session::ClientSessionState;
pub use single_flight::RefreshCoordinator;
