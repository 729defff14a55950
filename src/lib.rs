// Session server library: token authority, session HTTP protocol, and the
// refresh-aware HTTP client used by front ends and integration tests.
pub mod client;
pub mod domains;
pub mod routes;
pub mod shared;
