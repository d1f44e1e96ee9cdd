//! Configuration modules for the Scolaris API.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables once at startup and stored in [`crate::state::AppState`].
//!
//! - [`cors`]: CORS configuration
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token signing configuration (secret, issuer, audience, expiry)
//! - [`rate_limit`]: API rate limiting configuration

pub mod cors;
pub mod database;
pub mod jwt;
pub mod rate_limit;
