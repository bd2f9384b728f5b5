//! Configuration modules for the secretaria API.
//!
//! Each submodule loads one aspect of configuration from environment
//! variables, once at startup:
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool
//! - [`jwt`]: token signing secret, issuer, and audience
//!
//! Required variables (`JWT_SECRET`, `DATABASE_URL`) abort startup when
//! missing; optional ones carry development defaults.

pub mod cors;
pub mod database;
pub mod jwt;
