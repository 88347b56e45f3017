//! Bearer token authentication.
//!
//! Access tokens are RS256 JWTs from the identity provider, checked against
//! its JWKS. Roles are read from `app_metadata.roles` with the top-level
//! `role` claim as fallback; `admin` implies agent and client access.

mod jwks;
mod validator;

pub mod dto;
pub mod guards;
pub mod handler;
pub mod model;
pub mod routes;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
