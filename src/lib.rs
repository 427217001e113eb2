//! OAuth 2.0 / OpenID Connect identity provider core.
//!
//! This crate is the protocol engine only: authorization-code + PKCE,
//! token minting/introspection/revocation, the key-and-JWKS subsystem,
//! and the session layer binding user authentication to consent. The
//! frontend, the external identity broker, and the relational schema
//! migrations are collaborators this crate talks to, not things it owns.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use error::AppError;
pub use state::{AppState, StateError};
