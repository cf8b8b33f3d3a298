//! Busadmin HTTP client

pub mod auth;
pub mod error;
pub mod fleet;
mod typed;

pub use error::ClientError;
pub use typed::{AuthenticatedClient, ClientBuilder, PublicClient};
