//! Browser adapters for the busadmin session core

pub mod activity;
pub mod auth;
pub mod client;
pub mod config;
pub mod logging;
pub mod storage;

pub use activity::{ActivityWatch, ConnectivityWatch};
pub use auth::{SessionContext, SessionProvider, use_is_authenticated, use_session};
pub use client::{create_public_client, create_session};
pub use config::AuthConfig;
pub use logging::init_logging;
pub use storage::LocalStorageTokenStore;
