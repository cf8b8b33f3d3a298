//! Busadmin HTTP client
//!
//! Typed access to the bus-booking backend: the public authentication
//! endpoints (`user/login`, `user/signup`, `user/refresh`) and the
//! bearer-authenticated fleet endpoints (buses, routes, schedules).

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{AuthenticatedClient, ClientBuilder, PublicClient};
