//! Busadmin session core
//!
//! Client-side session lifecycle for the bus administration console: token
//! storage, silent refresh, authenticated dispatch, idle timeout and
//! reconnect handling. Everything runs on a single thread; shared state uses
//! `Rc` and `RefCell`.

pub mod backend;
pub mod claims;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod dispatcher;
pub mod error;
pub mod fleet;
pub mod idle;
pub mod refresher;
pub mod runtime;
pub mod session;
pub mod store;
pub mod subscription;
pub mod validation;

#[cfg(test)]
mod testing;

pub use backend::AuthBackend;
pub use clock::{Clock, SystemClock};
pub use config::{SessionConfig, ValidateConfig};
pub use connectivity::{ConnectivityAction, ConnectivityWatcher};
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, RefreshError, SessionError, SessionResult, StoreError};
pub use fleet::FleetService;
pub use idle::{IdleMonitor, IdleState};
pub use refresher::{RefreshEvent, TokenRefresher};
pub use session::{LogoutHandle, LogoutReason, Session, SessionState};
pub use store::{MemoryTokenStore, TokenPair, TokenStore};
pub use subscription::Subscription;
pub use validation::ValidationError;
