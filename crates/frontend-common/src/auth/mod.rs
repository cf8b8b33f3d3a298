//! Authentication module

pub mod context;

pub use context::{
    SessionContext, SessionProvider, SessionProviderProps, use_is_authenticated, use_session,
};
