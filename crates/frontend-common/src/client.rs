//! Client and session construction for the browser

use crate::storage::LocalStorageTokenStore;
use busadmin_core::{FleetService, Session, SessionConfig, SystemClock};
use busadmin_http::{ClientBuilder, ClientError, PublicClient};
use std::rc::Rc;

/// Get the public client instance (for unauthenticated endpoints)
pub fn create_public_client(config: &SessionConfig) -> Result<PublicClient, ClientError> {
    ClientBuilder::new().base_url(&config.base_url).build()
}

/// Build the console session, persisted in `localStorage`, and the fleet
/// service bound to it
pub fn create_session(config: SessionConfig) -> Result<(Session, FleetService), ClientError> {
    let client = create_public_client(&config)?;
    let session = Session::new(
        Rc::new(client.clone()),
        Rc::new(LocalStorageTokenStore::new()),
        Rc::new(SystemClock),
        config,
    );
    let fleet = FleetService::new(client, session.dispatcher());
    Ok((session, fleet))
}
