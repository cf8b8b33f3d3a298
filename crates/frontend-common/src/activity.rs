//! Window event subscriptions feeding the session

use crate::config::AuthConfig;
use busadmin_core::Session;
use gloo_events::EventListener;

/// User-activity listeners on `window`; removed when dropped
pub struct ActivityWatch {
    _listeners: Vec<EventListener>,
}

impl ActivityWatch {
    pub fn attach(session: &Session) -> Self {
        let window = gloo::utils::window();
        let listeners = AuthConfig::ACTIVITY_EVENTS
            .iter()
            .map(|&event| {
                let session = session.clone();
                EventListener::new(&window, event, move |_| session.record_activity())
            })
            .collect();
        Self {
            _listeners: listeners,
        }
    }
}

/// `online`/`offline` listeners on `window`; removed when dropped
pub struct ConnectivityWatch {
    _online: EventListener,
    _offline: EventListener,
}

impl ConnectivityWatch {
    pub fn attach(session: &Session) -> Self {
        let window = gloo::utils::window();

        let online = {
            let session = session.clone();
            EventListener::new(&window, "online", move |_| {
                tracing::debug!("browser reports online");
                session.set_online(true);
            })
        };
        let offline = {
            let session = session.clone();
            EventListener::new(&window, "offline", move |_| {
                tracing::debug!("browser reports offline");
                session.set_online(false);
            })
        };

        if !window.navigator().on_line() {
            session.set_online(false);
        }

        Self {
            _online: online,
            _offline: offline,
        }
    }
}
