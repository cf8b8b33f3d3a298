//! Session context and provider

use crate::activity::{ActivityWatch, ConnectivityWatch};
use crate::config::AuthConfig;
use busadmin_core::{LogoutReason, Session, SessionError, SessionState};
use busadmin_http::types::LoginRequest;
use yew::prelude::*;

/// What components see of the session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    pub session: Session,
    pub state: SessionState,
    pub last_logout: Option<LogoutReason>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.state != SessionState::LoggedOut
    }

    /// Log in; the provider re-renders the tree on the resulting state change
    pub fn login(&self, credentials: LoginRequest, on_done: Callback<Result<(), SessionError>>) {
        let session = self.session.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = session.login(&credentials).await;
            if let Err(err) = &result {
                tracing::warn!(error = %err, "login failed");
            }
            on_done.emit(result);
        });
    }

    pub fn logout(&self) {
        self.session.logout(LogoutReason::UserRequested);
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub session: Session,
    /// Called after every logout, before the redirect
    #[prop_or_default]
    pub on_logout: Callback<LogoutReason>,
    #[prop_or(AttrValue::Static(AuthConfig::LOGIN_ROUTE))]
    pub login_route: AttrValue,
    pub children: Children,
}

/// Session provider component
///
/// Resumes a stored session on mount, mirrors its state (including renewals in
/// progress), feeds window activity and connectivity events into it, and sends
/// the browser to the login route when it ends.
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let state = use_state(|| props.session.state());
    let last_logout = use_state(|| None::<LogoutReason>);

    {
        let state = state.clone();
        let last_logout = last_logout.clone();
        let on_logout = props.on_logout.clone();
        let login_route = props.login_route.clone();
        use_effect_with(props.session.clone(), move |session| {
            let state_subscription = {
                let state = state.clone();
                session.on_state_change(move |next| state.set(next))
            };
            if let Err(err) = session.resume() {
                tracing::warn!(error = %err, "could not restore stored session");
            }
            state.set(session.state());

            let logout_subscription = session.on_logout(move |reason| {
                last_logout.set(Some(reason));
                on_logout.emit(reason);
                redirect(&login_route);
            });
            let activity = ActivityWatch::attach(session);
            let connectivity = ConnectivityWatch::attach(session);

            // Cleanup on unmount
            move || {
                drop(state_subscription);
                drop(logout_subscription);
                drop(activity);
                drop(connectivity);
            }
        });
    }

    let context = SessionContext {
        session: props.session.clone(),
        state: *state,
        last_logout: *last_logout,
    };

    html! {
        <ContextProvider<SessionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

fn redirect(route: &str) {
    let location = gloo::utils::window().location();
    let already_there = location.pathname().map(|p| p == route).unwrap_or(false);
    if !already_there && location.set_href(route).is_err() {
        tracing::warn!(route, "could not navigate to login");
    }
}

/// Hook to use the session context
#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
        .expect("SessionContext not found. Make sure to wrap your component with SessionProvider")
}

/// Hook to check if authenticated
#[hook]
pub fn use_is_authenticated() -> bool {
    use_session().is_authenticated()
}
