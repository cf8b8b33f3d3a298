//! Frontend configuration

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// localStorage key holding the serialized token pair
    pub const SESSION_KEY: &'static str = "busadmin.session";

    /// Keys written by earlier console builds, one token per key
    pub const LEGACY_ACCESS_KEY: &'static str = "token";
    pub const LEGACY_REFRESH_KEY: &'static str = "refreshToken";

    /// Where the browser is sent when the session ends
    pub const LOGIN_ROUTE: &'static str = "/";

    /// Window events that count as user activity
    pub const ACTIVITY_EVENTS: [&'static str; 4] = ["load", "mousemove", "keypress", "touchstart"];
}
