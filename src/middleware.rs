use time::Duration;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::session::SESSION_COOKIE;

/// Session layer for the home and account routes
///
/// A session is only stored, and its cookie only set, once something is
/// written to it (a guest submission or a login). Sessions expire after
/// `session_idle_minutes` without a request; every request that carries a
/// live session pushes the expiry back.
pub fn session_layer(config: &Config, store: MemoryStore) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.secure_cookies())
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            config.session_idle_minutes,
        )))
        .with_always_save(true)
}
