//! Route definitions for the URL shortener
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{create_short_url, home, login, logout, redirect_url, signup};
use crate::middleware::session_layer;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Recent short links for the requester
/// - `POST /` - Creates a new short URL
/// - `POST /signup`, `POST /login`, `GET /logout` - Account endpoints
/// - `GET /{code}` - Redirects to the original URL (public, sessionless)
///
/// Fixed paths take precedence over `/{code}`; the allocator never issues
/// a code equal to one of them.
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use quicklink::config::Config;
/// # use quicklink::database::{init_db, AppState};
/// # use quicklink::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState::new(Arc::new(db), Config::default());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    // Routes that need a session
    let session_routes = Router::new()
        .route("/", get(home).post(create_short_url))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route_layer(session_layer(&state.config, state.sessions.clone()));

    Router::new()
        .merge(session_routes)
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
