//! HTTP request handlers for the URL shortener
//!
//! This module maps requests onto the service layer:
//! - Shortening URLs from the home page form
//! - Redirecting short codes to their destinations
//! - Account signup, login and logout

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::json;
use tower_sessions::Session;
use tracing::info;

use crate::accounts::{authenticate, signup as register};
use crate::database::AppState;
use crate::error::AppError;
use crate::history::GuestHistory;
use crate::model::{CredentialsForm, HomeResponse, ShortenForm};
use crate::service::{recent_for, resolve, run_blocking, submit};
use crate::session::{sign_in, sign_out, IdentityProvider};

/// A body that is missing or not form encoded reads as an empty form, so the
/// field checks report it
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    form.map(|Form(form)| form).unwrap_or_default()
}

/// Shows the requester's recent short links
///
/// Signed-in users see their own newest records; guests see the URLs they
/// shortened during this session.
///
/// # Response
///
/// - **200 OK** - `{"short_code": null, "short_url": null, "recent": [...]}`
pub async fn home(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<HomeResponse>, AppError> {
    let account = session.current_account().await?;

    Ok(Json(HomeResponse {
        short_code: None,
        short_url: None,
        recent: recent_for(&state, &session, account).await?,
    }))
}

/// Creates a new short URL
///
/// # Request Body
///
/// Form encoded: `url=https%3A%2F%2Fexample.com%2Fvery%2Flong%2Furl`
///
/// # Response
///
/// - **201 Created** - the new code, its full short URL and the recent list
/// - **400 Bad Request** - `url` missing, blank, too long or not usable as a
///   redirect target; nothing is stored
pub async fn create_short_url(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<ShortenForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = form_or_default(form);
    let account = session.current_account().await?;
    let submission = submit(&state, &session, account, form.url).await?;

    let body = HomeResponse {
        short_url: Some(state.config.short_url(&submission.short_code)),
        short_code: Some(submission.short_code),
        recent: submission.recent,
    };

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Redirects a short code to its original destination
///
/// # Response
///
/// - **307 Temporary Redirect** - `Location` is the stored URL
/// - **404 Not Found** - plain text `URL not found`
pub async fn redirect_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let urls = state.urls.clone();
    let destination = run_blocking(move || resolve(&urls, &code)).await?;
    Ok(Redirect::temporary(&destination))
}

/// Registers an account
///
/// # Response
///
/// - **201 Created** - account created; the session stays anonymous
/// - **303 See Other** - already signed in, back to `/`
/// - **400 Bad Request** - username not 5 to 9 characters, or empty password
/// - **409 Conflict** - username taken
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, AppError> {
    if session.current_account().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = form_or_default(form);
    let accounts = state.accounts.clone();
    let account = run_blocking(move || {
        register(&accounts, form.username.as_deref(), form.password.as_deref())
    })
    .await?;
    info!(account = account.id, username = %account.username, "account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Signup successful! Please login." })),
    )
        .into_response())
}

/// Signs the session in
///
/// Guest history is dropped on success and the session id is replaced.
/// Records made as a guest stay anonymous; they are not moved to the account.
///
/// # Response
///
/// - **200 OK** - signed in
/// - **303 See Other** - already signed in, back to `/`
/// - **401 Unauthorized** - unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, AppError> {
    if session.current_account().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = form_or_default(form);
    let accounts = state.accounts.clone();
    let account = run_blocking(move || {
        authenticate(&accounts, form.username.as_deref(), form.password.as_deref())
    })
    .await?;

    GuestHistory::new(&session).clear().await?;
    sign_in(&session, account.id).await?;
    info!(account = account.id, "login successful");

    Ok(Json(json!({
        "message": "Login successful",
        "username": account.username
    }))
    .into_response())
}

/// Signs the session out
///
/// # Response
///
/// - **200 OK** - signed out, session cookie removed
/// - **303 See Other** - not signed in, to `/login`
pub async fn logout(session: Session) -> Result<Response, AppError> {
    if session.current_account().await?.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    sign_out(&session).await?;
    Ok(Json(json!({ "message": "You have been logged out" })).into_response())
}
