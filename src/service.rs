//! Shortening and redirection
//!
//! Handlers call into this module with the requester's identity already
//! resolved. Storage work runs on the blocking pool through `run_blocking`.

use axum::http::HeaderValue;
use tower_sessions::Session;
use tracing::info;

use crate::allocator::shorten;
use crate::database::AppState;
use crate::error::AppError;
use crate::history::{GuestHistory, RECENT_LIMIT};
use crate::model::{AccountId, RecentUrl};
use crate::store::UrlRepository;

/// Longest destination URL accepted
pub const MAX_URL_LENGTH: usize = 500;

/// Result of a successful submission
#[derive(Debug)]
pub struct Submission {
    pub short_code: String,
    pub recent: Vec<RecentUrl>,
}

/// Runs synchronous redb or argon2 work off the async workers
pub async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

fn validate_url(url: Option<&str>) -> Result<&str, AppError> {
    let url = url.map(str::trim).unwrap_or_default();

    // Anything that cannot become a `Location` header could never redirect
    if url.is_empty() || HeaderValue::from_str(url).is_err() {
        return Err(AppError::Validation("Please enter a valid URL".to_string()));
    }
    if url.chars().count() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "URL must be at most {MAX_URL_LENGTH} characters long"
        )));
    }

    Ok(url)
}

/// Validates `url` and persists it under a fresh code for `account`
///
/// Blocks on redb; async callers go through [`submit`].
pub fn shorten_for(
    state: &AppState,
    account: Option<AccountId>,
    url: Option<&str>,
) -> Result<RecentUrl, AppError> {
    let url = validate_url(url)?;
    let policy = state.config.allocation_policy();

    let shortened = shorten(&state.urls, state.generator.as_ref(), &policy, url, account)?;
    info!(code = %shortened.short_code, owner = ?account, "short link created");

    Ok(RecentUrl {
        original_url: url.to_string(),
        short_code: shortened.short_code,
    })
}

/// Shortens `url` on behalf of `account` (or the guest behind `session`)
///
/// Every submission is persisted. Guest submissions are also recorded in the
/// session's history, which is what guests see as their recent list.
pub async fn submit(
    state: &AppState,
    session: &Session,
    account: Option<AccountId>,
    url: Option<String>,
) -> Result<Submission, AppError> {
    let entry = {
        let state = state.clone();
        run_blocking(move || shorten_for(&state, account, url.as_deref())).await?
    };
    let short_code = entry.short_code.clone();

    if account.is_none() {
        GuestHistory::new(session).append(entry).await?;
    }

    Ok(Submission {
        short_code,
        recent: recent_for(state, session, account).await?,
    })
}

/// Up to five most recent entries for the requester, newest first
pub async fn recent_for(
    state: &AppState,
    session: &Session,
    account: Option<AccountId>,
) -> Result<Vec<RecentUrl>, AppError> {
    match account {
        Some(owner) => {
            let urls = state.urls.clone();
            run_blocking(move || {
                Ok(urls
                    .list_recent_by_owner(owner, RECENT_LIMIT)?
                    .into_iter()
                    .map(RecentUrl::from)
                    .collect())
            })
            .await
        }
        None => Ok(GuestHistory::new(session).list(RECENT_LIMIT).await?),
    }
}

/// Destination of `code`, or `AppError::NotFound`
pub fn resolve<R>(urls: &R, code: &str) -> Result<String, AppError>
where
    R: UrlRepository + ?Sized,
{
    urls.find_by_code(code)?
        .map(|record| record.original_url)
        .ok_or(AppError::NotFound)
}
