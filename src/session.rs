//! Identity carried by the session
//!
//! Sessions are managed by `tower-sessions`; see `middleware::session_layer`
//! for the cookie settings. The signed-in account is stored under
//! [`ACCOUNT_KEY`]; a session without it belongs to a guest.

use std::future::Future;

use tower_sessions::{session, Session};

use crate::model::AccountId;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "quicklink_session";

/// Session key holding the signed-in account id
pub const ACCOUNT_KEY: &str = "account_id";

/// Resolves the account behind a request
pub trait IdentityProvider {
    fn current_account(
        &self,
    ) -> impl Future<Output = Result<Option<AccountId>, session::Error>> + Send;
}

impl IdentityProvider for Session {
    async fn current_account(&self) -> Result<Option<AccountId>, session::Error> {
        self.get(ACCOUNT_KEY).await
    }
}

/// Binds `account` to the session under a fresh session id
///
/// The id is cycled so a cookie obtained before login never carries the
/// account.
pub async fn sign_in(session: &Session, account: AccountId) -> Result<(), session::Error> {
    session.cycle_id().await?;
    session.insert(ACCOUNT_KEY, account).await
}

/// Drops the session and everything stored in it
pub async fn sign_out(session: &Session) -> Result<(), session::Error> {
    session.flush().await
}
