//! Per-session history of URLs shortened by guests
//!
//! This is a display cache only. Entries are kept in the guest's session, so
//! they expire with it and are dropped when the session signs in.

use std::collections::VecDeque;

use tower_sessions::{session, Session};

use crate::model::RecentUrl;

/// Number of recent entries shown on the home page
pub const RECENT_LIMIT: usize = 5;

const HISTORY_KEY: &str = "guest_history";

/// Guest history of one session
pub struct GuestHistory<'a> {
    session: &'a Session,
}

impl<'a> GuestHistory<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Records `entry` as the newest item of the session's history
    pub async fn append(&self, entry: RecentUrl) -> Result<(), session::Error> {
        let mut entries = self.entries().await?;
        entries.push_front(entry);
        self.session.insert(HISTORY_KEY, entries).await
    }

    pub async fn clear(&self) -> Result<(), session::Error> {
        self.session
            .remove::<VecDeque<RecentUrl>>(HISTORY_KEY)
            .await
            .map(|_| ())
    }

    /// Newest first, at most `limit` entries
    pub async fn list(&self, limit: usize) -> Result<Vec<RecentUrl>, session::Error> {
        Ok(self.entries().await?.into_iter().take(limit).collect())
    }

    async fn entries(&self) -> Result<VecDeque<RecentUrl>, session::Error> {
        Ok(self.session.get(HISTORY_KEY).await?.unwrap_or_default())
    }
}
