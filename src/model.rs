//! Data models for the URL shortener application
//!
//! This module defines the records persisted in the embedded database, the
//! form payloads accepted at the HTTP boundary and the JSON bodies returned
//! to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a persisted URL record
pub type RecordId = u64;

/// Identifier of a registered account
pub type AccountId = u64;

/// Represents a URL record stored in the database
///
/// Records are append-only: once written, neither the short code nor the
/// owner ever change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// Monotonically assigned record identifier
    pub id: RecordId,

    /// The original long URL that was shortened
    pub original_url: String,

    /// Globally unique short code (e.g., "aZ3k9Q")
    pub short_code: String,

    /// Account that created this record
    /// Absent for submissions made by guests
    pub owner_id: Option<AccountId>,

    /// Timestamp when this URL record was created
    pub created_at: DateTime<Utc>,
}

/// A URL record that has not been written yet
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub short_code: String,
    pub owner_id: Option<AccountId>,
}

/// A registered account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,

    /// Argon2id PHC string, never the plain password
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// One entry of a "recently shortened" list
///
/// Used both for guest history held in the session and for the view of an
/// account's own records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecentUrl {
    pub original_url: String,
    pub short_code: String,
}

impl From<UrlRecord> for RecentUrl {
    fn from(record: UrlRecord) -> Self {
        Self {
            original_url: record.original_url,
            short_code: record.short_code,
        }
    }
}

/// Form payload for `POST /`
///
/// The field is optional so a missing value surfaces as a validation error
/// instead of an extractor rejection.
#[derive(Deserialize, Default)]
pub struct ShortenForm {
    pub url: Option<String>,
}

/// Form payload for `POST /signup` and `POST /login`
#[derive(Deserialize, Default)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response body of the home page
///
/// # Example
/// ```json
/// {
///   "short_code": "aZ3k9Q",
///   "short_url": "http://localhost:8080/aZ3k9Q",
///   "recent": [{ "original_url": "https://example.com", "short_code": "aZ3k9Q" }]
/// }
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct HomeResponse {
    /// The code minted by this request, if any
    pub short_code: Option<String>,

    /// The complete shortened URL for `short_code`
    pub short_url: Option<String>,

    /// Up to five most recent entries for the requester, newest first
    pub recent: Vec<RecentUrl>,
}
