//! Runtime configuration read from the environment
//!
//! # Environment Variables
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to database file (default: "data.db")
//! - `URL` - Public base URL of short links, e.g. "https://sho.rt" (default:
//!   "http://localhost:{PORT}")
//! - `SESSION_IDLE_MINUTES` - Minutes without a request before a session expires (default: 1440)
//! - `CODE_LENGTH` - Length of generated short codes (default: 6)
//! - `MAX_ALLOCATION_ATTEMPTS` - Candidates drawn per request before giving up (default: 64)
//! - `RUST_LOG` - tracing filter (default: "quicklink=debug,tower_http=debug")
//!
//! Missing or unparsable values fall back to their defaults.

use std::env;
use std::str::FromStr;

use crate::allocator::{AllocationPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::generator::DEFAULT_CODE_LENGTH;

pub const DEFAULT_LOG_FILTER: &str = "quicklink=debug,tower_http=debug";

pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub public_url: Option<String>,
    pub code_length: usize,
    pub max_allocation_attempts: u32,
    pub session_idle_minutes: i64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: "data.db".to_string(),
            public_url: None,
            code_length: DEFAULT_CODE_LENGTH,
            max_allocation_attempts: DEFAULT_MAX_ATTEMPTS,
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parsed_or("PORT", defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            public_url: env::var("URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            code_length: parsed_or("CODE_LENGTH", defaults.code_length).max(1),
            max_allocation_attempts: parsed_or(
                "MAX_ALLOCATION_ATTEMPTS",
                defaults.max_allocation_attempts,
            )
            .max(1),
            session_idle_minutes: parsed_or("SESSION_IDLE_MINUTES", defaults.session_idle_minutes)
                .max(1),
            log_filter: env::var("RUST_LOG").unwrap_or(defaults.log_filter),
        }
    }

    pub fn allocation_policy(&self) -> AllocationPolicy {
        AllocationPolicy {
            code_length: self.code_length,
            max_attempts: self.max_allocation_attempts,
        }
    }

    /// Full short link for `code`
    ///
    /// `URL` is used verbatim when set; otherwise links point at the local
    /// listener, e.g. "http://localhost:8080/aZ3k9Q".
    pub fn short_url(&self, code: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), code),
            None => format!("http://localhost:{}/{}", self.port, code),
        }
    }

    /// Session cookies get the `Secure` flag when links are served over https
    pub fn secure_cookies(&self) -> bool {
        self.public_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"))
    }
}
