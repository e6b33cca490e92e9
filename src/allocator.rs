//! Collision-free short code allocation
//!
//! `allocate` keeps drawing candidates until one is absent from the store.
//! That check alone cannot stop two concurrent requests from picking the same
//! free code, so `shorten` treats a `CodeConflict` from the store's insert as
//! a signal to allocate again. Both share one bounded attempt budget.

use tracing::{debug, warn};

use crate::error::{AllocationError, StoreError};
use crate::generator::{CodeGenerator, DEFAULT_CODE_LENGTH};
use crate::model::{AccountId, NewUrlRecord, RecordId};
use crate::store::UrlRepository;

/// Codes that would be shadowed by fixed routes
pub const RESERVED_CODES: &[&str] = &["login", "logout", "signup"];

/// Default attempt budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Length of issued codes and how many candidates one request may draw
#[derive(Debug, Clone, Copy)]
pub struct AllocationPolicy {
    pub code_length: usize,
    pub max_attempts: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Returns a code that was absent from `repo` at the time of the check
pub fn allocate<R>(
    repo: &R,
    generator: &dyn CodeGenerator,
    policy: &AllocationPolicy,
) -> Result<String, AllocationError>
where
    R: UrlRepository + ?Sized,
{
    let mut attempts = 0;
    next_free_code(repo, generator, policy, &mut attempts)
}

fn next_free_code<R>(
    repo: &R,
    generator: &dyn CodeGenerator,
    policy: &AllocationPolicy,
    attempts: &mut u32,
) -> Result<String, AllocationError>
where
    R: UrlRepository + ?Sized,
{
    while *attempts < policy.max_attempts {
        *attempts += 1;

        let candidate = generator.generate(policy.code_length);
        if RESERVED_CODES.contains(&candidate.as_str()) {
            continue;
        }
        if !repo.exists(&candidate)? {
            return Ok(candidate);
        }

        debug!(code = %candidate, attempt = *attempts, "short code candidate already taken");
    }

    Err(AllocationError::Exhausted(policy.max_attempts))
}

/// Outcome of a successful `shorten`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub id: RecordId,
    pub short_code: String,
}

/// Allocates a code and persists `original_url` under it
///
/// An insert-time conflict means another writer claimed the code between the
/// existence check and the insert; allocation restarts without surfacing it.
pub fn shorten<R>(
    repo: &R,
    generator: &dyn CodeGenerator,
    policy: &AllocationPolicy,
    original_url: &str,
    owner: Option<AccountId>,
) -> Result<Shortened, AllocationError>
where
    R: UrlRepository + ?Sized,
{
    let mut attempts = 0;

    loop {
        let code = next_free_code(repo, generator, policy, &mut attempts)?;

        let new = NewUrlRecord {
            original_url: original_url.to_string(),
            short_code: code.clone(),
            owner_id: owner,
        };

        match repo.insert(new) {
            Ok(id) => return Ok(Shortened { id, short_code: code }),
            Err(StoreError::CodeConflict(_)) => {
                warn!(code = %code, attempt = attempts, "short code claimed concurrently, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}
