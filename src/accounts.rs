//! Account signup and credential checks
//!
//! Accounts only exist to own URL records; there is no profile editing or
//! removal.

use std::ops::RangeInclusive;

use crate::error::AppError;
use crate::model::Account;
use crate::password::{hash_password, verify_password};
use crate::store::AccountStore;

pub const USERNAME_LENGTH: RangeInclusive<usize> = 5..=9;

const USERNAME_LENGTH_MESSAGE: &str = "Username must be between 5 to 9 characters long";
const BAD_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Validates and registers a new account
pub fn signup(
    accounts: &AccountStore,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Account, AppError> {
    let username = username.unwrap_or_default();
    if !USERNAME_LENGTH.contains(&username.chars().count()) {
        return Err(AppError::Validation(USERNAME_LENGTH_MESSAGE.to_string()));
    }

    let password = password.unwrap_or_default();
    if password.is_empty() {
        return Err(AppError::Validation("Please enter a password".to_string()));
    }

    if accounts.find_by_username(username)?.is_some() {
        return Err(AppError::Conflict("This username already exists".to_string()));
    }

    let password_hash = hash_password(password)?;
    Ok(accounts.create(username, password_hash)?)
}

/// Returns the account matching the credentials
///
/// Unknown usernames and wrong passwords produce the same error.
pub fn authenticate(
    accounts: &AccountStore,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Account, AppError> {
    let rejected = || AppError::Authentication(BAD_CREDENTIALS_MESSAGE.to_string());

    let (Some(username), Some(password)) = (username, password) else {
        return Err(rejected());
    };

    let account = accounts.find_by_username(username)?.ok_or_else(rejected)?;
    if !verify_password(password, &account.password_hash)? {
        return Err(rejected());
    }

    Ok(account)
}
