//! Persistent stores for URL records and accounts
//!
//! Both stores sit on the shared redb database. redb runs write transactions
//! one at a time, so a uniqueness check and the insert that follows it inside
//! the same write transaction cannot interleave with another writer.

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, WriteTransaction};
use std::sync::Arc;

use crate::database::{TABLE_ACCOUNTS, TABLE_OWNER_INDEX, TABLE_SEQUENCES, TABLE_URLS};
use crate::error::StoreError;
use crate::model::{Account, AccountId, NewUrlRecord, RecordId, UrlRecord};

const URL_SEQUENCE: &str = "urls";
const ACCOUNT_SEQUENCE: &str = "accounts";

/// Durable mapping from short code to destination
///
/// Every implementation must reject a duplicate code in `insert` atomically;
/// callers rely on that instead of on their own existence checks.
pub trait UrlRepository: Send + Sync {
    /// Persists a record, failing with `StoreError::CodeConflict` if the code is taken
    fn insert(&self, record: NewUrlRecord) -> Result<RecordId, StoreError>;

    fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError>;

    fn exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_code(code)?.is_some())
    }

    /// Records created by `owner`, newest first, at most `limit` of them
    fn list_recent_by_owner(
        &self,
        owner: AccountId,
        limit: usize,
    ) -> Result<Vec<UrlRecord>, StoreError>;
}

/// Bumps and returns the named sequence inside an open write transaction
fn next_id(txn: &WriteTransaction, sequence: &str) -> Result<u64, StoreError> {
    let mut table = txn.open_table(TABLE_SEQUENCES)?;
    let next = table.get(sequence)?.map(|guard| guard.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

fn owner_prefix(owner: AccountId) -> String {
    format!("{:020}:", owner)
}

fn owner_index_key(owner: AccountId, id: RecordId) -> String {
    format!("{:020}:{:020}", owner, id)
}

/// redb-backed URL record store
#[derive(Clone)]
pub struct UrlStore {
    db: Arc<Database>,
}

impl UrlStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl UrlRepository for UrlStore {
    fn insert(&self, new: NewUrlRecord) -> Result<RecordId, StoreError> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table_main = write_txn.open_table(TABLE_URLS)?;

            // Dropping the transaction without commit aborts it
            if table_main.get(new.short_code.as_str())?.is_some() {
                return Err(StoreError::CodeConflict(new.short_code));
            }

            let record = UrlRecord {
                id: next_id(&write_txn, URL_SEQUENCE)?,
                original_url: new.original_url,
                short_code: new.short_code,
                owner_id: new.owner_id,
                created_at: Utc::now(),
            };
            let record_json = serde_json::to_string(&record)?;

            table_main.insert(record.short_code.as_str(), record_json.as_str())?;

            if let Some(owner) = record.owner_id {
                let index_key = owner_index_key(owner, record.id);
                let mut table_index = write_txn.open_table(TABLE_OWNER_INDEX)?;
                table_index.insert(index_key.as_str(), record_json.as_str())?;
            }

            record
        };
        write_txn.commit()?;

        Ok(record.id)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_URLS)?;

        match table.get(code)? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    fn list_recent_by_owner(
        &self,
        owner: AccountId,
        limit: usize,
    ) -> Result<Vec<UrlRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_OWNER_INDEX)?;

        // '{' sorts right after ':', bounding the scan to this owner's prefix
        let start_key = owner_prefix(owner);
        let end_key = format!("{:020}{{", owner);

        let mut records = Vec::with_capacity(limit);
        for entry in table
            .range(start_key.as_str()..end_key.as_str())?
            .rev()
            .take(limit)
        {
            let (_, value) = entry?;
            records.push(serde_json::from_str(value.value())?);
        }

        Ok(records)
    }
}

/// redb-backed account store
#[derive(Clone)]
pub struct AccountStore {
    db: Arc<Database>,
}

impl AccountStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates an account, failing with `StoreError::UsernameTaken` on a duplicate username
    pub fn create(&self, username: &str, password_hash: String) -> Result<Account, StoreError> {
        let write_txn = self.db.begin_write()?;
        let account = {
            let mut table = write_txn.open_table(TABLE_ACCOUNTS)?;

            if table.get(username)?.is_some() {
                return Err(StoreError::UsernameTaken(username.to_string()));
            }

            let account = Account {
                id: next_id(&write_txn, ACCOUNT_SEQUENCE)?,
                username: username.to_string(),
                password_hash,
                created_at: Utc::now(),
            };
            let account_json = serde_json::to_string(&account)?;
            table.insert(username, account_json.as_str())?;

            account
        };
        write_txn.commit()?;

        Ok(account)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_ACCOUNTS)?;

        match table.get(username)? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_ACCOUNTS)?;
        Ok(table.len()?)
    }
}
