//! Database initialization, table definitions and shared application state
//!
//! This module handles the setup of the embedded redb database and wires the
//! stores and the session store into a single `AppState`.

use redb::{Database, TableDefinition};
use std::sync::Arc;
use tower_sessions::MemoryStore;

use crate::config::Config;
use crate::error::StoreError;
use crate::generator::{CodeGenerator, RandomCodeGenerator};
use crate::store::{AccountStore, UrlStore};

/// Main table for storing URL records
///
/// Key: short code
/// Value: JSON-serialized UrlRecord
///
/// Example:
/// - Key: "aZ3k9Q"
/// - Value: '{"id":7,"original_url":"https://example.com","short_code":"aZ3k9Q",...}'
pub const TABLE_URLS: TableDefinition<&str, &str> = TableDefinition::new("urls_v1");

/// Index table for listing the records of one owner, newest first
///
/// Key: composite key "{owner_id:020}:{record_id:020}"
/// Value: JSON-serialized UrlRecord
///
/// Zero padding keeps lexicographic order equal to numeric order, so a
/// reversed range scan over one owner's prefix yields the newest records.
pub const TABLE_OWNER_INDEX: TableDefinition<&str, &str> = TableDefinition::new("owner_index_v1");

/// Accounts keyed by username
///
/// Key: username
/// Value: JSON-serialized Account
pub const TABLE_ACCOUNTS: TableDefinition<&str, &str> = TableDefinition::new("accounts_v1");

/// Last issued identifier per sequence name ("urls", "accounts")
pub const TABLE_SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences_v1");

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub urls: UrlStore,
    pub accounts: AccountStore,
    pub sessions: MemoryStore,
    pub generator: Arc<dyn CodeGenerator>,
}

impl AppState {
    /// Builds the state around an initialized database with the random generator
    pub fn new(db: Arc<Database>, config: Config) -> Self {
        Self::with_generator(db, config, Arc::new(RandomCodeGenerator))
    }

    pub fn with_generator(
        db: Arc<Database>,
        config: Config,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            urls: UrlStore::new(db.clone()),
            accounts: AccountStore::new(db),
            sessions: MemoryStore::default(),
            generator,
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use quicklink::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, StoreError> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_URLS)?;
        write_txn.open_table(TABLE_OWNER_INDEX)?;
        write_txn.open_table(TABLE_ACCOUNTS)?;
        write_txn.open_table(TABLE_SEQUENCES)?;
    }
    write_txn.commit()?;

    Ok(db)
}
