use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::{Db, Tree};
use std::path::Path;
use tracing::{debug, error};

use crate::account::{Account, AccountId, AccountPatch, AccountStore, LockState, StoreError, StoreResult};

const ACCOUNTS_TREE: &str = "accounts";
const LOGINS_TREE: &str = "logins";

/// Durable account store on sled
///
/// `accounts`: id bytes -> bincode(Account)
/// `logins`:   login -> id bytes (unique index)
pub struct SledStore {
    db: Db,
    accounts: Tree,
    logins: Tree,
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        error!("sled error: {}", err);
        StoreError::Backend(err.to_string())
    }
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::with_db(db)
    }

    /// Throwaway database, removed on drop
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_db(db)
    }

    fn with_db(db: Db) -> StoreResult<Self> {
        let accounts = db.open_tree(ACCOUNTS_TREE)?;
        let logins = db.open_tree(LOGINS_TREE)?;
        Ok(SledStore { db, accounts, logins })
    }

    async fn flush(&self) -> StoreResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

fn encode(account: &Account) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(account).map_err(|e| StoreError::Backend(format!("encode: {}", e)))
}

fn decode(data: &[u8]) -> Result<Account, StoreError> {
    bincode::deserialize(data).map_err(|e| StoreError::Backend(format!("decode: {}", e)))
}

fn abort<T>(err: StoreError) -> Result<T, ConflictableTransactionError<StoreError>> {
    Err(ConflictableTransactionError::Abort(err))
}

fn flatten(err: TransactionError<StoreError>) -> StoreError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => e.into(),
    }
}

#[async_trait]
impl AccountStore for SledStore {
    async fn insert(&self, account: Account) -> StoreResult<Account> {
        let value = encode(&account)?;
        let id = &account.id.as_bytes()[..];
        let login = account.login.as_bytes();

        (&self.accounts, &self.logins)
            .transaction(|(accounts, logins)| {
                if logins.get(login)?.is_some() {
                    return abort(StoreError::Conflict(account.login.clone()));
                }
                logins.insert(login, id)?;
                accounts.insert(id, value.clone())?;
                Ok(())
            })
            .map_err(flatten)?;

        self.flush().await?;
        debug!(account_id = %account.id, "Account persisted");
        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        match self.accounts.get(id.as_bytes())? {
            Some(data) => Ok(Some(decode(&data)?)),
            None => Ok(None),
        }
    }

    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Account>> {
        match self.logins.get(login.as_bytes())? {
            Some(id) => match self.accounts.get(id)? {
                Some(data) => Ok(Some(decode(&data)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<Account>> {
        self.accounts
            .iter()
            .values()
            .map(|data| decode(&data?))
            .collect()
    }

    async fn update(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Account> {
        let key = &id.as_bytes()[..];
        let account = self
            .accounts
            .transaction(|tx| {
                let Some(data) = tx.get(key)? else {
                    return abort(StoreError::NotFound(id));
                };
                let mut account = decode(&data).or_else(abort)?;
                account.apply_patch(patch.clone());
                tx.insert(key, encode(&account).or_else(abort)?)?;
                Ok(account)
            })
            .map_err(flatten)?;

        self.flush().await?;
        Ok(account)
    }

    async fn delete(&self, id: AccountId) -> StoreResult<()> {
        let key = &id.as_bytes()[..];
        (&self.accounts, &self.logins)
            .transaction(|(accounts, logins)| {
                let Some(data) = accounts.remove(key)? else {
                    return abort(StoreError::NotFound(id));
                };
                let account = decode(&data).or_else(abort)?;
                logins.remove(account.login.as_bytes())?;
                Ok(())
            })
            .map_err(flatten)?;

        self.flush().await
    }

    async fn transition_lock(
        &self,
        id: AccountId,
        target: LockState,
        at: DateTime<Utc>,
    ) -> StoreResult<Account> {
        let key = &id.as_bytes()[..];
        let account = self
            .accounts
            .transaction(|tx| {
                let Some(data) = tx.get(key)? else {
                    return abort(StoreError::NotFound(id));
                };
                let mut account = decode(&data).or_else(abort)?;
                if !account.apply_lock(target, at) {
                    return abort(StoreError::LockState { id, state: target });
                }
                tx.insert(key, encode(&account).or_else(abort)?)?;
                Ok(account)
            })
            .map_err(flatten)?;

        self.flush().await?;
        Ok(account)
    }
}
