//! Account storage trait and in-memory backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use super::types::{Account, AccountId, AccountPatch, LockState};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("account {0} not found")]
    NotFound(AccountId),
    #[error("login {0} already registered")]
    Conflict(String),
    #[error("account {id} is already {state}")]
    LockState { id: AccountId, state: LockState },
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed account storage with a unique index on `login`
///
/// Every method is atomic on its own record. `transition_lock` is a
/// conditional update: it only writes when the stored state differs from
/// `target`, so two racing acquires cannot both succeed.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `Conflict` if the login is taken.
    async fn insert(&self, account: Account) -> StoreResult<Account>;

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Account>>;

    /// Full scan, unordered
    async fn list_all(&self) -> StoreResult<Vec<Account>>;

    async fn update(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Account>;

    /// Hard delete. Frees the login for reuse.
    async fn delete(&self, id: AccountId) -> StoreResult<()>;

    /// Move the account to `target` iff it is currently in the other state
    async fn transition_lock(
        &self,
        id: AccountId,
        target: LockState,
        at: DateTime<Utc>,
    ) -> StoreResult<Account>;
}

#[derive(Default)]
struct MemoryInner {
    accounts: HashMap<AccountId, Account>,
    logins: HashMap<String, AccountId>,
}

/// In-memory backend, used for `--ephemeral` runs and tests
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, account: Account) -> StoreResult<Account> {
        let mut inner = self.inner.write().await;
        if inner.logins.contains_key(&account.login) {
            return Err(StoreError::Conflict(account.login));
        }
        inner.logins.insert(account.login.clone(), account.id);
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.logins.get(login).and_then(|id| inner.accounts.get(id)).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Account>> {
        Ok(self.inner.read().await.accounts.values().cloned().collect())
    }

    async fn update(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Account> {
        let mut inner = self.inner.write().await;
        let account = inner.accounts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        account.apply_patch(patch);
        Ok(account.clone())
    }

    async fn delete(&self, id: AccountId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner.accounts.remove(&id).ok_or(StoreError::NotFound(id))?;
        inner.logins.remove(&account.login);
        Ok(())
    }

    async fn transition_lock(
        &self,
        id: AccountId,
        target: LockState,
        at: DateTime<Utc>,
    ) -> StoreResult<Account> {
        let mut inner = self.inner.write().await;
        let account = inner.accounts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !account.apply_lock(target, at) {
            return Err(StoreError::LockState { id, state: target });
        }
        Ok(account.clone())
    }
}
