//! Account lifecycle and lock rules

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use validator::ValidateEmail;

use super::store::{AccountStore, StoreError};
use super::types::{Account, AccountId, AccountPatch, LockState, NewAccount};

pub const MIN_PASSWORD_LEN: usize = 7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("account {0} not found")]
    NotFound(AccountId),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AccountError::NotFound(id),
            StoreError::Conflict(_) => AccountError::Conflict("login already registered".to_string()),
            StoreError::LockState { state: LockState::Locked, .. } => {
                AccountError::Conflict("account already locked".to_string())
            }
            StoreError::LockState { state: LockState::Unlocked, .. } => {
                AccountError::Conflict("account is not locked".to_string())
            }
            StoreError::Backend(msg) => AccountError::Storage(msg),
        }
    }
}

pub fn validate_login(login: &str) -> Result<(), AccountError> {
    if login.validate_email() {
        Ok(())
    } else {
        Err(AccountError::Validation(format!("login '{}' is not a valid email address", login)))
    }
}

/// Email domains are case-insensitive; the local part is kept as given
pub fn normalize_login(login: &str) -> String {
    match login.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => login.to_string(),
    }
}

pub fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(AccountError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )))
    }
}

/// Business rules on top of an injected [`AccountStore`]
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, mut new: NewAccount) -> Result<Account, AccountError> {
        validate_login(&new.login)?;
        validate_password(&new.password)?;
        new.login = normalize_login(&new.login);

        if self.store.find_by_login(&new.login).await?.is_some() {
            warn!(login = %new.login, "Rejected create: login already registered");
            return Err(AccountError::Conflict("login already registered".to_string()));
        }

        // The store's unique index still catches a concurrent duplicate
        let account = self.store.insert(Account::new(new)).await?;

        info!(account_id = %account.id, login = %account.login, "Account created");
        Ok(account)
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, AccountError> {
        self.store.find_by_id(id).await?.ok_or(AccountError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn update(&self, id: AccountId, patch: AccountPatch) -> Result<Account, AccountError> {
        if let Some(password) = &patch.password {
            validate_password(password)?;
        }
        if patch.is_empty() {
            return self.get(id).await;
        }

        let account = self.store.update(id, patch).await?;
        info!(account_id = %id, "Account updated");
        Ok(account)
    }

    pub async fn delete(&self, id: AccountId) -> Result<(), AccountError> {
        self.store.delete(id).await?;
        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    pub async fn acquire_lock(&self, id: AccountId) -> Result<Account, AccountError> {
        self.transition(id, LockState::Locked).await
    }

    pub async fn release_lock(&self, id: AccountId) -> Result<Account, AccountError> {
        self.transition(id, LockState::Unlocked).await
    }

    async fn transition(&self, id: AccountId, target: LockState) -> Result<Account, AccountError> {
        match self.store.transition_lock(id, target, Utc::now()).await {
            Ok(account) => {
                info!(account_id = %id, state = %target, "Lock state changed");
                Ok(account)
            }
            Err(err @ StoreError::LockState { .. }) => {
                warn!(account_id = %id, "Rejected lock transition: {}", err);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}
