//! Account type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account identifier - server-generated UUID
pub type AccountId = Uuid;

/// Stored account record
///
/// The password is kept verbatim. It is never part of [`AccountView`].
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct Account {
    // Identity (immutable after creation)
    pub id: AccountId,
    pub created_at: DateTime<Utc>,
    pub login: String,
    pub project_id: Uuid,
    pub env: String,
    pub domain: String,

    // Credential
    pub password: String,

    // Lock state
    pub is_locked: bool,
    pub locktime: Option<DateTime<Utc>>,
}

impl Account {
    /// Build a fresh, unlocked account with a generated id and creation time
    pub fn new(new: NewAccount) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            login: new.login,
            project_id: new.project_id,
            env: new.env,
            domain: new.domain,
            password: new.password,
            is_locked: false,
            locktime: None,
        }
    }

    pub fn lock_state(&self) -> LockState {
        if self.is_locked {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }

    /// Apply a lock transition. Returns false when already in `target`.
    pub fn apply_lock(&mut self, target: LockState, at: DateTime<Utc>) -> bool {
        if self.lock_state() == target {
            return false;
        }
        match target {
            LockState::Locked => {
                self.is_locked = true;
                self.locktime = Some(at);
            }
            LockState::Unlocked => {
                self.is_locked = false;
                self.locktime = None;
            }
        }
        true
    }

    /// Apply a patch. Only mutable fields are touched.
    pub fn apply_patch(&mut self, patch: AccountPatch) {
        if let Some(password) = patch.password {
            self.password = password;
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("project_id", &self.project_id)
            .field("env", &self.env)
            .field("domain", &self.domain)
            .field("is_locked", &self.is_locked)
            .finish_non_exhaustive()
    }
}

/// Input for account creation
#[derive(Clone)]
pub struct NewAccount {
    pub login: String,
    pub password: String,
    pub project_id: Uuid,
    pub env: String,
    pub domain: String,
}

/// Partial update. `None` fields are left untouched.
#[derive(Clone, Default)]
pub struct AccountPatch {
    pub password: Option<String>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.password.is_none()
    }
}

/// Per-account lock state machine: Unlocked <-> Locked
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockState::Unlocked => write!(f, "unlocked"),
            LockState::Locked => write!(f, "locked"),
        }
    }
}

/// Outward-facing account representation (no password)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccountView {
    pub id: AccountId,
    pub login: String,
    pub project_id: Uuid,
    pub env: String,
    pub domain: String,
    pub created_at: DateTime<Utc>,
    pub is_locked: bool,
    pub locktime: Option<DateTime<Utc>>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            login: account.login,
            project_id: account.project_id,
            env: account.env,
            domain: account.domain,
            created_at: account.created_at,
            is_locked: account.is_locked,
            locktime: account.locktime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account::new(NewAccount {
            login: "a@x.com".to_string(),
            password: "password123".to_string(),
            project_id: Uuid::new_v4(),
            env: "dev".to_string(),
            domain: "regular".to_string(),
        })
    }

    #[test]
    fn test_new_account_is_unlocked() {
        let account = sample();
        assert!(!account.is_locked);
        assert!(account.locktime.is_none());
        assert_eq!(account.lock_state(), LockState::Unlocked);
    }

    #[test]
    fn test_lock_self_transition_rejected() {
        let mut account = sample();
        let now = Utc::now();

        assert!(!account.apply_lock(LockState::Unlocked, now));
        assert!(account.apply_lock(LockState::Locked, now));
        assert_eq!(account.locktime, Some(now));
        assert!(!account.apply_lock(LockState::Locked, now));
        assert!(account.apply_lock(LockState::Unlocked, now));
        assert!(account.locktime.is_none());
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut account = sample();
        let before = account.clone();
        account.apply_patch(AccountPatch::default());
        assert_eq!(account, before);
    }

    #[test]
    fn test_view_and_debug_hide_password() {
        let account = sample();
        let json = serde_json::to_string(&AccountView::from(account.clone())).unwrap();
        assert!(!json.contains("password"));
        assert!(!format!("{:?}", account).contains("password123"));
    }
}
