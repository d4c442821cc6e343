//! Account System Module
//!
//! This module implements the account lifecycle:
//! - Account records with a unique email login
//! - Storage abstraction injected into the service
//! - Lock/unlock state machine guarded at the storage layer

pub mod types;
pub mod store;
pub mod service;

pub use types::{Account, AccountId, AccountPatch, AccountView, LockState, NewAccount};
pub use store::{AccountStore, MemoryStore, StoreError, StoreResult};
pub use service::{AccountError, AccountService};
