// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! # User Storage
//!
//! The session layer only needs two lookups from the user store:
//!
//! - credential by email, at login
//! - user by id, on every authenticated request
//!
//! [`UserStore`] is that seam. [`UserDatabase`] is the persistent redb
//! implementation; [`InMemoryUserStore`] backs tests and throwaway dev runs.
//!
//! Emails are stored in normalised form (see
//! [`normalize_email`](crate::auth::password::normalize_email)), so callers
//! may pass user input directly.

pub mod database;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{password, AuthenticatedUser, Role};

pub use database::UserDatabase;
pub use memory::InMemoryUserStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("random number generator failed")]
    Random,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Login material for one user. The salt never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: i64,
    pub password_hash: String,
    pub salt: String,
}

/// Persisted user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    /// Kept as the raw stored string; unknown values resolve to `viewer`.
    pub role: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Build a record with a fresh salt and hash for `password`.
    pub fn new(id: i64, email: &str, password: &str, role: Role) -> StoreResult<Self> {
        let salt = password::generate_salt().map_err(|_| StoreError::Random)?;
        Ok(Self {
            id,
            email: password::normalize_email(email),
            role: role.as_str().to_string(),
            password_hash: password::hash_password(password, &salt),
            salt,
            created_at: Utc::now(),
        })
    }

    pub fn credential(&self) -> Credential {
        Credential {
            user_id: self.id,
            password_hash: self.password_hash.clone(),
            salt: self.salt.clone(),
        }
    }

    pub fn to_authenticated(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id,
            email: self.email.clone(),
            role: Role::from_stored(&self.role),
        }
    }
}

/// Lookups the session layer needs from the user store.
pub trait UserStore: Send + Sync {
    /// Login material for `email`, or `None` if no such user.
    fn get_credential(&self, email: &str) -> StoreResult<Option<Credential>>;

    /// Public identity for `id`, or `None` if the user no longer exists.
    fn get_user_by_id(&self, id: i64) -> StoreResult<Option<AuthenticatedUser>>;

    /// Create a user with a fresh salt. Emails are unique.
    fn create_user(&self, email: &str, password: &str, role: Role) -> StoreResult<StoredUser>;

    /// Cheap availability probe for readiness checks.
    fn ping(&self) -> StoreResult<()>;
}
