// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Embedded user database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized StoredUser
//! - `users_by_email`: normalised email → user id
//! - `meta`: key → value (`next_user_id`)

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};

use super::{Credential, StoreError, StoreResult, StoredUser, UserStore};
use crate::auth::{password::normalize_email, AuthenticatedUser, Role};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user id → serialized StoredUser (JSON bytes).
const USERS: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Index: normalised email → user id.
const USERS_BY_EMAIL: TableDefinition<&str, i64> = TableDefinition::new("users_by_email");

/// Counters.
const META: TableDefinition<&str, i64> = TableDefinition::new("meta");

const NEXT_USER_ID: &str = "next_user_id";

// =============================================================================
// UserDatabase
// =============================================================================

pub struct UserDatabase {
    db: Database,
}

impl UserDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(META)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Full stored record by id.
    pub fn get(&self, id: i64) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Full stored record by email.
    pub fn get_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let email = normalize_email(email);
        let id = {
            let read_txn = self.db.begin_read()?;
            let index = read_txn.open_table(USERS_BY_EMAIL)?;
            let id = index.get(email.as_str())?.map(|guard| guard.value());
            id
        };
        match id {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    /// Remove a user and its email index entry. Returns whether it existed.
    ///
    /// Lookup and removal share one write transaction, and the index entry
    /// is only dropped while it still points at this id.
    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut users = write_txn.open_table(USERS)?;
            let removed: Option<StoredUser> = match users.remove(id)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };

            match removed {
                Some(user) => {
                    let mut index = write_txn.open_table(USERS_BY_EMAIL)?;
                    let indexed = index.get(user.email.as_str())?.map(|guard| guard.value());
                    if indexed == Some(id) {
                        index.remove(user.email.as_str())?;
                    }
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Number of stored users.
    pub fn count(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        Ok(table.len()?)
    }
}

impl UserStore for UserDatabase {
    fn get_credential(&self, email: &str) -> StoreResult<Option<Credential>> {
        Ok(self.get_by_email(email)?.map(|user| user.credential()))
    }

    fn get_user_by_id(&self, id: i64) -> StoreResult<Option<AuthenticatedUser>> {
        Ok(self.get(id)?.map(|user| user.to_authenticated()))
    }

    fn create_user(&self, email: &str, password: &str, role: Role) -> StoreResult<StoredUser> {
        let email = normalize_email(email);

        let write_txn = self.db.begin_write()?;
        let user = {
            let mut index = write_txn.open_table(USERS_BY_EMAIL)?;
            if index.get(email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("User {email}")));
            }

            let mut meta = write_txn.open_table(META)?;
            let id = meta.get(NEXT_USER_ID)?.map(|guard| guard.value()).unwrap_or(1);
            let user = StoredUser::new(id, &email, password, role)?;
            let json = serde_json::to_vec(&user)?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, json.as_slice())?;
            index.insert(email.as_str(), id)?;
            meta.insert(NEXT_USER_ID, id + 1)?;
            user
        };
        write_txn.commit()?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
