// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! In-memory user store for tests and ephemeral development runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Credential, StoreError, StoreResult, StoredUser, UserStore};
use crate::auth::{password::normalize_email, AuthenticatedUser, Role};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, StoredUser>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Remove a user. Returns whether it existed.
    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.write()?.users.remove(&id).is_some())
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.check_available()?;
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.check_available()?;
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl UserStore for InMemoryUserStore {
    fn get_credential(&self, email: &str) -> StoreResult<Option<Credential>> {
        let email = normalize_email(email);
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .map(StoredUser::credential))
    }

    fn get_user_by_id(&self, id: i64) -> StoreResult<Option<AuthenticatedUser>> {
        Ok(self.read()?.users.get(&id).map(StoredUser::to_authenticated))
    }

    fn create_user(&self, email: &str, password: &str, role: Role) -> StoreResult<StoredUser> {
        let email = normalize_email(email);
        let mut inner = self.write()?;
        if inner.users.values().any(|user| user.email == email) {
            return Err(StoreError::AlreadyExists(format!("User {email}")));
        }

        inner.next_id += 1;
        let user = StoredUser::new(inner.next_id, &email, password, role)?;
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}
