// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

use std::sync::Arc;

use crate::auth::SessionAuthenticator;
use crate::storage::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<SessionAuthenticator>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(authenticator: SessionAuthenticator, users: Arc<dyn UserStore>) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            users,
        }
    }
}
