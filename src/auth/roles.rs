// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Console user roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Console user roles.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access to the console, including settings and users
/// - `Editor` - Manages fans, content, posts, sponsors and media
/// - `Viewer` - Read-only access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Parse a stored role, falling back to the least privileged role.
    pub fn from_stored(s: &str) -> Role {
        Role::from_str(s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl Default for Role {
    /// Default role is Viewer (least privilege).
    fn default() -> Self {
        Role::Viewer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
