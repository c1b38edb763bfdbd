// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Stadli Session - cookie sessions for the Stadli admin console
//!
//! Staff sign in with email and password and receive an HMAC-signed `sid`
//! cookie. Every later request is authenticated from that cookie alone,
//! with a single user lookup to confirm the account still exists.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - Session tokens, cookies, passwords and extractors
//! - `config` - Environment configuration
//! - `storage` - User store (redb on disk, in-memory for tests)
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod state;
pub mod storage;
pub mod telemetry;
