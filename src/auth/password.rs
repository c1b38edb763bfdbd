// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Salted password hashes and email normalisation.
//!
//! Stored hashes are `hex(SHA-256(password || salt))`. This is a single fast
//! digest, kept so existing credentials keep working.

use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

const SALT_LEN: usize = 16;

/// Lowercase hex SHA-256 of `password` followed by `salt`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a password against a stored hash without early exit.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let computed = hash_password(password, salt);
    let expected = expected_hash.trim().to_ascii_lowercase();
    if computed.len() != expected.len() {
        return false;
    }
    computed
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Fresh random salt, hex encoded.
pub fn generate_salt() -> Result<String, ring::error::Unspecified> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new().fill(&mut salt)?;
    Ok(hex::encode(salt))
}

/// Canonical form used for lookups: NFKC, trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.nfkc().collect::<String>().trim().to_lowercase()
}
