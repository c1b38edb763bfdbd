// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Stateless session tokens.
//!
//! A token is `base64(payload).base64(mac)` where `payload` is
//! `"{user_id}.{expires_at_ms}"` and `mac` is HMAC-SHA256 over the payload
//! keyed with the server secret. Both halves use standard padded base64, so
//! neither contains a `.`.
//!
//! A token is accepted iff the MAC verifies against the decoded payload and
//! the embedded expiry is strictly later than `now`.

use base64ct::{Base64, Encoding};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// The signed contents of a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPayload {
    pub user_id: i64,
    /// Expiry in epoch milliseconds
    pub expires_at_ms: i64,
}

impl SessionPayload {
    /// Payload for `user_id` expiring `ttl` after `now`.
    pub fn new(user_id: i64, ttl: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            expires_at_ms: now
                .timestamp_millis()
                .saturating_add(ttl.num_milliseconds()),
        }
    }

    fn message(&self) -> String {
        format!("{}.{}", self.user_id, self.expires_at_ms)
    }
}

/// HMAC takes keys of any length, so this is `None` only if that ever
/// stops holding.
fn keyed_mac(secret: &[u8]) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(secret).ok()
}

/// Sign a payload into a cookie-ready token.
///
/// `None` only if `secret` cannot key HMAC-SHA256, which does not happen
/// for any byte string.
pub fn mint(payload: &SessionPayload, secret: &[u8]) -> Option<String> {
    let message = payload.message();
    let mut mac = keyed_mac(secret)?;
    mac.update(message.as_bytes());
    let signature = Base64::encode_string(&mac.finalize().into_bytes());
    Some(format!(
        "{}.{}",
        Base64::encode_string(message.as_bytes()),
        signature
    ))
}

/// Check a token's signature and expiry at `now`.
///
/// Never panics on hostile input; every failure is a [`TokenError`].
pub fn verify(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<SessionPayload, TokenError> {
    let (encoded, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
    if encoded.is_empty() || signature.is_empty() {
        return Err(TokenError::Malformed);
    }

    let decoded = Base64::decode_vec(encoded).map_err(|_| TokenError::Malformed)?;
    let message = String::from_utf8(decoded).map_err(|_| TokenError::Malformed)?;
    let (user_id, expires_at) = message.split_once('.').ok_or(TokenError::Malformed)?;

    // MAC check covers the exact decoded bytes, before any field is trusted.
    let signature = Base64::decode_vec(signature).map_err(|_| TokenError::BadSignature)?;
    let Some(mut mac) = keyed_mac(secret) else {
        return Err(TokenError::BadSignature);
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    let expires_at_ms: i64 = expires_at.parse().map_err(|_| TokenError::Malformed)?;
    if expires_at_ms <= now.timestamp_millis() {
        return Err(TokenError::Expired);
    }

    let user_id: i64 = user_id.parse().map_err(|_| TokenError::Malformed)?;
    if user_id <= 0 {
        return Err(TokenError::Malformed);
    }

    Ok(SessionPayload {
        user_id,
        expires_at_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"s3cr3t";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
    }

    fn mint_for(user_id: i64, ttl: TimeDelta) -> String {
        mint(&SessionPayload::new(user_id, ttl, t0()), SECRET).unwrap()
    }

    #[test]
    fn round_trip_returns_user_id() {
        for user_id in [1, 42, 9_007_199_254_740_991] {
            let token = mint_for(user_id, TimeDelta::hours(12));
            let payload = verify(&token, SECRET, t0()).unwrap();
            assert_eq!(payload.user_id, user_id);
        }
    }

    #[test]
    fn token_encodes_payload_as_base64() {
        let token = mint_for(42, TimeDelta::hours(12));
        let (encoded, signature) = token.split_once('.').unwrap();
        let expected_exp = t0().timestamp_millis() + 12 * 3600 * 1000;
        let decoded = Base64::decode_vec(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), format!("42.{expected_exp}"));
        // 32-byte MAC in padded base64
        assert_eq!(signature.len(), 44);
        assert!(!signature.contains('.'));
    }

    #[test]
    fn concrete_scenario_valid_then_expired() {
        let token = mint_for(42, TimeDelta::hours(12));
        let one_hour_later = t0() + TimeDelta::hours(1);
        let thirteen_hours_later = t0() + TimeDelta::hours(13);

        assert_eq!(verify(&token, SECRET, one_hour_later).unwrap().user_id, 42);
        assert_eq!(
            verify(&token, SECRET, thirteen_hours_later),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn negative_ttl_is_already_expired() {
        let token = mint_for(42, TimeDelta::hours(-1));
        assert_eq!(verify(&token, SECRET, t0()), Err(TokenError::Expired));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let token = mint_for(7, TimeDelta::milliseconds(500));
        let at_expiry = t0() + TimeDelta::milliseconds(500);
        let just_before = t0() + TimeDelta::milliseconds(499);
        assert_eq!(verify(&token, SECRET, at_expiry), Err(TokenError::Expired));
        assert!(verify(&token, SECRET, just_before).is_ok());
    }

    #[test]
    fn any_bit_flip_in_mac_is_rejected() {
        let token = mint_for(42, TimeDelta::hours(12));
        let (encoded, signature) = token.split_once('.').unwrap();
        let mac = Base64::decode_vec(signature).unwrap();

        for byte in 0..mac.len() {
            for bit in 0..8 {
                let mut tampered = mac.clone();
                tampered[byte] ^= 1 << bit;
                let forged = format!("{encoded}.{}", Base64::encode_string(&tampered));
                assert_eq!(
                    verify(&forged, SECRET, t0()),
                    Err(TokenError::BadSignature),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn truncated_mac_is_rejected() {
        let token = mint_for(42, TimeDelta::hours(12));
        let (encoded, signature) = token.split_once('.').unwrap();
        let mac = Base64::decode_vec(signature).unwrap();
        let forged = format!("{encoded}.{}", Base64::encode_string(&mac[..16]));
        assert_eq!(verify(&forged, SECRET, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn swapped_payload_is_rejected() {
        let token = mint_for(42, TimeDelta::hours(12));
        let (_, signature) = token.split_once('.').unwrap();
        let expires_at = t0().timestamp_millis() + 12 * 3600 * 1000;
        let escalated = Base64::encode_string(format!("1.{expires_at}").as_bytes());
        let forged = format!("{escalated}.{signature}");
        assert_eq!(verify(&forged, SECRET, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn extended_expiry_is_rejected() {
        let token = mint_for(42, TimeDelta::hours(-1));
        let (_, signature) = token.split_once('.').unwrap();
        let far_future = t0().timestamp_millis() + 1_000 * 3600 * 1000;
        let extended = Base64::encode_string(format!("42.{far_future}").as_bytes());
        let forged = format!("{extended}.{signature}");
        assert_eq!(verify(&forged, SECRET, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = mint_for(42, TimeDelta::hours(12));
        assert_eq!(
            verify(&token, b"another-secret", t0()),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn keys_of_any_length_sign_and_verify() {
        let long_key = [7u8; 200];
        for key in [&b""[..], &b"k"[..], &long_key[..]] {
            let token = mint(&SessionPayload::new(9, TimeDelta::hours(1), t0()), key)
                .expect("HMAC accepts any key length");
            assert_eq!(verify(&token, key, t0()).map(|p| p.user_id), Ok(9));
        }
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for input in ["", ".", "not-a-token", "a.b.c", "abc.", ".abc", "!!!!.AAAA"] {
            assert_eq!(
                verify(input, SECRET, t0()),
                Err(TokenError::Malformed),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn payload_without_separator_is_malformed() {
        let encoded = Base64::encode_string(b"42");
        let token = format!("{encoded}.AAAA");
        assert_eq!(verify(&token, SECRET, t0()), Err(TokenError::Malformed));
    }

    fn signed(message: &str) -> String {
        let mut mac = keyed_mac(SECRET).unwrap();
        mac.update(message.as_bytes());
        format!(
            "{}.{}",
            Base64::encode_string(message.as_bytes()),
            Base64::encode_string(&mac.finalize().into_bytes())
        )
    }

    #[test]
    fn correctly_signed_garbage_fields_are_malformed() {
        let exp = t0().timestamp_millis() + 3600 * 1000;
        assert_eq!(
            verify(&signed(&format!("abc.{exp}")), SECRET, t0()),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            verify(&signed("42.soon"), SECRET, t0()),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            verify(&signed(&format!("0.{exp}")), SECRET, t0()),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            verify(&signed(&format!("-5.{exp}")), SECRET, t0()),
            Err(TokenError::Malformed)
        );
    }
}
