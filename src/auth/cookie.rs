// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! `Set-Cookie` rendering and `Cookie` header parsing.
//!
//! Wire format of the session cookie:
//!
//! ```text
//! sid=<base64(payload)>.<base64(hmac)>; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=<seconds>
//! ```

use axum::http::{header::COOKIE, HeaderMap};
use chrono::TimeDelta;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const SESSION_COOKIE_NAME: &str = "sid";
pub const FLASH_COOKIE_NAME: &str = "flash";

const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; Secure; SameSite=Lax";

/// Flash messages only need to survive one redirect.
const FLASH_MAX_AGE_SECS: i64 = 10;

/// Characters JavaScript's `encodeURIComponent` leaves unescaped.
const FLASH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A freshly minted session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
    max_age_secs: i64,
}

impl SessionCookie {
    /// Negative lifetimes render as `Max-Age=0`.
    pub fn new(value: String, ttl: TimeDelta) -> Self {
        Self {
            value,
            max_age_secs: ttl.num_seconds().max(0),
        }
    }

    /// The signed token carried in the cookie.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Full `Set-Cookie` header value.
    pub fn header_string(&self) -> String {
        format!(
            "{SESSION_COOKIE_NAME}={}; {COOKIE_ATTRIBUTES}; Max-Age={}",
            self.value, self.max_age_secs
        )
    }
}

/// `Set-Cookie` value that deletes the session cookie on the client.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; {COOKIE_ATTRIBUTES}; Max-Age=0")
}

/// Short-lived cookie carrying a user-visible message across a redirect.
///
/// Spaces become `%20`, never `+`, so any `decodeURIComponent`-style reader
/// gets the message back verbatim.
pub fn flash_cookie(message: &str) -> String {
    let encoded = utf8_percent_encode(message, FLASH_ENCODE_SET);
    format!("{FLASH_COOKIE_NAME}={encoded}; {COOKIE_ATTRIBUTES}; Max-Age={FLASH_MAX_AGE_SECS}")
}

/// `Set-Cookie` value that removes a consumed flash message.
pub fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE_NAME}=; {COOKIE_ATTRIBUTES}; Max-Age=0")
}

/// Decode the flash message the previous redirect left, if any.
///
/// Invalid UTF-8 after decoding counts as no message.
pub fn read_flash(headers: &HeaderMap) -> Option<String> {
    let raw = find_cookie(headers, FLASH_COOKIE_NAME)?;
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|message| message.into_owned())
}

/// Find a cookie by name across every `Cookie` header.
///
/// Empty values count as absent.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// The raw `sid` cookie value, if the request carries one.
pub fn session_cookie_value(headers: &HeaderMap) -> Option<&str> {
    find_cookie(headers, SESSION_COOKIE_NAME)
}
