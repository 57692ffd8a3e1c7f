//! Cookie plumbing: session id and one-shot flash messages.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::Duration;
use serde::Serialize;

use rolegate_core::SessionId;

pub const SESSION_COOKIE: &str = "rolegate_session";
pub const FLASH_COOKIE: &str = "rolegate_flash";

/// Attributes shared by every cookie the service sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub session_ttl: Duration,
}

impl CookiePolicy {
    fn attributes(&self) -> &'static str {
        if self.secure {
            "Path=/; HttpOnly; SameSite=Lax; Secure"
        } else {
            "Path=/; HttpOnly; SameSite=Lax"
        }
    }

    pub fn session(&self, id: SessionId) -> String {
        format!(
            "{SESSION_COOKIE}={id}; Max-Age={}; {}",
            self.session_ttl.num_seconds(),
            self.attributes()
        )
    }

    pub fn clear_session(&self) -> String {
        format!("{SESSION_COOKIE}=; Max-Age=0; {}", self.attributes())
    }

    pub fn flash(&self, flash: &Flash) -> String {
        format!("{FLASH_COOKIE}={}; {}", flash.encode(), self.attributes())
    }

    pub fn clear_flash(&self) -> String {
        format!("{FLASH_COOKIE}=; Max-Age=0; {}", self.attributes())
    }
}

/// Value of cookie `name` from the request headers.
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Info,
    Error,
}

impl FlashKind {
    fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Info => "info",
            FlashKind::Error => "error",
        }
    }
}

/// Message carried across one redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, message: message.into() }
    }

    /// `kind:url-encoded-text`, safe as a cookie value.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.kind.as_str(), urlencoding::encode(&self.message))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (kind, text) = raw.split_once(':')?;
        let kind = match kind {
            "success" => FlashKind::Success,
            "info" => FlashKind::Info,
            "error" => FlashKind::Error,
            _ => return None,
        };
        let message = urlencoding::decode(text).ok()?.into_owned();
        Some(Self { kind, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy(secure: bool) -> CookiePolicy {
        CookiePolicy { secure, session_ttl: Duration::seconds(600) }
    }

    #[test]
    fn reads_named_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("a=1; rolegate_session=abc; b=2"));
        assert_eq!(read(&headers, SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(read(&headers, "missing"), None);
    }

    #[test]
    fn flash_survives_encoding_with_punctuation() {
        let flash = Flash::error("Invalid email or password. Try again; please = thanks");
        let encoded = flash.encode();
        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
        assert_eq!(Flash::decode(&encoded), Some(flash));
    }

    #[test]
    fn unknown_flash_kind_is_ignored() {
        assert_eq!(Flash::decode("shout:hello"), None);
        assert_eq!(Flash::decode("no-separator"), None);
    }

    #[test]
    fn session_cookie_carries_policy_attributes() {
        let id = SessionId::new();
        let cookie = policy(true).session(id);
        assert!(cookie.starts_with(&format!("rolegate_session={id};")));
        assert!(cookie.contains("Max-Age=600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(!policy(false).session(id).contains("Secure"));
    }

    #[test]
    fn clearing_expires_immediately() {
        assert!(policy(false).clear_session().contains("Max-Age=0"));
        assert!(policy(false).clear_flash().starts_with("rolegate_flash=;"));
    }
}
