//! Session cookie pair extraction and `Set-Cookie` rendering.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use cookie::{time::Duration, Cookie, SameSite};

use crate::config::SessionConfig;

/// Cookie holding the opaque backend session token.
pub const SESSION_COOKIE: &str = "session";
/// Cookie holding the stringified backend user id.
pub const USER_ID_COOKIE: &str = "user_id";

/// The `(session, user_id)` pair that represents an authenticated browser.
///
/// Only constructed when both cookies are present and non-empty; anything
/// less is treated as unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookies {
    pub session: String,
    pub user_id: String,
}

impl SessionCookies {
    /// Extract the pair from every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let session = cookie_value(headers, SESSION_COOKIE)?;
        let user_id = cookie_value(headers, USER_ID_COOKIE)?;
        Some(Self { session, user_id })
    }
}

/// Find a non-empty cookie by name across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// Attributes applied to every cookie the gateway sets or clears.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    secure: bool,
    max_age: Duration,
    path: String,
    login_path: String,
}

impl SessionPolicy {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            secure: config.secure_cookies,
            max_age: Duration::seconds(i64::try_from(config.max_age_secs).unwrap_or(i64::MAX)),
            path: config.cookie_path.clone(),
            login_path: config.login_path.clone(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Build a long-lived, HttpOnly, SameSite=Lax cookie.
    pub fn issue(&self, name: &'static str, value: impl Into<String>) -> Cookie<'static> {
        Cookie::build((name, value.into()))
            .path(self.path.clone())
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(self.max_age)
            .build()
    }

    /// Build a removal cookie (empty value, expired) for `name`.
    pub fn clear(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, ""))
            .path(self.path.clone())
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie
    }

    /// Removal cookies for both halves of the session pair.
    pub fn clear_session(&self) -> [Cookie<'static>; 2] {
        [self.clear(USER_ID_COOKIE), self.clear(SESSION_COOKIE)]
    }
}

/// Append cookies as `Set-Cookie` headers.
pub fn append_set_cookies<'a, I>(headers: &mut HeaderMap, cookies: I)
where
    I: IntoIterator<Item = &'a Cookie<'static>>,
{
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => {
                tracing::warn!(cookie = %cookie.name(), "Cookie value is not a valid header value");
            }
        }
    }
}
