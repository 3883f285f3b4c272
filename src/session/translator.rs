//! Cookie-to-header session translation for upstream requests.

use axum::http::{header::HeaderName, HeaderMap, HeaderValue};

use crate::session::cookies::SessionCookies;

/// Upstream header carrying the session token.
pub const X_SESSION_ID: HeaderName = HeaderName::from_static("x-session-id");
/// Upstream header carrying the user id.
pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// Attach the session pair to an upstream request as `X-Session-ID` and
/// `X-User-ID`.
///
/// Client-supplied copies of those headers are always removed first, so the
/// cookie pair is the only source of upstream auth context. Returns whether
/// auth headers were attached.
pub fn inject_session_headers(headers: &mut HeaderMap, session: Option<&SessionCookies>) -> bool {
    headers.remove(&X_SESSION_ID);
    headers.remove(&X_USER_ID);

    let Some(session) = session else {
        return false;
    };

    match (
        HeaderValue::from_str(&session.session),
        HeaderValue::from_str(&session.user_id),
    ) {
        (Ok(session_id), Ok(user_id)) => {
            headers.insert(X_SESSION_ID, session_id);
            headers.insert(X_USER_ID, user_id);
            true
        }
        _ => {
            tracing::warn!("Session cookies are not representable as headers; forwarding unauthenticated");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injects_both_headers() {
        let mut headers = HeaderMap::new();
        let pair = SessionCookies {
            session: "tok123".into(),
            user_id: "7".into(),
        };

        assert!(inject_session_headers(&mut headers, Some(&pair)));
        assert_eq!(headers[X_SESSION_ID], "tok123");
        assert_eq!(headers[X_USER_ID], "7");
    }

    #[test]
    fn test_strips_spoofed_headers_when_unauthenticated() {
        let mut headers = HeaderMap::new();
        headers.insert(X_SESSION_ID, HeaderValue::from_static("forged"));
        headers.insert(X_USER_ID, HeaderValue::from_static("1"));

        assert!(!inject_session_headers(&mut headers, None));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_unrepresentable_value_is_unauthenticated() {
        let mut headers = HeaderMap::new();
        let pair = SessionCookies {
            session: "bad\nvalue".into(),
            user_id: "7".into(),
        };

        assert!(!inject_session_headers(&mut headers, Some(&pair)));
        assert!(headers.get(X_USER_ID).is_none());
    }
}
