//! Request inspection.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Read the SOAPAction header
//! - Decode HTTP Basic credentials
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Malformed credentials are treated as absent, not as an error

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue, Request};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::service::Credentials;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header naming the requested operation.
pub const SOAP_ACTION: &str = "soapaction";

/// Makes a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The raw SOAPAction header value, if present and valid text.
pub fn soap_action(headers: &HeaderMap) -> Option<&str> {
    headers.get(SOAP_ACTION).and_then(|v| v.to_str().ok())
}

/// The request ID set by the request-id middleware.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// HTTP Basic credentials from the `Authorization` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;

    Some(Credentials::new(user, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_basic_credentials() {
        // alice:s3cret
        let creds = basic_credentials(&with_auth("Basic YWxpY2U6czNjcmV0")).unwrap();
        assert_eq!(creds, Credentials::new("alice", "s3cret"));

        // bob:a:b keeps everything after the first colon
        let creds = basic_credentials(&with_auth("basic Ym9iOmE6Yg==")).unwrap();
        assert_eq!(creds, Credentials::new("bob", "a:b"));
    }

    #[test]
    fn test_invalid_credentials_ignored() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
        assert!(basic_credentials(&with_auth("Bearer abc")).is_none());
        assert!(basic_credentials(&with_auth("Basic !!!")).is_none());
        // "nocolon"
        assert!(basic_credentials(&with_auth("Basic bm9jb2xvbg==")).is_none());
    }

    #[test]
    fn test_soap_action_case_insensitive() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(b"SOAPAction").unwrap();
        headers.insert(name, HeaderValue::from_static("\"Ping\""));
        assert_eq!(soap_action(&headers), Some("\"Ping\""));
        assert_eq!(soap_action(&HeaderMap::new()), None);
    }

    #[test]
    fn test_request_uuid() {
        let request = Request::new(());
        let id = RequestUuid.make_request_id(&request).unwrap();
        let id = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
