//! Response conversion.
//!
//! # Responsibilities
//! - Turn a `SoapResponse` into an HTTP response
//! - Set `Content-Type` and `Content-Length` for envelope bodies
//!
//! # Design Decisions
//! - A dropped request has no body and no content type

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

use crate::dispatch::{SoapResponse, SOAP_CONTENT_TYPE};

impl IntoResponse for SoapResponse {
    fn into_response(self) -> Response {
        if self.body.is_empty() {
            return self.status.into_response();
        }

        let length = HeaderValue::from(self.body.len());
        (
            self.status,
            [
                (CONTENT_TYPE, HeaderValue::from_static(SOAP_CONTENT_TYPE)),
                (CONTENT_LENGTH, length),
            ],
            self.body,
        )
            .into_response()
    }
}
