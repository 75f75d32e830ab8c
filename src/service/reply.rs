//! Conversion of operation results into response bodies.
//!
//! Response types opt in with [`impl_reply!`](crate::impl_reply):
//!
//! ```ignore
//! #[derive(Serialize)]
//! #[serde(rename = "putDataBySqhResponse")]
//! struct PutDataBySqhResponse { /* ... */ }
//!
//! soap_service::impl_reply!(PutDataBySqhResponse);
//! ```
//!
//! `()`, `Option<R>` and `Result<R, Fault>` are replies whenever `R` is.

use serde::Serialize;

use crate::envelope::{Body, Fault};

/// Something an operation can return.
pub trait Reply {
    type Content: Serialize;

    fn into_body(self) -> Body<Self::Content>;
}

/// Implements [`Reply`] for serializable types, each becoming the Body
/// content as-is.
#[macro_export]
macro_rules! impl_reply {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::service::Reply for $ty {
                type Content = $ty;

                fn into_body(self) -> $crate::envelope::Body<$ty> {
                    $crate::envelope::Body::Content(self)
                }
            }
        )+
    };
}

impl_reply!(String, bool, i32, i64, u32, u64, f64);

impl Reply for () {
    type Content = ();

    fn into_body(self) -> Body<()> {
        Body::Empty
    }
}

impl<R: Reply> Reply for Option<R> {
    type Content = R::Content;

    fn into_body(self) -> Body<R::Content> {
        match self {
            Some(reply) => reply.into_body(),
            None => Body::Empty,
        }
    }
}

impl<R: Reply> Reply for Result<R, Fault> {
    type Content = R::Content;

    fn into_body(self) -> Body<R::Content> {
        match self {
            Ok(reply) => reply.into_body(),
            Err(fault) => Body::Fault(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize)]
    struct Pong {
        seq: u32,
    }

    impl_reply!(Pong);

    #[test]
    fn test_value_becomes_content() {
        assert_eq!(Pong { seq: 1 }.into_body(), Body::Content(Pong { seq: 1 }));
        assert_eq!("ok".to_string().into_body(), Body::Content("ok".to_string()));
    }

    #[test]
    fn test_unit_and_none_leave_body_empty() {
        assert_eq!(().into_body(), Body::<()>::Empty);
        assert_eq!(None::<Pong>.into_body(), Body::Empty);
        assert_eq!(Some(Pong { seq: 3 }).into_body(), Body::Content(Pong { seq: 3 }));
    }

    #[test]
    fn test_result_reply() {
        let ok: Result<Pong, Fault> = Ok(Pong { seq: 2 });
        assert_eq!(ok.into_body(), Body::Content(Pong { seq: 2 }));

        let err: Result<Pong, Fault> = Err(Fault::client("no such record"));
        let body = err.into_body();
        assert_eq!(body.fault().map(Fault::message), Some("no such record"));
    }
}
