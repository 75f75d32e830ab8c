//! Sample `Login` service exposing `PutDataBySqh`.
//!
//! Served by the binary when no other service is linked in; also the service
//! used by the integration tests.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::envelope::Fault;
use crate::routing::AliasTable;
use crate::service::{OperationTable, SoapService};

/// Namespace of the sample payloads.
pub const TEMPURI_NS: &str = "http://tempuri.org/";

/// Optional session header.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionHeader {
    #[serde(rename = "token")]
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Login {
    #[serde(rename = "Header")]
    pub header: Option<SessionHeader>,
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Password")]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename = "putDataBySqh", default)]
pub struct PutDataBySqh {
    pub sqh: String,
    pub data: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename = "putDataBySqhResponse")]
pub struct PutDataBySqhResponse {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "putDataBySqhResult")]
    pub result: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename = "whoAmIResponse")]
pub struct WhoAmIResponse {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    pub user: String,
    pub session: String,
}

crate::impl_reply!(PutDataBySqhResponse, WhoAmIResponse);

impl Login {
    /// Stores a record keyed by `sqh`. An empty key is refused.
    pub fn put_data_by_sqh(&mut self, req: PutDataBySqh) -> Result<PutDataBySqhResponse, Fault> {
        if req.sqh.trim().is_empty() {
            return Err(Fault::client("sqh must not be empty"));
        }

        info!(sqh = %req.sqh, user = %req.user, bytes = req.data.len(), "Record received");

        Ok(PutDataBySqhResponse {
            xmlns: TEMPURI_NS.to_string(),
            result: "123".to_string(),
        })
    }

    /// Reports the bound Basic auth user and session header.
    pub fn who_am_i(&mut self) -> WhoAmIResponse {
        WhoAmIResponse {
            xmlns: TEMPURI_NS.to_string(),
            user: self.user.clone(),
            session: self
                .header
                .as_ref()
                .map(|h| h.token.clone())
                .unwrap_or_default(),
        }
    }

    pub fn explode(&mut self) {
        panic!("explode operation invoked");
    }
}

impl SoapService for Login {
    fn operations(table: &mut OperationTable<Self>) {
        table
            .operation("PutDataBySqh", Login::put_data_by_sqh)
            .operation("WhoAmI", Login::who_am_i)
            .operation("Explode", Login::explode);
    }

    fn actions() -> AliasTable {
        AliasTable::from_iter([("putDataBySqh", "PutDataBySqh"), ("whoAmI", "WhoAmI")])
    }
}
