//! PIN-code lookup against the India Post directory (`api.postalpincode.in`).
//!
//! `GET {base}/pincode/{code}` answers with an array whose first element
//! carries `Status` and `PostOffice`. A code is valid only when `Status` is
//! exactly `"Success"` and `PostOffice` is non-null. Lookup failures of any
//! kind count as invalid.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::config::ApiConfig;
use crate::core::api::client::parse_base;
use crate::core::error::{DashboardError, Result};

const SUCCESS_STATUS: &str = "Success";

/// Validates a postal code before an order may proceed to review.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PinCodeValidator: Send + Sync {
    /// Returns `false` for unknown codes and for lookup failures.
    async fn is_valid(&self, pin_code: &str) -> bool;
}

/// One element of the lookup response.
#[derive(Debug, Deserialize)]
pub struct PostalLookupEntry {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "PostOffice", default)]
    pub post_office: Option<serde_json::Value>,
}

impl PostalLookupEntry {
    fn is_match(&self) -> bool {
        self.status == SUCCESS_STATUS && self.post_office.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Decide validity from a decoded lookup response.
pub fn response_is_valid(entries: &[PostalLookupEntry]) -> bool {
    entries.first().is_some_and(PostalLookupEntry::is_match)
}

#[derive(Clone)]
pub struct PostalPincodeClient {
    http: reqwest::Client,
    base: Url,
}

impl PostalPincodeClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = parse_base(&config.postal_lookup_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, base })
    }

    /// Fetch and decode the lookup response for `pin_code`.
    #[instrument(skip(self))]
    pub async fn lookup(&self, pin_code: &str) -> Result<Vec<PostalLookupEntry>> {
        let path = format!("pincode/{}", urlencoding::encode(pin_code.trim()));
        let url = self.base.join(&path).map_err(|e| DashboardError::InvalidUrl {
            url: format!("{}{path}", self.base),
            reason: e.to_string(),
        })?;

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| DashboardError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PinCodeValidator for PostalPincodeClient {
    async fn is_valid(&self, pin_code: &str) -> bool {
        match self.lookup(pin_code).await {
            Ok(entries) => response_is_valid(&entries),
            Err(e) => {
                tracing::error!(error = %e, "Error validating PIN code");
                false
            }
        }
    }
}
