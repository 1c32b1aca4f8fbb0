use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::models::{CourierService, DateRange, InventoryReport, Product};
use super::InventoryApi;
use crate::config::ApiConfig;
use crate::core::error::{DashboardError, Result};

/// reqwest-backed client for the inventory backend.
///
/// Every request carries credentials: responses' cookies are kept in the
/// client's cookie store, and a configured session cookie is sent up front.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = parse_base(&config.backend_url)?;

        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.session_cookie.as_deref() {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(_) => log::warn!("Ignoring session cookie with invalid header characters"),
            }
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| DashboardError::InvalidUrl {
                url: format!("{}{path}", self.base),
                reason: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
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
impl InventoryApi for BackendClient {
    #[instrument(skip(self), fields(range = %range))]
    async fn inventory_report(&self, range: DateRange) -> Result<InventoryReport> {
        let mut url = self.endpoint("api/inventory-reports")?;
        url.query_pairs_mut().extend_pairs(range.query_pairs());
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>> {
        let url = self.endpoint("api/stocks")?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn courier_services(&self) -> Result<Vec<CourierService>> {
        let url = self.endpoint("api/couriers-services")?;
        self.get_json(url).await
    }
}

/// Parse a base URL and make sure relative joins append to its path.
pub(crate) fn parse_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| DashboardError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(DashboardError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
