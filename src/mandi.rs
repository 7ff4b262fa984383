use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::PriceQueryResult;

const RECORD_LIMIT: u32 = 10;

/// Commodity price lookups against the data.gov.in mandi resource.
pub struct PriceLookupService {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl PriceLookupService {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.mandi_api_key.clone(),
            endpoint: config.mandi_api_url.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn lookup_prices(&self, crop_name: &str) -> Result<PriceQueryResult> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("DATA_GOV_IN_API_KEY not configured".to_string()))?;

        if crop_name.trim().is_empty() {
            return Err(Error::InvalidInput("crop name must not be empty".to_string()));
        }

        info!("Fetching mandi prices for {}", crop_name);

        let limit = RECORD_LIMIT.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api-key", api_key),
                ("format", "json"),
                ("filters[commodity]", crop_name),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::UpstreamTransport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::UpstreamTransport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Mandi price API returned {}", status);
            return Err(Error::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| Error::UpstreamTransport(format!("invalid JSON in response: {}", e)))?;

        let result = PriceQueryResult::from_payload(crop_name, payload);
        match &result {
            PriceQueryResult::Found(_) => {
                info!("Found {} mandi price records for {}", result.records().len(), crop_name)
            }
            PriceQueryResult::NoData { .. } => warn!("No mandi price data found for {}", crop_name),
        }

        Ok(result)
    }
}
