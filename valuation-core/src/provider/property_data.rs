use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::ProviderError,
    model::{AddressQuery, Confidence, MarketValue, PropertyInfo, PropertyValuation, ValueRange},
    provider::REQUEST_TIMEOUT,
};

use super::ValuationProvider;

/// Aggregated property-data lookup.
///
/// Unlike the county-records vendor this one computes its own estimate and
/// value band, and scores the match; the score maps onto our coarse
/// confidence levels. Unknown addresses come back as HTTP 404.
#[derive(Debug, Clone)]
pub struct PropertyDataProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl PropertyDataProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url("https://api.propertydata.dev/v1", api_key)
    }

    /// Custom base URL, for testing against a local mock server.
    pub fn with_base_url(base_url: &str, api_key: String) -> Self {
        Self {
            api_key,
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_valuation(
        &self,
        query: &AddressQuery,
    ) -> Result<PropertyValuation, ProviderError> {
        let url = format!("{}/valuations", self.base_url);

        let mut params: Vec<(&str, &str)> = vec![("address", query.street.as_str())];
        if let Some(city) = query.city.as_deref() {
            params.push(("city", city));
        }
        if let Some(state) = query.state.as_deref() {
            params.push(("state", state));
        }
        if let Some(zip) = query.zip.as_deref() {
            params.push(("zipcode", zip));
        }

        let res = self
            .http
            .get(url)
            .header("X-Api-Key", self.api_key.as_str())
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = res.status();

        // This vendor reports an unknown address as a plain 404.
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NoRecords);
        }

        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: PdResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Malformed(format!("invalid property-data JSON: {e}")))?;

        if parsed.record_count == 0 || parsed.properties.is_empty() {
            return Err(ProviderError::NoRecords);
        }

        normalize_property(&parsed.properties[0])
    }
}

fn normalize_property(property: &PdProperty) -> Result<PropertyValuation, ProviderError> {
    let valuation = property.valuation.as_ref().ok_or_else(|| {
        ProviderError::Malformed("property record missing valuation block".to_string())
    })?;

    let estimate = valuation.estimate.filter(|est| *est > 0).ok_or_else(|| {
        ProviderError::Malformed("valuation block missing a usable estimate".to_string())
    })?;

    // The vendor's band is advisory; clamp it so it always brackets the estimate.
    let value_range = ValueRange {
        low: valuation.range_low.unwrap_or(estimate).min(estimate),
        high: valuation.range_high.unwrap_or(estimate).max(estimate),
    };

    let confidence = match valuation.confidence_score {
        Some(score) if score >= 80 => Confidence::High,
        Some(score) if score >= 50 => Confidence::Medium,
        Some(_) => Confidence::Low,
        None => Confidence::Medium,
    };

    let market_value = property.assessments.as_ref().and_then(|a| {
        a.total_value.map(|total| MarketValue {
            land: a.land_value.unwrap_or(0),
            building: a.improvement_value.unwrap_or(0),
            total,
        })
    });

    let property_info = Some(PropertyInfo {
        county: property.address.as_ref().and_then(|a| a.county.clone()),
        city: property.address.as_ref().and_then(|a| a.city.clone()),
        state: property.address.as_ref().and_then(|a| a.state.clone()),
        zip: property.address.as_ref().and_then(|a| a.zip_code.clone()),
        acreage: property.lot_size_acres,
        year_built: property.year_built,
    });

    Ok(PropertyValuation {
        provider: "propertydata".to_string(),
        estimated_value: estimate,
        value_range,
        confidence,
        market_value,
        property_info,
    })
}

#[derive(Debug, Deserialize)]
struct PdValuation {
    estimate: Option<u64>,
    range_low: Option<u64>,
    range_high: Option<u64>,
    confidence_score: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct PdAssessments {
    land_value: Option<u64>,
    improvement_value: Option<u64>,
    total_value: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PdAddress {
    county: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PdProperty {
    valuation: Option<PdValuation>,
    assessments: Option<PdAssessments>,
    address: Option<PdAddress>,
    lot_size_acres: Option<f64>,
    year_built: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct PdResponse {
    record_count: u32,
    #[serde(default)]
    properties: Vec<PdProperty>,
}

#[async_trait]
impl ValuationProvider for PropertyDataProvider {
    async fn lookup(&self, query: &AddressQuery) -> Result<PropertyValuation, ProviderError> {
        self.fetch_valuation(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
