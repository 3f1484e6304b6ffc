use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ProviderError,
    model::{AddressQuery, Confidence, MarketValue, PropertyInfo, PropertyValuation, ValueRange},
    provider::REQUEST_TIMEOUT,
};

use super::ValuationProvider;

/// County-records parcel lookup.
///
/// Returns assessed market values straight from county assessor rolls, so a
/// record with a total market value maps to `High` confidence; records that
/// only carry a last-sale price are normalized at `Medium`.
#[derive(Debug, Clone)]
pub struct CountyRecordsProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl CountyRecordsProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url("https://api.countyrecords.io/v2", api_key)
    }

    /// Custom base URL, for testing against a local mock server.
    pub fn with_base_url(base_url: &str, api_key: String) -> Self {
        Self {
            api_key,
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_parcel(&self, query: &AddressQuery) -> Result<PropertyValuation, ProviderError> {
        let url = format!("{}/parcels", self.base_url);

        let mut params: Vec<(&str, &str)> = vec![
            ("street", query.street.as_str()),
            ("apikey", self.api_key.as_str()),
        ];
        if let Some(city) = query.city.as_deref() {
            params.push(("city", city));
        }
        if let Some(state) = query.state.as_deref() {
            params.push(("state", state));
        }
        if let Some(zip) = query.zip.as_deref() {
            params.push(("zip", zip));
        }

        let res = self
            .http
            .get(url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: CrResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Malformed(format!("invalid county-records JSON: {e}")))?;

        if parsed.status.as_deref() == Some("no_match") || parsed.results.is_empty() {
            return Err(ProviderError::NoRecords);
        }

        normalize_record(&parsed.results[0])
    }
}

fn normalize_record(record: &CrRecord) -> Result<PropertyValuation, ProviderError> {
    let property_info = Some(PropertyInfo {
        county: record.situs.as_ref().and_then(|s| s.county_name.clone()),
        city: record.situs.as_ref().and_then(|s| s.city.clone()),
        state: record.situs.as_ref().and_then(|s| s.state.clone()),
        zip: record.situs.as_ref().and_then(|s| s.zip_code.clone()),
        acreage: record.lot.as_ref().and_then(|l| l.acreage),
        year_built: record.building.as_ref().and_then(|b| b.year_built),
    });

    if let Some(mv) = record.market_value.as_ref()
        && let Some(total) = mv.mkt_ttl_value.filter(|total| *total > 0)
    {
        return Ok(PropertyValuation {
            provider: "countyrecords".to_string(),
            estimated_value: total,
            value_range: assessment_band(total, 0.10),
            confidence: Confidence::High,
            market_value: Some(MarketValue {
                land: mv.mkt_land_value.unwrap_or(0),
                building: mv.mkt_impr_value.unwrap_or(0),
                total,
            }),
            property_info,
        });
    }

    // No assessed value on the roll; fall back to the recorded sale price.
    let sale_price = record
        .last_sale
        .as_ref()
        .and_then(|s| s.sale_price)
        .filter(|price| *price > 0);

    match sale_price {
        Some(price) => Ok(PropertyValuation {
            provider: "countyrecords".to_string(),
            estimated_value: price,
            value_range: assessment_band(price, 0.15),
            confidence: Confidence::Medium,
            market_value: None,
            property_info,
        }),
        None => Err(ProviderError::Malformed(
            "parcel record has neither market value nor sale price".to_string(),
        )),
    }
}

fn assessment_band(value: u64, spread: f64) -> ValueRange {
    ValueRange {
        low: (value as f64 * (1.0 - spread)).floor() as u64,
        high: (value as f64 * (1.0 + spread)).floor() as u64,
    }
}

#[derive(Debug, Deserialize)]
struct CrMarketValue {
    #[serde(rename = "mktLandValue")]
    mkt_land_value: Option<u64>,
    #[serde(rename = "mktImprValue")]
    mkt_impr_value: Option<u64>,
    #[serde(rename = "mktTtlValue")]
    mkt_ttl_value: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CrLastSale {
    #[serde(rename = "salePrice")]
    sale_price: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CrSitus {
    #[serde(rename = "countyName")]
    county_name: Option<String>,
    city: Option<String>,
    state: Option<String>,
    #[serde(rename = "zipCode")]
    zip_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrLot {
    acreage: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CrBuilding {
    #[serde(rename = "yearBuilt")]
    year_built: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct CrRecord {
    #[serde(rename = "marketValue")]
    market_value: Option<CrMarketValue>,
    #[serde(rename = "lastSale")]
    last_sale: Option<CrLastSale>,
    situs: Option<CrSitus>,
    lot: Option<CrLot>,
    building: Option<CrBuilding>,
}

#[derive(Debug, Deserialize)]
struct CrResponse {
    status: Option<String>,
    #[serde(default)]
    results: Vec<CrRecord>,
}

#[async_trait]
impl ValuationProvider for CountyRecordsProvider {
    async fn lookup(&self, query: &AddressQuery) -> Result<PropertyValuation, ProviderError> {
        self.fetch_parcel(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
