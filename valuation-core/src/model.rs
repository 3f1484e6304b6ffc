use serde::{Deserialize, Serialize};

/// A postal address to look up.
///
/// `street` is required and must be non-empty; the other fields are optional
/// and passed through to providers unmodified. Missing fields narrow what a
/// provider can match on but never cause a hard failure.
#[derive(Debug, Clone)]
pub struct AddressQuery {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl AddressQuery {
    pub fn new(street: impl Into<String>) -> Self {
        Self { street: street.into(), city: None, state: None, zip: None }
    }
}

/// How directly a valuation derives from authoritative data.
///
/// A synthesized estimate is never reported as `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band around the estimated value. Invariant: `low <= estimated_value <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub low: u64,
    pub high: u64,
}

/// Assessed-value breakdown. `land + building` need not equal `total`;
/// source data tolerates the mismatch and so do we.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketValue {
    pub land: u64,
    pub building: u64,
    pub total: u64,
}

/// Descriptive parcel metadata. Purely informational; no invariant is
/// enforced across fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub county: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub acreage: Option<f64>,
    pub year_built: Option<u16>,
}

/// Provider-agnostic valuation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValuation {
    /// Which source produced this valuation, e.g. "countyrecords" or
    /// "estimate" for the synthesized fallback.
    pub provider: String,
    pub estimated_value: u64,
    pub value_range: ValueRange,
    pub confidence: Confidence,
    pub market_value: Option<MarketValue>,
    pub property_info: Option<PropertyInfo>,
}
