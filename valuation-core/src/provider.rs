use crate::{
    AddressQuery, Config, PropertyValuation, ProviderError,
    provider::{county_records::CountyRecordsProvider, property_data::PropertyDataProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod county_records;
pub mod property_data;

/// Request timeout applied to every provider call, so one unresponsive
/// vendor cannot stall the whole resolution.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    CountyRecords,
    PropertyData,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::CountyRecords => "countyrecords",
            ProviderId::PropertyData => "propertydata",
        }
    }

    /// All known providers, in default priority order.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::CountyRecords, ProviderId::PropertyData]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "countyrecords" => Ok(ProviderId::CountyRecords),
            "propertydata" => Ok(ProviderId::PropertyData),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: countyrecords, propertydata."
            )),
        }
    }
}

/// A single valuation data source.
///
/// Each implementation owns the translation of its vendor's wire shape into
/// a [`PropertyValuation`]; the resolver performs no provider-specific
/// parsing. A lookup that cannot be normalized fails with [`ProviderError`].
#[async_trait]
pub trait ValuationProvider: Send + Sync + Debug {
    async fn lookup(&self, query: &AddressQuery) -> Result<PropertyValuation, ProviderError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn ValuationProvider>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `valuation configure {id}` and enter your API key."
        )
    })?;

    let boxed: Box<dyn ValuationProvider> = match id {
        ProviderId::CountyRecords => Box::new(CountyRecordsProvider::new(api_key.to_owned())),
        ProviderId::PropertyData => Box::new(PropertyDataProvider::new(api_key.to_owned())),
    };

    Ok(boxed)
}
