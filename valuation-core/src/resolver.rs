use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::{
    config::Config,
    estimate::synthesize_estimate,
    model::{AddressQuery, PropertyValuation},
    provider::{ProviderId, ValuationProvider, provider_from_config},
};

/// One slot in the resolver's fixed-priority provider list.
///
/// `enabled` is deployment-time configuration; disabled entries stay in the
/// list (the order is part of the configuration) but are never invoked.
#[derive(Debug)]
pub struct ProviderEntry {
    pub id: ProviderId,
    pub enabled: bool,
    pub provider: Box<dyn ValuationProvider>,
}

/// Tries providers in priority order and falls back to a synthesized
/// estimate, so `resolve` always produces a valuation.
#[derive(Debug)]
pub struct ValuationResolver {
    providers: Vec<ProviderEntry>,
    rng: StdRng,
}

impl ValuationResolver {
    pub fn new(providers: Vec<ProviderEntry>) -> Self {
        Self::with_rng(providers, StdRng::from_entropy())
    }

    /// Explicit RNG, so the synthesized fallback can be pinned in tests.
    pub fn with_rng(providers: Vec<ProviderEntry>, rng: StdRng) -> Self {
        Self { providers, rng }
    }

    /// Build the provider list from config, in configured priority order.
    ///
    /// Providers without credentials are left out; toggling `enabled` is
    /// respected per entry.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut providers = Vec::new();

        for id in config.priority_ids() {
            let Some(settings) = config.provider_settings(id) else {
                debug!(provider = %id, "provider not configured, leaving it out");
                continue;
            };

            providers.push(ProviderEntry {
                id,
                enabled: settings.enabled,
                provider: provider_from_config(id, config)?,
            });
        }

        Ok(Self::new(providers))
    }

    /// Resolve a valuation for `query`. Never fails for a well-formed query
    /// (non-empty street): provider failures are logged and absorbed, and
    /// the synthesized estimate backstops the whole chain.
    ///
    /// First enabled provider to answer wins; no merging across providers.
    pub async fn resolve(&mut self, query: &AddressQuery) -> PropertyValuation {
        for entry in &self.providers {
            if !entry.enabled {
                continue;
            }

            match entry.provider.lookup(query).await {
                Ok(valuation) => {
                    debug!(provider = %entry.id, "provider returned a valuation");
                    return valuation;
                }
                Err(err) => {
                    warn!(provider = %entry.id, error = %err, "provider lookup failed, trying next");
                }
            }
        }

        debug!("no provider produced a valuation, synthesizing estimate");
        synthesize_estimate(query, &mut self.rng)
    }
}
