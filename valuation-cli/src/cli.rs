use anyhow::Context;
use clap::{Parser, Subcommand};

use valuation_core::{
    AddressQuery, Config, PropertyValuation, ProviderId, ValuationResolver,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "valuation", version, about = "Assemble property valuation CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "countyrecords" or "propertydata".
        provider: String,
    },

    /// Look up a valuation for an address.
    Lookup {
        /// Street address, e.g. "2204 Oak Crest Ave".
        street: String,

        #[arg(long)]
        city: Option<String>,

        /// Two-letter state code, e.g. "TX".
        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        zip: Option<String>,

        /// Print the raw valuation as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// List known providers and their configuration status.
    Providers,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Lookup { street, city, state, zip, json } => {
                lookup(street, city, state, zip, json).await
            }
            Command::Providers => list_providers(),
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty.");
    }

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!("Saved API key for provider '{id}'.");
    Ok(())
}

async fn lookup(
    street: String,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    if street.trim().is_empty() {
        anyhow::bail!("Street must not be empty.");
    }

    let config = Config::load()?;
    let mut resolver = ValuationResolver::from_config(&config)?;

    let query = AddressQuery { street, city, state, zip };
    let valuation = resolver.resolve(&query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&valuation)?);
    } else {
        print_valuation(&valuation);
    }

    Ok(())
}

fn list_providers() -> anyhow::Result<()> {
    let config = Config::load()?;

    for id in config.priority_ids() {
        let status = match config.provider_settings(id) {
            Some(settings) if settings.enabled => "configured, enabled",
            Some(_) => "configured, disabled",
            None => "not configured",
        };
        println!("{:<14} {status}", id.as_str());
    }

    Ok(())
}

fn print_valuation(valuation: &PropertyValuation) {
    println!(
        "Estimated value: {} ({} confidence, via {})",
        fmt_usd(valuation.estimated_value),
        valuation.confidence,
        valuation.provider,
    );
    println!(
        "Value range:     {} - {}",
        fmt_usd(valuation.value_range.low),
        fmt_usd(valuation.value_range.high),
    );

    if let Some(mv) = &valuation.market_value {
        println!(
            "Market value:    land {} + building {} (total {})",
            fmt_usd(mv.land),
            fmt_usd(mv.building),
            fmt_usd(mv.total),
        );
    }

    if let Some(info) = &valuation.property_info {
        let mut location = Vec::new();
        if let Some(city) = &info.city {
            location.push(city.clone());
        }
        if let Some(state) = &info.state {
            location.push(state.clone());
        }
        if let Some(zip) = &info.zip {
            location.push(zip.clone());
        }
        if !location.is_empty() {
            println!("Location:        {}", location.join(", "));
        }
        if let Some(county) = &info.county {
            println!("County:          {county}");
        }
        if let Some(acreage) = info.acreage {
            println!("Lot:             {acreage} acres");
        }
        if let Some(year) = info.year_built {
            println!("Year built:      {year}");
        }
    }
}

fn fmt_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::new();

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    format!("${out}")
}
