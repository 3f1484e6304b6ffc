use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};
use tracing::warn;

use crate::provider::ProviderId;

/// Configuration for a single provider: credentials plus a deployment-time
/// enable toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional explicit provider priority, highest first. Known providers
    /// missing from the list follow it in declaration order.
    pub priority: Option<Vec<String>>,

    /// Example TOML:
    /// [providers.countyrecords]
    /// api_key = "..."
    /// enabled = true
    pub providers: HashMap<String, ProviderSettings>,
}

impl Config {
    /// Provider iteration order for the resolver, highest priority first.
    ///
    /// Unknown names in the configured priority list are ignored with a
    /// warning; every known provider always appears exactly once.
    pub fn priority_ids(&self) -> Vec<ProviderId> {
        let mut ids = Vec::new();

        if let Some(priority) = &self.priority {
            for name in priority {
                match ProviderId::try_from(name.as_str()) {
                    Ok(id) => {
                        if !ids.contains(&id) {
                            ids.push(id);
                        }
                    }
                    Err(_) => {
                        warn!(provider = %name, "ignoring unknown provider in priority list");
                    }
                }
            }
        }

        for id in ProviderId::all() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }

        ids
    }

    pub fn provider_settings(&self, id: ProviderId) -> Option<&ProviderSettings> {
        self.providers.get(id.as_str())
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    /// Set/replace a provider API key. A freshly configured provider starts
    /// enabled; an existing enable toggle is left as the operator set it.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        let enabled =
            self.providers.get(provider_id.as_str()).is_none_or(|settings| settings.enabled);

        self.providers
            .insert(provider_id.as_str().to_string(), ProviderSettings { api_key, enabled });
    }

    pub fn set_enabled(&mut self, provider_id: ProviderId, enabled: bool) {
        if let Some(settings) = self.providers.get_mut(provider_id.as_str()) {
            settings.enabled = enabled;
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "assemble", "valuation-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn upsert_sets_key_and_enables_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::CountyRecords, "CR_KEY".into());

        let key = cfg.provider_api_key(ProviderId::CountyRecords);
        assert_eq!(key, Some("CR_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::CountyRecords));
        assert!(cfg.provider_settings(ProviderId::CountyRecords).unwrap().enabled);
    }

    #[test]
    fn upsert_preserves_operator_disable() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::CountyRecords, "OLD_KEY".into());
        cfg.set_enabled(ProviderId::CountyRecords, false);
        cfg.upsert_provider_api_key(ProviderId::CountyRecords, "NEW_KEY".into());

        let settings = cfg.provider_settings(ProviderId::CountyRecords).unwrap();
        assert_eq!(settings.api_key, "NEW_KEY");
        assert!(!settings.enabled);
    }

    #[test]
    fn priority_defaults_to_declaration_order() {
        let cfg = Config::default();

        assert_eq!(cfg.priority_ids(), ProviderId::all().to_vec());
    }

    #[test]
    fn explicit_priority_reorders_providers() {
        let cfg = Config {
            priority: Some(vec!["propertydata".to_string()]),
            ..Config::default()
        };

        assert_eq!(
            cfg.priority_ids(),
            vec![ProviderId::PropertyData, ProviderId::CountyRecords]
        );
    }

    #[test]
    fn unknown_priority_entries_are_ignored() {
        let cfg = Config {
            priority: Some(vec!["zestimator".to_string(), "propertydata".to_string()]),
            ..Config::default()
        };

        assert_eq!(
            cfg.priority_ids(),
            vec![ProviderId::PropertyData, ProviderId::CountyRecords]
        );
    }

    #[test]
    fn enabled_defaults_to_true_when_omitted_in_toml() {
        let cfg: Config = toml::from_str(
            r#"
            [providers.countyrecords]
            api_key = "CR_KEY"

            [providers.propertydata]
            api_key = "PD_KEY"
            enabled = false
            "#,
        )
        .expect("config parses");

        assert!(cfg.provider_settings(ProviderId::CountyRecords).unwrap().enabled);
        assert!(!cfg.provider_settings(ProviderId::PropertyData).unwrap().enabled);
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let mut cfg = Config {
            priority: Some(vec!["propertydata".to_string(), "countyrecords".to_string()]),
            ..Config::default()
        };
        cfg.upsert_provider_api_key(ProviderId::CountyRecords, "CR_KEY".into());
        cfg.set_enabled(ProviderId::CountyRecords, false);

        let serialized = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&serialized).expect("parses back");

        assert_eq!(parsed.priority, cfg.priority);
        let settings = parsed.provider_settings(ProviderId::CountyRecords).unwrap();
        assert_eq!(settings.api_key, "CR_KEY");
        assert!(!settings.enabled);
    }
}
