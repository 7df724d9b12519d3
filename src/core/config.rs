//! Configuration management
//!
//! Two layers live here:
//! - [`Config`]: the application config file (`config.toml`), covering the
//!   language, where the data store lives, and how the email relay is reached.
//! - [`PricingConfig`]: the business pricing parameters. These are persisted
//!   in the data store as flat JSON next to the current job, not in the TOML
//!   file, so every field carries a serde default for backfilling.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join("stumpcalc");

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Path of the SQLite store, honoring the `data_dir` override
    pub fn store_path(&self) -> Result<PathBuf> {
        let dir = match &self.general.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?
                .join("stumpcalc"),
        };
        fs::create_dir_all(&dir)?;
        Ok(dir.join("stumpcalc.db"))
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Language: "auto", "en", "fr"
    #[serde(default = "default_language")]
    pub language: String,
    /// Directory holding the data store (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_language() -> String { "auto".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            data_dir: None,
        }
    }
}

/// Email relay settings. Credentials are never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// AWS region hosting the SES endpoint
    #[serde(default = "default_region")]
    pub region: String,
    /// Verified sender address
    #[serde(default)]
    pub from: Option<String>,
    /// Full URL override for the outbound-emails endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Maximum number of photo attachments forwarded, never more than 5
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
}

fn default_region() -> String { "us-east-1".to_string() }
fn default_max_attachments() -> usize { 5 }

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            from: None,
            endpoint: None,
            max_attachments: default_max_attachments(),
        }
    }
}

impl RelayConfig {
    /// Apply `AWS_REGION` and `SES_FROM` overrides from the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup("AWS_REGION").filter(|r| !r.is_empty()) {
            self.region = region;
        }
        if let Some(from) = lookup("SES_FROM").filter(|f| !f.is_empty()) {
            self.from = Some(from);
        }
    }

    /// Endpoint URL for sending raw email
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            None => format!(
                "https://email.{}.amazonaws.com/v2/email/outbound-emails",
                self.region
            ),
        }
    }
}

/// Pricing configuration, persisted as flat camelCase JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    /// Price per inch of stump diameter
    #[serde(default = "default_base_rate")]
    pub base_rate_per_inch: f64,
    /// Floor applied to the job subtotal
    #[serde(default = "default_min_call_out")]
    pub min_call_out_fee: f64,
    /// Tax rate as a fraction (0.13 = 13%)
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default = "default_true")]
    pub tax_enabled: bool,
    /// Currency code (CAD, USD, EUR, GBP, etc.)
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_company_name")]
    pub company_name: String,
    /// Machine width in inches. Shown as the access threshold, never used in pricing.
    #[serde(default = "default_machine_width")]
    pub machine_width: f64,
    /// Price per linear foot of root chasing
    #[serde(default = "default_root_rate")]
    pub root_rate: f64,
    #[serde(default = "default_deep_grind_fee")]
    pub deep_grind_fee: f64,
    /// Labor/handling add-on per haul-away stump
    #[serde(default = "default_haul_handling_fee")]
    pub haul_handling_fee: f64,
    #[serde(default = "default_haul_min_fee")]
    pub haul_min_fee: f64,
    #[serde(default = "default_landfill_rate")]
    pub landfill_rate_per_tonne: f64,
    #[serde(default = "default_chip_density")]
    pub chip_density_lbs_per_cubic_ft: f64,
    #[serde(default = "default_narrow_access_fee")]
    pub narrow_access_fee: f64,
}

fn default_true() -> bool { true }
fn default_base_rate() -> f64 { 9.0 }
fn default_min_call_out() -> f64 { 150.0 }
fn default_tax_rate() -> f64 { 0.13 }
fn default_currency() -> String { "CAD".to_string() }
fn default_company_name() -> String { "Dosko 620-HE Ops".to_string() }
fn default_machine_width() -> f64 { 32.0 } // fits 32"+ gates
fn default_root_rate() -> f64 { 8.0 }
fn default_deep_grind_fee() -> f64 { 40.0 }
fn default_haul_handling_fee() -> f64 { 20.0 }
fn default_haul_min_fee() -> f64 { 15.0 }
fn default_landfill_rate() -> f64 { 75.0 }
fn default_chip_density() -> f64 { 12.0 }
fn default_narrow_access_fee() -> f64 { 25.0 }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_rate_per_inch: default_base_rate(),
            min_call_out_fee: default_min_call_out(),
            tax_rate: default_tax_rate(),
            tax_enabled: true,
            currency: default_currency(),
            company_name: default_company_name(),
            machine_width: default_machine_width(),
            root_rate: default_root_rate(),
            deep_grind_fee: default_deep_grind_fee(),
            haul_handling_fee: default_haul_handling_fee(),
            haul_min_fee: default_haul_min_fee(),
            landfill_rate_per_tonne: default_landfill_rate(),
            chip_density_lbs_per_cubic_ft: default_chip_density(),
            narrow_access_fee: default_narrow_access_fee(),
        }
    }
}

impl PricingConfig {
    /// Return a copy with the fields of a partial JSON object laid over this one
    pub fn merged(&self, partial: &serde_json::Value) -> Result<Self> {
        let patch = partial
            .as_object()
            .ok_or_else(|| Error::InvalidSettings("settings update must be a JSON object".to_string()))?;

        let mut current = serde_json::to_value(self)?;
        if let Some(fields) = current.as_object_mut() {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
        }

        Ok(serde_json::from_value(current)?)
    }

    /// Check the documented ranges. The quote engine itself accepts anything.
    pub fn validate(&self) -> Result<()> {
        let fees = [
            ("baseRatePerInch", self.base_rate_per_inch),
            ("minCallOutFee", self.min_call_out_fee),
            ("machineWidth", self.machine_width),
            ("rootRate", self.root_rate),
            ("deepGrindFee", self.deep_grind_fee),
            ("haulHandlingFee", self.haul_handling_fee),
            ("haulMinFee", self.haul_min_fee),
            ("landfillRatePerTonne", self.landfill_rate_per_tonne),
            ("chipDensityLbsPerCubicFt", self.chip_density_lbs_per_cubic_ft),
            ("narrowAccessFee", self.narrow_access_fee),
        ];

        for (name, value) in fees {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidSettings(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..1.0).contains(&self.tax_rate) {
            return Err(Error::InvalidSettings(format!(
                "taxRate must be in [0, 1), got {}",
                self.tax_rate
            )));
        }

        Ok(())
    }
}
