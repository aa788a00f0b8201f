use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/vaxmap";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub update: UpdateSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    #[serde(default = "default_translation_path")]
    pub translation_path: PathBuf,
    #[serde(default = "default_canonical_codes_path")]
    pub canonical_codes_path: PathBuf,
    /// Area whose last record marks the newest selectable date.
    #[serde(default = "default_reference_area")]
    pub reference_area: String,
    #[serde(default = "default_earliest_date")]
    pub earliest_date: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateSettings {
    #[serde(default = "default_update_url")]
    pub url: String,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("owid-covid-data.json")
}

fn default_translation_path() -> PathBuf {
    PathBuf::from("owid_to_pygal.json")
}

fn default_canonical_codes_path() -> PathBuf {
    PathBuf::from("pygal-countries.csv")
}

fn default_reference_area() -> String {
    "USA".to_string()
}

fn default_earliest_date() -> String {
    "2020-12-08".to_string()
}

fn default_update_url() -> String {
    "https://covid.ourworldindata.org/data/owid-covid-data.json".to_string()
}

fn default_max_age_hours() -> u64 {
    24
}

fn default_output_path() -> PathBuf {
    PathBuf::from("vaxmap.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            translation_path: default_translation_path(),
            canonical_codes_path: default_canonical_codes_path(),
            reference_area: default_reference_area(),
            earliest_date: default_earliest_date(),
        }
    }
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            url: default_update_url(),
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DataSettings {
    pub fn earliest_date(&self) -> anyhow::Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.earliest_date, "%Y-%m-%d")
            .with_context(|| format!("Invalid earliest_date '{}'", self.earliest_date))
    }
}

/// Loads settings from `path` (any format the config crate knows, extension
/// optional) overlaid with `VAXMAP__SECTION__KEY` environment variables.
/// A missing file is fine, every setting has a default.
pub fn load_app_config(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("VAXMAP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path))?;

    Ok(settings.try_deserialize()?)
}
