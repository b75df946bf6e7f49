use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::regions::{default_regions, BoundingBox, Region};

pub const DEFAULT_API_BASE: &str = "https://opensky-network.org/api";
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "skywatch-tui.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub update_interval: Duration,
    pub request_timeout: Duration,
    pub opensky_username: String,
    pub opensky_password: String,
    pub notam_api_key: String,
    pub log_enabled: bool,
    pub log_level: String,
    pub log_file: String,
    pub config_path: PathBuf,
    pub regions: Vec<Region>,
}

impl Config {
    /// Static OpenSky credentials, only if both halves are configured.
    /// Anonymous access is a fully supported configuration.
    pub fn credentials(&self) -> Option<(String, String)> {
        let username = self.opensky_username.trim();
        let password = self.opensky_password.trim();
        if username.is_empty() || password.is_empty() {
            None
        } else {
            Some((username.to_string(), password.to_string()))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base: Option<String>,
    update_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    opensky_username: Option<String>,
    opensky_password: Option<String>,
    notam_api_key: Option<String>,
    log_enabled: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
    regions: Option<Vec<RegionConfig>>,
}

#[derive(Debug, Deserialize)]
struct RegionConfig {
    key: String,
    name: String,
    icao: String,
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

pub fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut explicit_config: Option<PathBuf> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("--config needs a value"))?;
            explicit_config = Some(PathBuf::from(value));
        }
    }

    let env_config = env::var("SKYWATCH_CONFIG").ok().map(PathBuf::from);
    let config_path = explicit_config
        .clone()
        .or(env_config)
        .unwrap_or_else(|| PathBuf::from("skywatch-tui.toml"));

    let mut config = Config {
        api_base: DEFAULT_API_BASE.to_string(),
        update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
        request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        opensky_username: String::new(),
        opensky_password: String::new(),
        notam_api_key: String::new(),
        log_enabled: false,
        log_level: "info".to_string(),
        log_file: DEFAULT_LOG_FILE.to_string(),
        config_path: config_path.clone(),
        regions: default_regions(),
    };

    if config_path.exists() {
        if let Some(file_config) = load_file_config(&config_path)? {
            apply_file_config(&mut config, file_config)?;
        }
    } else if explicit_config.is_some() {
        return Err(anyhow!("Config file not found: {}", config_path.display()));
    }

    if let Ok(value) = env::var("SKYWATCH_API_BASE") {
        config.api_base = value;
    }
    if let Ok(value) = env::var("SKYWATCH_INTERVAL") {
        if let Ok(secs) = value.parse::<u64>() {
            config.update_interval = Duration::from_secs(secs.max(MIN_UPDATE_INTERVAL_SECS));
        }
    }
    if let Ok(value) = env::var("SKYWATCH_TIMEOUT") {
        if let Ok(secs) = value.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
    }
    if let Ok(value) = env::var("SKYWATCH_USERNAME") {
        config.opensky_username = value;
    }
    if let Ok(value) = env::var("SKYWATCH_PASSWORD") {
        config.opensky_password = value;
    }
    if let Ok(value) = env::var("SKYWATCH_NOTAM_KEY") {
        config.notam_api_key = value;
    }
    if let Ok(value) = env::var("SKYWATCH_LOG_ENABLED") {
        config.log_enabled = matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    if let Ok(value) = env::var("SKYWATCH_LOG_LEVEL") {
        config.log_level = value;
    }
    if let Ok(value) = env::var("SKYWATCH_LOG_FILE") {
        config.log_file = value;
    }

    validate_regions(&config.regions)?;
    Ok(config)
}

fn load_file_config(path: &Path) -> Result<Option<FileConfig>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let file_config: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(Some(file_config))
}

fn apply_file_config(config: &mut Config, file_config: FileConfig) -> Result<()> {
    if let Some(value) = file_config.api_base {
        config.api_base = value;
    }
    if let Some(secs) = file_config.update_interval_secs {
        config.update_interval = Duration::from_secs(secs.max(MIN_UPDATE_INTERVAL_SECS));
    }
    if let Some(secs) = file_config.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs.max(1));
    }
    if let Some(value) = file_config.opensky_username {
        config.opensky_username = value;
    }
    if let Some(value) = file_config.opensky_password {
        config.opensky_password = value;
    }
    if let Some(value) = file_config.notam_api_key {
        config.notam_api_key = value;
    }
    if let Some(value) = file_config.log_enabled {
        config.log_enabled = value;
    }
    if let Some(value) = file_config.log_level {
        config.log_level = value;
    }
    if let Some(value) = file_config.log_file {
        config.log_file = value;
    }
    if let Some(entries) = file_config.regions {
        config.regions = entries
            .into_iter()
            .map(|entry| Region {
                key: entry.key,
                name: entry.name,
                icao: entry.icao,
                bounds: BoundingBox {
                    min_lat: entry.min_lat,
                    max_lat: entry.max_lat,
                    min_lon: entry.min_lon,
                    max_lon: entry.max_lon,
                },
            })
            .collect();
    }
    Ok(())
}

fn validate_regions(regions: &[Region]) -> Result<()> {
    if regions.is_empty() {
        return Err(anyhow!("at least one region must be configured"));
    }
    for (i, region) in regions.iter().enumerate() {
        if region.key.trim().is_empty() {
            return Err(anyhow!("region {} has an empty key", i));
        }
        if regions[..i].iter().any(|other| other.key == region.key) {
            return Err(anyhow!("duplicate region key: {}", region.key));
        }
        let bounds = &region.bounds;
        if bounds.min_lat >= bounds.max_lat || bounds.min_lon >= bounds.max_lon {
            return Err(anyhow!("region {} has an empty bounding box", region.key));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_file_config, validate_regions, Config, FileConfig};
    use crate::regions::default_regions;
    use std::path::PathBuf;
    use std::time::Duration;

    fn base_config() -> Config {
        Config {
            api_base: super::DEFAULT_API_BASE.to_string(),
            update_interval: Duration::from_secs(super::DEFAULT_UPDATE_INTERVAL_SECS),
            request_timeout: Duration::from_secs(super::DEFAULT_REQUEST_TIMEOUT_SECS),
            opensky_username: String::new(),
            opensky_password: String::new(),
            notam_api_key: String::new(),
            log_enabled: false,
            log_level: "info".to_string(),
            log_file: super::DEFAULT_LOG_FILE.to_string(),
            config_path: PathBuf::from("skywatch-tui.toml"),
            regions: default_regions(),
        }
    }

    #[test]
    fn credentials_require_both_halves() {
        let mut config = base_config();
        assert_eq!(config.credentials(), None);

        config.opensky_username = "user".to_string();
        assert_eq!(config.credentials(), None);

        config.opensky_password = "secret".to_string();
        assert_eq!(
            config.credentials(),
            Some(("user".to_string(), "secret".to_string()))
        );

        config.opensky_username = "   ".to_string();
        assert_eq!(config.credentials(), None);
    }

    #[test]
    fn file_config_overrides_and_clamps() {
        let mut config = base_config();
        let file_config: FileConfig = toml::from_str(
            r#"
            api_base = "https://example.test/api"
            update_interval_secs = 3
            opensky_username = "user"

            [[regions]]
            key = "cyprus"
            name = "Cyprus"
            icao = "LCCC"
            min_lat = 34.4
            max_lat = 35.8
            min_lon = 32.2
            max_lon = 34.7
            "#,
        )
        .unwrap();
        apply_file_config(&mut config, file_config).unwrap();
        assert_eq!(config.api_base, "https://example.test/api");
        // Clamped up to the minimum cadence.
        assert_eq!(config.update_interval, Duration::from_secs(10));
        assert_eq!(config.opensky_username, "user");
        assert_eq!(config.regions.len(), 1);
        assert_eq!(config.regions[0].key, "cyprus");
    }

    #[test]
    fn region_validation() {
        assert!(validate_regions(&default_regions()).is_ok());
        assert!(validate_regions(&[]).is_err());

        let mut duplicated = default_regions();
        duplicated.push(duplicated[0].clone());
        assert!(validate_regions(&duplicated).is_err());

        let mut inverted = default_regions();
        inverted[0].bounds.min_lat = 90.0;
        assert!(validate_regions(&inverted).is_err());
    }
}
