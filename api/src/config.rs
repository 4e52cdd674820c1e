// Startup configuration read from environment variables.
use application::{LocationPolicy, SiteInfo};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub site: SiteInfo,
    /// JSONL snapshot backing the store; `None` keeps everything in memory.
    pub data_file: Option<PathBuf>,
    pub location_policy: LocationPolicy,
    /// Answer list/category reads with `[]` instead of 500 when the store fails.
    pub lenient_reads: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Invalid values fall back to defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(port_str) => match u16::from_str(port_str.trim()) {
                Ok(port_num) => {
                    info!("Using port {} from environment variable PORT.", port_num);
                    port_num
                }
                Err(_) => {
                    warn!(
                        "Invalid PORT value '{}' in environment variable. Using default port {}.",
                        port_str, DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            None => {
                info!(
                    "PORT environment variable not set. Using default port {}.",
                    DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        };

        let location_policy = match lookup("LOCATION_MODE").as_deref().map(str::trim) {
            None | Some("random") => LocationPolicy::demo_default(),
            Some("none") => LocationPolicy::None,
            Some(other) => {
                warn!(
                    "Invalid LOCATION_MODE '{}'. Expected 'random' or 'none'; using 'random'.",
                    other
                );
                LocationPolicy::demo_default()
            }
        };

        let lenient_reads = match lookup("LENIENT_READS").as_deref().map(str::trim) {
            None => false,
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(other) => {
                warn!("Invalid LENIENT_READS '{}'. Using false.", other);
                false
            }
        };

        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let base_url = text("SITE_URL", &format!("http://localhost:{}", port));

        Self {
            port,
            site: SiteInfo {
                base_url: base_url.trim_end_matches('/').to_string(),
                locality: text("SITE_LOCALITY", "New York"),
                region: text("SITE_REGION", "NY"),
                country: text("SITE_COUNTRY", "US"),
            },
            data_file: lookup("DATA_FILE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            location_policy,
            lenient_reads,
        }
    }
}
