use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROJECTION_YEARS: u32 = 4;
const MAX_PROJECTION_YEARS: u32 = 50;
const STATE_DIR: &str = ".valuation-dashboard";
const STATE_FILE: &str = "scenarios.json";

/// Configuration for the dashboard backend and local scenario state.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: String,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub projection_years: u32,
    pub scenario_state_file: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            projection_years: DEFAULT_PROJECTION_YEARS,
            scenario_state_file: default_state_file(),
        }
    }
}

impl DashboardConfig {
    /// Read configuration from the process environment.
    ///
    /// Unparseable numbers fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let api_key = lookup("API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let timeout = parse_or_default::<u64>(&lookup, "API_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let projection_years = parse_or_default::<u32>(&lookup, "PROJECTION_YEARS")
            .filter(|years| *years > 0)
            .map(|years| {
                if years > MAX_PROJECTION_YEARS {
                    tracing::warn!(
                        "PROJECTION_YEARS={} exceeds {}, capping",
                        years,
                        MAX_PROJECTION_YEARS
                    );
                }
                years.min(MAX_PROJECTION_YEARS)
            })
            .unwrap_or(defaults.projection_years);

        let scenario_state_file = lookup("SCENARIO_STATE_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.scenario_state_file);

        Self {
            base_url,
            api_key,
            timeout,
            projection_years,
            scenario_state_file,
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}

fn default_state_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR)
        .join(STATE_FILE)
}
