// Client configuration: provider endpoint, quota, cache lifetimes and search defaults

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClientError;
use crate::models::{CabinClass, SortBy};

pub const DEFAULT_BASE_URL: &str = "https://sky-scrapper.p.rapidapi.com";
pub const DEFAULT_API_HOST: &str = "sky-scrapper.p.rapidapi.com";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
    pub timeout: Duration,
    pub locale: String,
    pub quota: QuotaConfig,
    pub cache_ttl: CacheTtls,
    pub limits: ResultLimits,
    pub search_defaults: SearchDefaults,
    // Upper bound on how long a Geolocator may take before falling back
    pub geolocation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: Duration::from_secs(30),
            locale: "en-US".to_string(),
            quota: QuotaConfig::default(),
            cache_ttl: CacheTtls::default(),
            limits: ResultLimits::default(),
            search_defaults: SearchDefaults::default(),
            geolocation_timeout: Duration::from_secs(10),
        }
    }
}

// Monthly request allowance of the provider plan
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    pub limit: usize,
    pub warn_margin: usize,
}

impl QuotaConfig {
    pub fn warn_threshold(&self) -> usize {
        self.limit.saturating_sub(self.warn_margin)
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            warn_margin: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub airports: Duration,
    pub nearby: Duration,
    pub flights: Duration,
    pub server_status: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            airports: minutes(240),
            nearby: minutes(1440),
            flights: minutes(30),
            server_status: minutes(5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResultLimits {
    pub airports: usize,
    pub nearby: usize,
    pub flights: usize,
    pub min_query_len: usize,
}

impl Default for ResultLimits {
    fn default() -> Self {
        Self {
            airports: 8,
            nearby: 10,
            flights: 15,
            min_query_len: 2,
        }
    }
}

// Values sent for optional FlightSearchRequest fields the caller left unset
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub cabin_class: CabinClass,
    pub adults: u8,
    pub sort_by: SortBy,
    pub currency: String,
    pub market: String,
    pub country_code: String,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            cabin_class: CabinClass::Economy,
            adults: 1,
            sort_by: SortBy::Best,
            currency: "USD".to_string(),
            market: "en-US".to_string(),
            country_code: "US".to_string(),
        }
    }
}

pub fn minutes(count: u64) -> Duration {
    Duration::from_secs(count * 60)
}

impl ClientConfig {
    // Builds a configuration from `SKYFARE_*` variables and `RAPIDAPI_KEY`.
    // Anything not set keeps its default; the API key is mandatory.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = ClientConfig {
            api_key: env::var("RAPIDAPI_KEY")
                .map_err(|_| ClientError::ConfigError("RAPIDAPI_KEY is not set".to_string()))?,
            ..ClientConfig::default()
        };

        if let Ok(base_url) = env::var("SKYFARE_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_host) = env::var("SKYFARE_API_HOST") {
            config.api_host = api_host;
        }
        if let Ok(locale) = env::var("SKYFARE_LOCALE") {
            config.locale = locale;
        }
        if let Some(secs) = parse_var::<u64>("SKYFARE_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parse_var::<usize>("SKYFARE_QUOTA_LIMIT")? {
            config.quota.limit = limit;
        }
        if let Some(margin) = parse_var::<usize>("SKYFARE_QUOTA_WARN_MARGIN")? {
            config.quota.warn_margin = margin;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ClientError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::ConfigError(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_provider_plan() {
        let config = ClientConfig::default();
        assert_eq!(config.quota.limit, 20);
        assert_eq!(config.quota.warn_threshold(), 18);
        assert_eq!(config.cache_ttl.flights, Duration::from_secs(30 * 60));
        assert_eq!(config.cache_ttl.nearby, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.limits.flights, 15);
        assert_eq!(config.limits.airports, 8);
        assert_eq!(config.search_defaults.currency, "USD");
    }

    #[test]
    fn test_warn_threshold_saturates() {
        let quota = QuotaConfig {
            limit: 1,
            warn_margin: 5,
        };
        assert_eq!(quota.warn_threshold(), 0);
    }

    // Single test touching the process environment, to avoid races between tests
    #[test]
    fn test_from_env() {
        env::remove_var("RAPIDAPI_KEY");
        assert!(matches!(
            ClientConfig::from_env(),
            Err(ClientError::ConfigError(_))
        ));

        env::set_var("RAPIDAPI_KEY", "secret");
        env::set_var("SKYFARE_QUOTA_LIMIT", "50");
        env::set_var("SKYFARE_TIMEOUT_SECS", "5");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.quota.limit, 50);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        env::set_var("SKYFARE_QUOTA_LIMIT", "lots");
        assert!(ClientConfig::from_env().is_err());

        env::remove_var("SKYFARE_QUOTA_LIMIT");
        env::remove_var("SKYFARE_TIMEOUT_SECS");
        env::remove_var("RAPIDAPI_KEY");
    }
}
