//! Market data provider settings.

use super::parse_or;
use crate::infrastructure::twelve_data::DEFAULT_BASE_URL;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataEnvConfig {
    pub twelve_data_base_url: String,
    /// Comma separated in `TWELVE_DATA_API_KEYS`
    pub twelve_data_api_keys: Vec<String>,
    pub output_size: usize,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let twelve_data_api_keys = lookup("TWELVE_DATA_API_KEYS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            twelve_data_base_url: lookup("TWELVE_DATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            twelve_data_api_keys,
            output_size: parse_or(lookup, "TWELVE_DATA_OUTPUT_SIZE", 100)?,
            http_timeout_secs: parse_or(lookup, "HTTP_TIMEOUT_SECS", 30)?,
            max_retries: parse_or(lookup, "HTTP_MAX_RETRIES", 3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketDataEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config.twelve_data_base_url, DEFAULT_BASE_URL);
        assert!(config.twelve_data_api_keys.is_empty());
        assert_eq!(config.output_size, 100);
    }

    #[test]
    fn test_key_list_is_split_and_trimmed() {
        let config = MarketDataEnvConfig::from_lookup(&|key| {
            (key == "TWELVE_DATA_API_KEYS").then(|| "abc, def,,".to_string())
        })
        .unwrap();
        assert_eq!(config.twelve_data_api_keys, vec!["abc", "def"]);
    }
}
