use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of movies a random sample aims for
    #[serde(default = "default_random_sample_size")]
    pub random_sample_size: usize,

    /// Catalog calls a single random sample may make
    #[serde(default = "default_random_max_attempts")]
    pub random_max_attempts: u32,

    /// Failed catalog calls in a row after which a random sample gives up
    #[serde(default = "default_random_max_consecutive_failures")]
    pub random_max_consecutive_failures: u32,

    /// Timeout for a single catalog request, in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_random_sample_size() -> usize {
    20
}

fn default_random_max_attempts() -> u32 {
    15
}

fn default_random_max_consecutive_failures() -> u32 {
    3
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the services cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.omdb_api_key.trim().is_empty() {
            anyhow::bail!("OMDB_API_KEY must not be empty");
        }
        if self.random_sample_size == 0 {
            anyhow::bail!("RANDOM_SAMPLE_SIZE must be greater than zero");
        }
        if self.random_max_attempts == 0 {
            anyhow::bail!("RANDOM_MAX_ATTEMPTS must be greater than zero");
        }
        if self.random_max_consecutive_failures == 0 {
            anyhow::bail!("RANDOM_MAX_CONSECUTIVE_FAILURES must be greater than zero");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[("OMDB_API_KEY", "secret")]);

        assert_eq!(config.omdb_api_url, "https://www.omdbapi.com/");
        assert_eq!(config.random_sample_size, 20);
        assert_eq!(config.random_max_attempts, 15);
        assert_eq!(config.random_max_consecutive_failures, 3);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("OMDB_API_KEY", "secret"),
            ("PORT", "8080"),
            ("RANDOM_SAMPLE_SIZE", "10"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.random_sample_size, 10);
    }

    #[test]
    fn test_missing_api_key_fails() {
        let result = envy::from_iter::<_, Config>(Vec::<(String, String)>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = from_pairs(&[("OMDB_API_KEY", "secret"), ("RANDOM_MAX_ATTEMPTS", "0")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_api_key() {
        let config = from_pairs(&[("OMDB_API_KEY", "  ")]);
        assert!(config.validate().is_err());
    }
}
