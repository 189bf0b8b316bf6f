use crate::config::types::{Config, CrawlerConfig, OracleConfig, OutputConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_oracle_config(&config.oracle)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates chunking and concurrency limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.chunk_size < 1 || config.chunk_size > 100_000 {
        return Err(ConfigError::Validation(format!(
            "chunk-size must be between 1 and 100000, got {}",
            config.chunk_size
        )));
    }

    if config.workers < 1 || config.workers > 10_000 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 10000, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    // A minute between attempts already stalls a chunk for several minutes
    if config.delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "delay-ms must be <= 60000, got {}",
            config.delay_ms
        )));
    }

    Ok(())
}

/// Validates the oracle endpoint and timeouts
fn validate_oracle_config(config: &OracleConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot be used as a base",
            config.base_url
        )));
    }

    if !config.pair_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "pair-path must start with '/', got '{}'",
            config.pair_path
        )));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs and connect-timeout-secs must be > 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.snapshot_path.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_crawler_limits() {
        let mut config = CrawlerConfig::default();
        config.chunk_size = 0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = CrawlerConfig::default();
        config.workers = 0;
        assert!(validate_crawler_config(&config).is_err());

        let config = CrawlerConfig {
            chunk_size: 10,
            workers: 2,
        };
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_validate_retry() {
        let mut config = RetryConfig::default();
        config.max_attempts = 0;
        assert!(validate_retry_config(&config).is_err());

        let mut config = RetryConfig::default();
        config.delay_ms = 120_000;
        assert!(validate_retry_config(&config).is_err());
    }

    #[test]
    fn test_validate_oracle_url() {
        let mut config = OracleConfig::default();
        assert!(validate_oracle_config(&config).is_ok());

        config.base_url = "http://127.0.0.1:8080".to_string();
        assert!(validate_oracle_config(&config).is_ok());

        config.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            validate_oracle_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.base_url = "not a url".to_string();
        assert!(validate_oracle_config(&config).is_err());
    }

    #[test]
    fn test_validate_pair_path() {
        let mut config = OracleConfig::default();
        config.pair_path = "pair".to_string();
        assert!(validate_oracle_config(&config).is_err());
    }

    #[test]
    fn test_validate_output() {
        let config = OutputConfig {
            snapshot_path: String::new(),
        };
        assert!(validate_output_config(&config).is_err());
    }
}
