use serde::Deserialize;

/// Main configuration structure for infc
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl chunking and concurrency
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of pairs executed and checkpointed together
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Number of concurrent oracle calls within a chunk
    pub workers: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            workers: 1000,
        }
    }
}

/// Retry behavior for transient oracle failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per pair before the pair is given up as unavailable
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Whether connection-level failures count against `max_attempts`.
    /// When false they are retried until the oracle answers.
    #[serde(rename = "bound-network-failures")]
    pub bound_network_failures: bool,

    /// Pause between attempts (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            bound_network_failures: true,
            delay_ms: 0,
        }
    }
}

/// Remote combination oracle
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Scheme and host of the oracle service
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the pairing endpoint
    #[serde(rename = "pair-path")]
    pub pair_path: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User agent sent with each request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://infiniteback.org".to_string(),
            pair_path: "/pair".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("infc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON graph snapshot
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: "./data.json".to_string(),
        }
    }
}
