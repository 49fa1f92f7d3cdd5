//! Application configuration for docmodules.
//!
//! User config lives at `~/.docmodules/docmodules.toml`. Callers merge their
//! own overrides on top of it; the pipeline crates only ever see the runtime
//! structs ([`CrawlConfig`], [`ServiceConfig`]) and never read the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocModulesError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docmodules.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docmodules";

/// User-Agent string for crawl and service requests.
pub const USER_AGENT: &str = concat!("docmodules/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Config structs (matching docmodules.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl budget.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Text-generation service settings.
    #[serde(default)]
    pub openai: OpenAiSection,

    /// Extraction behaviour.
    #[serde(default)]
    pub extraction: ExtractionSection,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Seconds to wait after each fetched page.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// Maximum link depth from the seed URLs.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages to return.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_delay_secs() -> f64 {
    1.0
}
fn default_max_depth() -> u32 {
    2
}
fn default_max_pages() -> usize {
    30
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSection {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat model used for module extraction.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (override for proxies or compatible services).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Attempts before falling back to the heuristic describer.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for rate-limit backoff, doubled per attempt.
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Fixed delay after other service errors.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            backoff_base_secs: default_backoff_base_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            timeout_secs: default_service_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_secs() -> u64 {
    60
}
fn default_retry_delay_secs() -> u64 {
    5
}
fn default_service_timeout_secs() -> u64 {
    60
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// Use the text-generation service when a key is available.
    #[serde(default = "default_true")]
    pub use_ai: bool,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            use_ai: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Crawl config (runtime)
// ---------------------------------------------------------------------------

/// Runtime crawl budget, handed to the crawler by the caller.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Sleep after each processed page.
    pub delay: Duration,
    /// Pages deeper than this are never fetched.
    pub max_depth: u32,
    /// Crawl stops once this many pages have been collected.
    pub max_pages: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header sent with each request.
    pub user_agent: String,
}

impl CrawlConfig {
    /// Build a config with the default timeout and user agent.
    pub fn new(delay: Duration, max_depth: u32, max_pages: usize) -> Self {
        Self {
            delay,
            max_depth,
            max_pages,
            timeout: Duration::from_secs(default_timeout_secs()),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Check the budget against the crawl contract.
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(DocModulesError::config("max_pages must be at least 1"));
        }
        Ok(())
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            delay: delay_from_secs(config.crawl.delay_secs),
            max_depth: config.crawl.max_depth,
            max_pages: config.crawl.max_pages,
            timeout: Duration::from_secs(config.crawl.timeout_secs),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Negative and NaN delays clamp to zero; values too large for a `Duration`
/// saturate instead of panicking.
fn delay_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

// ---------------------------------------------------------------------------
// Service config (runtime)
// ---------------------------------------------------------------------------

/// Runtime settings for the service-backed describer.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bearer credential for the service.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_retries: u32,
    /// Rate-limit wait is `backoff_base * 2^attempt`.
    pub backoff_base: Duration,
    /// Wait after any other retryable failure.
    pub retry_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ServiceConfig {
    /// Build from the `[openai]` section with an already-resolved credential.
    pub fn from_app_config(config: &AppConfig, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: config.openai.model.clone(),
            base_url: config.openai.base_url.clone(),
            max_retries: config.openai.max_retries,
            backoff_base: Duration::from_secs(config.openai.backoff_base_secs),
            retry_delay: Duration::from_secs(config.openai.retry_delay_secs),
            timeout: Duration::from_secs(config.openai.timeout_secs),
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

/// Resolve the service credential.
///
/// An explicit key wins, then the env var named in `[openai].api_key_env`.
/// `no_ai` (or `use_ai = false` in the config) disables the service entirely.
pub fn resolve_api_key(config: &AppConfig, explicit: Option<&str>, no_ai: bool) -> Option<String> {
    if no_ai || !config.extraction.use_ai {
        return None;
    }

    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    match std::env::var(&config.openai.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => {
            tracing::debug!(var = %config.openai.api_key_env, "no service credential in environment");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docmodules/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocModulesError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docmodules/docmodules.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocModulesError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocModulesError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if !config.crawl.delay_secs.is_finite() {
        return Err(DocModulesError::config(format!(
            "{}: crawl.delay_secs must be a finite number, got {}",
            path.display(),
            config.crawl.delay_secs
        )));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocModulesError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocModulesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocModulesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_pages"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[crawl]
max_depth = 0

[openai]
model = "gpt-4o-mini"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.max_depth, 0);
        assert_eq!(config.crawl.max_pages, 30);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.max_retries, 3);
        assert!(config.extraction.use_ai);
    }

    #[test]
    fn crawl_config_from_app_config() {
        let crawl = CrawlConfig::from(&AppConfig::default());
        assert_eq!(crawl.delay, Duration::from_secs(1));
        assert_eq!(crawl.max_depth, 2);
        assert_eq!(crawl.max_pages, 30);
        assert_eq!(crawl.timeout, Duration::from_secs(10));
    }

    #[test]
    fn negative_delay_clamps_to_zero() {
        let mut app = AppConfig::default();
        app.crawl.delay_secs = -3.0;
        assert_eq!(CrawlConfig::from(&app).delay, Duration::ZERO);
    }

    #[test]
    fn non_finite_delay_does_not_panic() {
        let mut app: AppConfig = toml::from_str("[crawl]\ndelay_secs = inf\n").expect("parse");
        assert_eq!(CrawlConfig::from(&app).delay, Duration::MAX);

        app.crawl.delay_secs = f64::NAN;
        assert_eq!(CrawlConfig::from(&app).delay, Duration::ZERO);

        app.crawl.delay_secs = 1e300;
        assert_eq!(CrawlConfig::from(&app).delay, Duration::MAX);

        app.crawl.delay_secs = 0.25;
        assert_eq!(CrawlConfig::from(&app).delay, Duration::from_millis(250));
    }

    #[test]
    fn non_finite_delay_is_rejected_on_load() {
        let path = std::env::temp_dir().join(format!(
            "docmodules-inf-delay-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[crawl]\ndelay_secs = inf\n").expect("write config");

        let err = load_config_from(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, DocModulesError::Config { .. }));
        assert!(err.to_string().contains("delay_secs"));
    }

    #[test]
    fn zero_page_budget_is_rejected() {
        let config = CrawlConfig::new(Duration::ZERO, 1, 0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_pages"));
        assert!(CrawlConfig::new(Duration::ZERO, 0, 1).validate().is_ok());
    }

    #[test]
    fn explicit_key_wins_and_no_ai_disables() {
        let mut config = AppConfig::default();
        config.openai.api_key_env = "DOCMODULES_TEST_NONEXISTENT_KEY_12345".into();

        assert_eq!(resolve_api_key(&config, None, false), None);
        assert_eq!(
            resolve_api_key(&config, Some("  sk-test  "), false).as_deref(),
            Some("sk-test")
        );
        assert_eq!(resolve_api_key(&config, Some("sk-test"), true), None);

        config.extraction.use_ai = false;
        assert_eq!(resolve_api_key(&config, Some("sk-test"), false), None);
    }

    #[test]
    fn service_config_from_app_config() {
        let service = ServiceConfig::from_app_config(&AppConfig::default(), "sk-test");
        assert_eq!(service.api_key, "sk-test");
        assert_eq!(service.model, "gpt-3.5-turbo");
        assert_eq!(service.backoff_base, Duration::from_secs(60));
        assert_eq!(service.retry_delay, Duration::from_secs(5));
        assert_eq!(service.timeout, Duration::from_secs(60));

        let app: AppConfig = toml::from_str("[openai]\ntimeout_secs = 15\n").expect("parse");
        assert_eq!(
            ServiceConfig::from_app_config(&app, "sk-test").timeout,
            Duration::from_secs(15)
        );
    }
}
