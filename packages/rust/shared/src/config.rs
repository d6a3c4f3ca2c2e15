//! Application configuration for reviewharvest.
//!
//! User config lives at `~/.reviewharvest/reviewharvest.toml`. Missing file
//! or missing fields fall back to defaults that target the public storefront
//! endpoints.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ReviewHarvestError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "reviewharvest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".reviewharvest";

// ---------------------------------------------------------------------------
// Query option enums (wire values fixed by the upstream endpoint)
// ---------------------------------------------------------------------------

/// `filter` query parameter of the review page endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFilter {
    Recent,
    Updated,
    All,
}

impl ReviewFilter {
    /// The exact wire value sent upstream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Updated => "updated",
            Self::All => "all",
        }
    }
}

/// `review_type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    All,
    Positive,
    Negative,
}

impl ReviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// `purchase_type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    All,
    NonSteamPurchase,
    Steam,
}

impl PurchaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::NonSteamPurchase => "non_steam_purchase",
            Self::Steam => "steam",
        }
    }
}

// ---------------------------------------------------------------------------
// Config structs (matching reviewharvest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storefront endpoint settings.
    #[serde(default)]
    pub storefront: StorefrontConfig,

    /// Review query settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[storefront]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Base path of the review page endpoint; the catalog identifier is
    /// appended as a path segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Search/listing endpoint for identifier discovery.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Browser user agent attached to every request to reduce the chance of
    /// being blocked by basic bot filtering.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_url: default_search_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://store.steampowered.com/appreviews".into()
}
fn default_search_url() -> String {
    "https://store.steampowered.com/search/".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
        .into()
}

/// `[query]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Review stream ordering filter.
    #[serde(default = "default_filter")]
    pub filter: ReviewFilter,

    /// Locale code of the reviews to fetch.
    #[serde(default = "default_language")]
    pub language: String,

    /// Integer lookback window in days; `i64::MAX` selects "all time".
    #[serde(default = "default_day_range")]
    pub day_range: i64,

    /// Restrict to positive/negative reviews.
    #[serde(default = "default_review_type")]
    pub review_type: ReviewType,

    /// Restrict by purchase origin.
    #[serde(default = "default_purchase_type")]
    pub purchase_type: PurchaseType,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            language: default_language(),
            day_range: default_day_range(),
            review_type: default_review_type(),
            purchase_type: default_purchase_type(),
        }
    }
}

fn default_filter() -> ReviewFilter {
    ReviewFilter::All
}
fn default_language() -> String {
    "english".into()
}
fn default_day_range() -> i64 {
    i64::MAX
}
fn default_review_type() -> ReviewType {
    ReviewType::All
}
fn default_purchase_type() -> PurchaseType {
    PurchaseType::All
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bounded retries on transport errors for idempotent page GETs.
    /// 0 disables retries.
    #[serde(default)]
    pub max_retries: u32,

    /// Linear backoff step between retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_backoff_ms() -> u64 {
    500
}

// ---------------------------------------------------------------------------
// Harvest config (runtime, merged from config file)
// ---------------------------------------------------------------------------

/// Runtime harvester configuration — the explicit struct handed to the
/// harvester and discovery components at construction (no implicit global
/// client state).
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Review page endpoint base path.
    pub base_url: String,
    /// Search/listing endpoint.
    pub search_url: String,
    /// User agent for all outbound requests.
    pub user_agent: String,
    /// Review stream ordering filter.
    pub filter: ReviewFilter,
    /// Locale code.
    pub language: String,
    /// Lookback window in days (`i64::MAX` = all time).
    pub day_range: i64,
    /// Positive/negative restriction.
    pub review_type: ReviewType,
    /// Purchase origin restriction.
    pub purchase_type: PurchaseType,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Bounded retries on transport errors (0 = none).
    pub max_retries: u32,
    /// Linear backoff step in milliseconds.
    pub retry_backoff_ms: u64,
}

impl From<&AppConfig> for HarvestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.storefront.base_url.clone(),
            search_url: config.storefront.search_url.clone(),
            user_agent: config.storefront.user_agent.clone(),
            filter: config.query.filter,
            language: config.query.language.clone(),
            day_range: config.query.day_range,
            review_type: config.query.review_type,
            purchase_type: config.query.purchase_type,
            timeout_secs: config.http.timeout_secs,
            max_retries: config.http.max_retries,
            retry_backoff_ms: config.http.retry_backoff_ms,
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl HarvestConfig {
    /// Check that both endpoint URLs are well-formed absolute URLs.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("base_url", &self.base_url), ("search_url", &self.search_url)] {
            Url::parse(value).map_err(|e| {
                ReviewHarvestError::config(format!("{name} {value:?} is not a valid URL: {e}"))
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.reviewharvest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReviewHarvestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.reviewharvest/reviewharvest.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ReviewHarvestError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ReviewHarvestError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ReviewHarvestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ReviewHarvestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ReviewHarvestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
