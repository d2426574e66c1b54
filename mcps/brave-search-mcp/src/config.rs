//! Configuration loading for brave-search-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variables `BRAVE_API_KEY`, `BRAVE_SEARCH_BASE_URL`, `BRAVE_SEARCH_TIMEOUT_MS`
//! 2. The file named by `BRAVE_SEARCH_CONFIG_PATH`
//! 3. ~/.binks/brave-search.toml
//! 4. Default values
//!
//! The API key has no default. Starting without one is a [`ConfigError`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";
pub const DEFAULT_WIKIDATA_URL: &str = "https://www.wikidata.org/w/api.php";

/// Errors that make the server unable to start
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no Brave API key configured - set BRAVE_API_KEY or brave.api_key")]
    MissingCredential,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// The provider API key
///
/// Kept opaque so it cannot end up in logs: `Debug` and `Display` are
/// redacted and there is no `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the outbound request header only
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub brave: BraveConfig,
    pub search: SearchConfig,
    pub homepage: HomepageConfig,
    pub wikidata: WikidataConfig,
}

/// Brave provider connection settings
#[derive(Debug, Clone)]
pub struct BraveConfig {
    pub credential: Credential,
    /// Provider base URL, without the `/res/v1/...` path
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

/// General search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Result count used when the caller does not pass one
    #[serde(default = "default_count")]
    pub default_count: u32,
}

/// Official homepage lookup settings
#[derive(Debug, Clone, Deserialize)]
pub struct HomepageConfig {
    /// Domains never accepted as a company's own site
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,
}

/// Wikidata fallback for the homepage lookup
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_wikidata_url")]
    pub url: String,
}

/// On-disk shape of the config file; every field optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    brave: BraveFileConfig,
    search: Option<SearchConfig>,
    homepage: Option<HomepageConfig>,
    wikidata: Option<WikidataConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct BraveFileConfig {
    api_key: Option<Credential>,
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    user_agent: Option<String>,
}

// Default value functions
fn default_count() -> u32 {
    10
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_wikidata_url() -> String {
    DEFAULT_WIKIDATA_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("brave-search-mcp/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_excluded_domains() -> Vec<String> {
    ["wikipedia.org", "facebook.com", "twitter.com", "linkedin.com"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
        }
    }
}

impl Default for HomepageConfig {
    fn default() -> Self {
        Self {
            excluded_domains: default_excluded_domains(),
        }
    }
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            url: default_wikidata_url(),
        }
    }
}

impl BraveConfig {
    /// Settings pointing at the public Brave endpoint
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(default_timeout_ms()),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Defaults for everything except the credential
    pub fn new(credential: Credential) -> Self {
        Self {
            brave: BraveConfig::new(credential),
            search: SearchConfig::default(),
            homepage: HomepageConfig::default(),
            wikidata: WikidataConfig::default(),
        }
    }

    /// Load configuration from the process environment and config file
    pub fn load() -> Result<Self, ConfigError> {
        let file_content = match Self::find_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                let content =
                    std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Some((path, content))
            }
            Some(path) => {
                tracing::info!("Config file {} not found, using defaults", path.display());
                None
            }
            None => {
                tracing::info!("No config path specified, using defaults");
                None
            }
        };

        Self::resolve(
            file_content
                .as_ref()
                .map(|(p, c)| (p.as_path(), c.as_str())),
            |key| std::env::var(key).ok(),
        )
    }

    /// Build a config from optional file content and an environment lookup
    ///
    /// Environment values win over file values.
    pub fn resolve(
        file: Option<(&Path, &str)>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match file {
            Some((path, content)) => toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            None => FileConfig::default(),
        };

        let credential = env("BRAVE_API_KEY")
            .map(Credential::new)
            .or(file.brave.api_key)
            .filter(|c| !c.expose().trim().is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let base_url = env("BRAVE_SEARCH_BASE_URL")
            .or(file.brave.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = validate_base_url(&base_url)?;

        let timeout_ms = match env("BRAVE_SEARCH_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "BRAVE_SEARCH_TIMEOUT_MS",
                message: format!("'{}' is not a number of milliseconds", raw),
            })?,
            None => file.brave.timeout_ms.unwrap_or_else(default_timeout_ms),
        };
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "brave.timeout_ms",
                message: "timeout must be greater than zero".to_string(),
            });
        }

        let search = file.search.unwrap_or_default();
        if search.default_count == 0 {
            return Err(ConfigError::Invalid {
                key: "search.default_count",
                message: "default count must be at least 1".to_string(),
            });
        }

        Ok(Self {
            brave: BraveConfig {
                credential,
                base_url,
                timeout: Duration::from_millis(timeout_ms),
                user_agent: file.brave.user_agent.unwrap_or_else(default_user_agent),
            },
            search,
            homepage: file.homepage.unwrap_or_default(),
            wikidata: file.wikidata.unwrap_or_default(),
        })
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("BRAVE_SEARCH_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        // 2. Check ~/.binks/brave-search.toml
        dirs::home_dir().map(|home| home.join(".binks").join("brave-search.toml"))
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match url::Url::parse(trimmed) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(trimmed.to_string()),
        Ok(url) => Err(ConfigError::Invalid {
            key: "brave.base_url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => Err(ConfigError::Invalid {
            key: "brave.base_url",
            message: format!("'{}': {}", raw, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let err = Config::resolve(None, env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));

        let err = Config::resolve(None, env_of(&[("BRAVE_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(None, env_of(&[("BRAVE_API_KEY", "secret")])).unwrap();
        assert_eq!(config.brave.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.brave.timeout, Duration::from_millis(5000));
        assert_eq!(config.search.default_count, 10);
        assert!(config.wikidata.enabled);
        assert_eq!(config.homepage.excluded_domains.len(), 4);
    }

    #[test]
    fn test_file_values() {
        let toml = r#"
            [brave]
            api_key = "from-file"
            base_url = "http://localhost:9000/"
            timeout_ms = 250

            [search]
            default_count = 4

            [wikidata]
            enabled = false
        "#;
        let config =
            Config::resolve(Some((Path::new("test.toml"), toml)), env_of(&[])).unwrap();
        assert_eq!(config.brave.credential, Credential::new("from-file"));
        assert_eq!(config.brave.base_url, "http://localhost:9000");
        assert_eq!(config.brave.timeout, Duration::from_millis(250));
        assert_eq!(config.search.default_count, 4);
        assert!(!config.wikidata.enabled);
        assert_eq!(config.wikidata.url, DEFAULT_WIKIDATA_URL);
    }

    #[test]
    fn test_env_overrides_file() {
        let toml = r#"
            [brave]
            api_key = "from-file"
            base_url = "http://localhost:9000"
        "#;
        let env = env_of(&[
            ("BRAVE_API_KEY", "from-env"),
            ("BRAVE_SEARCH_BASE_URL", "http://127.0.0.1:1234"),
            ("BRAVE_SEARCH_TIMEOUT_MS", "1500"),
        ]);
        let config = Config::resolve(Some((Path::new("test.toml"), toml)), env).unwrap();
        assert_eq!(config.brave.credential, Credential::new("from-env"));
        assert_eq!(config.brave.base_url, "http://127.0.0.1:1234");
        assert_eq!(config.brave.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values() {
        let env = env_of(&[("BRAVE_API_KEY", "k"), ("BRAVE_SEARCH_TIMEOUT_MS", "soon")]);
        assert!(matches!(
            Config::resolve(None, env),
            Err(ConfigError::Invalid { .. })
        ));

        let env = env_of(&[("BRAVE_API_KEY", "k"), ("BRAVE_SEARCH_BASE_URL", "ftp://x")]);
        assert!(matches!(
            Config::resolve(None, env),
            Err(ConfigError::Invalid { .. })
        ));

        let bad = Config::resolve(Some((Path::new("bad.toml"), "[brave")), env_of(&[]));
        assert!(matches!(bad, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_credential_is_redacted() {
        let config = Config::resolve(None, env_of(&[("BRAVE_API_KEY", "super-secret")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("Credential(***)"));
        assert_eq!(config.brave.credential.to_string(), "***");
    }
}
