//! Configuration parsing and validation.
//!
//! NCM Lookup is configured via a TOML file (default: `config/ncm.toml`):
//!
//! ```toml
//! [db]
//! path = "./data/ncm.sqlite"
//!
//! [backend]
//! url = "https://project.supabase.co"
//! anon_key = "public-anon-key"
//! table = "ncm"
//! page_size = 1000
//! ```
//!
//! The `[backend]` section is optional; commands that talk to the backend
//! fail with a configuration error when it is missing. The environment
//! variables `NCM_BACKEND_URL` and `NCM_BACKEND_ANON_KEY` override the file
//! (and create the section when both are set).
//!
//! Validation happens once, in [`load_config`]: empty credentials are
//! rejected there instead of producing a client that cannot authenticate.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_BACKEND_URL: &str = "NCM_BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "NCM_BACKEND_ANON_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub backend: Option<BackendConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Service base URL, e.g. `https://project.supabase.co`.
    pub url: String,
    /// Anonymous (public) API key.
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_table() -> String {
    "ncm".to_string()
}

fn default_page_size() -> usize {
    1000
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            table: default_table(),
            page_size: default_page_size(),
        }
    }

    /// Reject empty credentials, unparseable URLs, and a zero page size.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            bail!("backend.url must be set (or {} exported)", ENV_BACKEND_URL);
        }
        if self.anon_key.trim().is_empty() {
            bail!(
                "backend.anon_key must be set (or {} exported)",
                ENV_BACKEND_ANON_KEY
            );
        }
        let parsed = url::Url::parse(&self.url)
            .with_context(|| format!("backend.url is not a valid URL: {}", self.url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("backend.url must use http or https, got '{}'", parsed.scheme());
        }
        if self.table.trim().is_empty() {
            bail!("backend.table must not be empty");
        }
        if self.page_size == 0 {
            bail!("backend.page_size must be > 0");
        }
        Ok(())
    }
}

impl Config {
    /// The backend section, or an error explaining how to configure it.
    pub fn backend(&self) -> Result<&BackendConfig> {
        self.backend.as_ref().with_context(|| {
            format!(
                "No [backend] section configured. Add one to the config file or export {} and {}.",
                ENV_BACKEND_URL, ENV_BACKEND_ANON_KEY
            )
        })
    }

    /// Apply environment-style overrides for the backend credentials.
    fn apply_overrides(&mut self, url: Option<String>, anon_key: Option<String>) {
        if let Some(backend) = self.backend.as_mut() {
            if let Some(url) = url {
                backend.url = url;
            }
            if let Some(key) = anon_key {
                backend.anon_key = key;
            }
        } else if let (Some(url), Some(key)) = (url, anon_key) {
            self.backend = Some(BackendConfig::new(url, key));
        }
    }
}

/// Parse and validate configuration text, with explicit overrides.
pub fn parse_config(
    content: &str,
    url_override: Option<String>,
    key_override: Option<String>,
) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    config.apply_overrides(url_override, key_override);

    if config.db.path.as_os_str().is_empty() {
        bail!("db.path must not be empty");
    }

    if let Some(backend) = &config.backend {
        backend.validate()?;
    }

    Ok(config)
}

/// Read, override from the environment, and validate the config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(
        &content,
        non_empty_env(ENV_BACKEND_URL),
        non_empty_env(ENV_BACKEND_ANON_KEY),
    )
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
