use std::fs;
use std::path::Path;

use pw::ProxySettings;
use serde::Deserialize;
use url::{Position, Url};

use crate::error::{GrabError, Result};

/// Environment variable holding the JSON configuration object.
pub const CONFIG_ENV: &str = "TV_ACCOUNTS";

/// Local SOCKS5 endpoint the hysteria2 tunnel listens on.
pub const PROXY_SERVER: &str = "socks5://127.0.0.1:1080";

/// Immutable run configuration, constructed once at process entry and
/// passed by reference into every component.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Search-result page that carries the copy-token button.
    #[serde(rename = "SEARCH_URL")]
    pub search_url: String,

    /// Raw `name=value; name=value` cookie header used to seed a fresh
    /// session when no persisted state exists.
    #[serde(rename = "COOKIES", default)]
    pub cookies: Option<String>,

    /// Single cf_clearance cookie value, the minimal seeding variant.
    #[serde(rename = "CF_CLEARANCE", default)]
    pub cf_clearance: Option<String>,

    /// Presence routes all browser traffic through the local SOCKS5 proxy.
    #[serde(rename = "HY2_URL", default)]
    pub hy2_url: Option<String>,
}

impl Config {
    /// Loads the configuration from `path` when given, otherwise from the
    /// `TV_ACCOUNTS` environment variable. This is the only place the
    /// process reads ambient state.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let raw = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                GrabError::Config(format!("cannot read {}: {e}", path.display()))
            })?,
            None => std::env::var(CONFIG_ENV).map_err(|_| {
                GrabError::Config(format!("{CONFIG_ENV} is not set and no --config file given"))
            })?,
        };
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| GrabError::Config(format!("invalid configuration JSON: {e}")))
    }

    /// Scheme + host of the search URL, e.g. `https://taoiptv.com`. The
    /// gated resource lives on the same origin.
    pub fn origin(&self) -> Result<String> {
        let url = self.parsed_search_url()?;
        Ok(url[..Position::BeforePath].to_string())
    }

    /// Cookie domain for seeded cookies, e.g. `.taoiptv.com`.
    pub fn cookie_domain(&self) -> Result<String> {
        let url = self.parsed_search_url()?;
        let host = url
            .host_str()
            .ok_or_else(|| GrabError::Config(format!("SEARCH_URL has no host: {}", self.search_url)))?;
        Ok(format!(".{host}"))
    }

    pub fn proxy(&self) -> Option<ProxySettings> {
        self.hy2_url.as_ref().map(|_| ProxySettings {
            server: PROXY_SERVER.to_string(),
            ..Default::default()
        })
    }

    fn parsed_search_url(&self) -> Result<Url> {
        Url::parse(&self.search_url)
            .map_err(|e| GrabError::Config(format!("invalid SEARCH_URL {}: {e}", self.search_url)))
    }
}
