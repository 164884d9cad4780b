//! Persisted browsing-session state and the seeding policy for fresh runs.
//!
//! A prior run's storage state (cookies + localStorage) can carry a cleared
//! challenge across invocations. When none exists, a session is seeded from
//! whatever credential the configuration offers, in a fixed order of
//! preference. Validity is never checked locally; the site decides.

use std::fs;
use std::path::{Path, PathBuf};

use pw::{Cookie, StorageState};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{GrabError, Result};

/// Cookie name Cloudflare issues once its challenge has been passed.
pub const CLEARANCE_COOKIE: &str = "cf_clearance";

/// Loads and persists the opaque session blob at a fixed path.
///
/// Single run, single writer: `save` overwrites unconditionally and is only
/// called at the end of a successful run.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted state if a readable one exists. Absence is the
    /// normal first-run case; an unparsable file is treated the same way
    /// rather than aborting the run.
    pub fn load(&self) -> Option<StorageState> {
        if !self.path.exists() {
            return None;
        }
        match StorageState::from_file(&self.path) {
            Ok(state) => {
                debug!(
                    target = "taograb",
                    path = %self.path.display(),
                    cookies = state.cookies.len(),
                    "loaded persisted session state"
                );
                Some(state)
            }
            Err(e) => {
                warn!(
                    target = "taograb",
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable session state"
                );
                None
            }
        }
    }

    pub fn save(&self, state: &StorageState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        state.to_file(&self.path).map_err(|e| GrabError::Persist {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        debug!(
            target = "taograb",
            path = %self.path.display(),
            cookies = state.cookies.len(),
            "session state saved"
        );
        Ok(())
    }
}

/// How a fresh browsing session gets its initial credentials. Selected once
/// at startup and immutable for the run; a persisted session supersedes any
/// configured credential.
pub enum SessionSeedStrategy {
    Persisted(StorageState),
    CookieList(Vec<Cookie>),
    ClearanceCookie(String),
    None,
}

impl SessionSeedStrategy {
    pub fn select(store: &SessionStore, config: &Config) -> Result<Self> {
        if let Some(state) = store.load() {
            return Ok(Self::Persisted(state));
        }
        if let Some(raw) = config.cookies.as_deref() {
            return Ok(Self::CookieList(parse_cookie_header(
                raw,
                &config.cookie_domain()?,
            )));
        }
        if let Some(value) = config.cf_clearance.as_deref() {
            return Ok(Self::ClearanceCookie(value.to_string()));
        }
        Ok(Self::None)
    }

    /// Cookies to inject into a freshly created context. Empty for
    /// `Persisted` (the context is built from the blob directly) and for
    /// `None` (unauthenticated fresh session).
    pub fn seed_cookies(&self, domain: &str) -> Vec<Cookie> {
        match self {
            Self::CookieList(cookies) => cookies.clone(),
            Self::ClearanceCookie(value) => vec![clearance_cookie(value, domain)],
            Self::Persisted(_) | Self::None => Vec::new(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Persisted(_) => "persisted",
            Self::CookieList(_) => "cookie-list",
            Self::ClearanceCookie(_) => "clearance-cookie",
            Self::None => "fresh",
        }
    }
}

/// Parses a raw `name=value; name=value` header string into cookies scoped
/// to `domain`. Values may themselves contain `=`.
pub fn parse_cookie_header(raw: &str, domain: &str) -> Vec<Cookie> {
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| Cookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: Some(domain.to_string()),
            path: Some("/".to_string()),
            ..Default::default()
        })
        .collect()
}

fn clearance_cookie(value: &str, domain: &str) -> Cookie {
    Cookie {
        name: CLEARANCE_COOKIE.to_string(),
        value: value.to_string(),
        domain: Some(domain.to_string()),
        path: Some("/".to_string()),
        secure: Some(true),
        http_only: Some(true),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;

    const STATE_JSON: &str = r#"{
  "cookies": [
    {
      "name": "cf_clearance",
      "value": "token",
      "domain": ".taoiptv.com",
      "path": "/",
      "expires": -1.0,
      "httpOnly": true,
      "secure": true,
      "sameSite": "Lax"
    }
  ],
  "origins": []
}"#;

    fn config_with(extra: &str) -> Config {
        let raw = format!(r#"{{"SEARCH_URL": "https://taoiptv.com/search"{extra}}}"#);
        Config::from_json(&raw).unwrap()
    }

    #[test]
    fn load_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path().join("state.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn load_corrupt_file_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::new(path).load().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let seed_path = temp.path().join("seed.json");
        fs::write(&seed_path, STATE_JSON).unwrap();
        let state = SessionStore::new(&seed_path).load().unwrap();

        let store = SessionStore::new(temp.path().join("nested/dir/state.json"));
        store.save(&state).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.cookies.len(), 1);
        assert_eq!(reloaded.cookies[0].name, "cf_clearance");
    }

    #[test]
    fn persisted_state_supersedes_configured_credentials() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(&path, STATE_JSON).unwrap();
        let store = SessionStore::new(path);

        let config = config_with(r#", "COOKIES": "a=1", "CF_CLEARANCE": "b""#);
        let strategy = SessionSeedStrategy::select(&store, &config).unwrap();
        assert_eq!(strategy.describe(), "persisted");
    }

    #[test]
    fn cookie_header_beats_clearance_value() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path().join("absent.json"));

        let config = config_with(r#", "COOKIES": "a=1; b=2", "CF_CLEARANCE": "c""#);
        let strategy = SessionSeedStrategy::select(&store, &config).unwrap();
        assert_eq!(strategy.describe(), "cookie-list");

        let cookies = strategy.seed_cookies(".taoiptv.com");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "a");
        assert_eq!(cookies[1].value, "2");
    }

    #[test]
    fn clearance_only_builds_single_named_cookie() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path().join("absent.json"));

        let config = config_with(r#", "CF_CLEARANCE": "clr""#);
        let strategy = SessionSeedStrategy::select(&store, &config).unwrap();
        assert_eq!(strategy.describe(), "clearance-cookie");

        let cookies = strategy.seed_cookies(".taoiptv.com");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, CLEARANCE_COOKIE);
        assert_eq!(cookies[0].value, "clr");
        assert_eq!(cookies[0].domain.as_deref(), Some(".taoiptv.com"));
    }

    #[test]
    fn nothing_configured_runs_fresh() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path().join("absent.json"));

        let strategy = SessionSeedStrategy::select(&store, &config_with("")).unwrap();
        assert_eq!(strategy.describe(), "fresh");
        assert!(strategy.seed_cookies(".taoiptv.com").is_empty());
    }

    #[test]
    fn cookie_values_keep_embedded_equals() {
        let cookies = parse_cookie_header("token=a=b=c; plain=x", ".taoiptv.com");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].value, "a=b=c");
        assert_eq!(cookies[1].name, "plain");
    }

    #[test]
    fn junk_pairs_are_skipped() {
        let cookies = parse_cookie_header("novalue; =anonymous; ok=1", ".taoiptv.com");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "ok");
    }
}
