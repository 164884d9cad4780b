use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, GrabError>;

/// Fatal error classes for a grab run. Every variant terminates the run;
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("challenge gate did not clear for {url} within {waited_ms}ms")]
    ChallengeBlocked { url: String, waited_ms: u64 },

    #[error("no access token on {url} after {waited_ms}ms")]
    TokenNotFound { url: String, waited_ms: u64 },

    #[error("channel list body too small ({len} bytes): {preview}")]
    ResourceEmpty { len: usize, preview: String },

    #[error("failed to persist {path}: {message}")]
    Persist { path: PathBuf, message: String },

    #[error(transparent)]
    Browser(#[from] pw::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
