//! The sequential acquisition-and-transform pipeline: one browsing session,
//! one gate decision, one fetch, one output artifact.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::diagnostics;
use crate::error::{GrabError, Result};
use crate::fetch;
use crate::gate::{self, GateDecision};
use crate::playlist;
use crate::store::{SessionSeedStrategy, SessionStore};

/// Bound on the initial search-page navigation, which has to absorb the
/// challenge redirect chain.
pub const SEARCH_TIMEOUT_MS: f64 = 60_000.0;

pub struct RunOptions {
    pub output: PathBuf,
    pub state_file: PathBuf,
}

pub struct RunSummary {
    pub channels: usize,
    pub source_lines: usize,
}

/// Runs the whole pipeline once. The browser is closed whatever the
/// outcome; a failed close after an otherwise successful run is only
/// logged.
pub async fn execute(config: &Config, opts: &RunOptions) -> Result<RunSummary> {
    let store = SessionStore::new(&opts.state_file);
    let seed = SessionSeedStrategy::select(&store, config)?;
    info!(
        target = "taograb",
        strategy = seed.describe(),
        "establishing browser session"
    );

    let session = BrowserSession::launch(config, seed).await?;
    let outcome = drive(&session, config, &store, opts).await;
    if let Err(e) = session.close().await {
        warn!(target = "taograb", error = %e, "browser did not close cleanly");
    }
    outcome
}

async fn drive(
    session: &BrowserSession,
    config: &Config,
    store: &SessionStore,
    opts: &RunOptions,
) -> Result<RunSummary> {
    let origin = config.origin()?;

    info!(target = "taograb", url = %config.search_url, "opening search page");
    session.goto(&config.search_url, SEARCH_TIMEOUT_MS).await?;

    let (token, html) = match gate::await_token(session, gate::GATE_WAIT_SECS).await {
        GateDecision::Cleared { token, html } => (token, html),
        GateDecision::Blocked { html } => {
            diagnostics::capture(session, &html).await;
            return Err(GrabError::ChallengeBlocked {
                url: config.search_url.clone(),
                waited_ms: gate::GATE_WAIT_SECS * 1000,
            });
        }
        GateDecision::TokenMissing { html } => {
            diagnostics::capture(session, &html).await;
            return Err(GrabError::TokenNotFound {
                url: config.search_url.clone(),
                waited_ms: gate::GATE_WAIT_SECS * 1000,
            });
        }
    };
    debug!(target = "taograb", %token, "access token extracted");

    let resource_id = match fetch::discover_resource_id(&html) {
        Some(id) => {
            debug!(target = "taograb", %id, "channel list id found in search results");
            id
        }
        None => {
            debug!(
                target = "taograb",
                id = fetch::DEFAULT_RESOURCE_ID,
                "no list id in search results, using the default"
            );
            fetch::DEFAULT_RESOURCE_ID.to_string()
        }
    };

    let body = fetch::fetch(session, &origin, &resource_id, &token).await?;

    let entries = playlist::parse_channels(&body);
    let m3u = playlist::render_m3u(&entries);
    write_atomic(&opts.output, &m3u)?;

    let state = session.storage_state().await?;
    store.save(&state)?;

    info!(
        target = "taograb",
        path = %opts.output.display(),
        channels = entries.len(),
        lines = body.lines().count(),
        "playlist written"
    );

    Ok(RunSummary {
        channels: entries.len(),
        source_lines: body.lines().count(),
    })
}

/// Replaces the output in one step so a reader never sees a half-written
/// playlist and a failed run never truncates the previous one.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
