//! The challenge-gate decision: one bounded wait over the navigated search
//! page that ends in exactly one of `Cleared`, `Blocked` or `TokenMissing`.

use std::sync::OnceLock;
use std::time::Duration;

use regex_lite::Regex;
use tokio::time::sleep;
use tracing::debug;

use crate::browser::BrowserSession;

/// How long the gate may stay shut before the run gives up.
pub const GATE_WAIT_SECS: u64 = 30;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Markup fingerprints of an active Cloudflare interstitial.
const CHALLENGE_MARKERS: &[&str] = &[
    "challenge-platform",
    "cf-chl",
    "cdn-cgi/challenge",
    "Just a moment",
];

/// Terminal outcome of the gate wait. `Cleared` carries the page snapshot
/// the token was found in so later steps can mine it without re-reading;
/// the failure states carry the last snapshot for diagnostics.
pub enum GateDecision {
    Cleared { token: String, html: String },
    Blocked { html: String },
    TokenMissing { html: String },
}

/// Polls the page once a second until the token element renders or the
/// window closes. Read errors during a poll count as "not yet" rather than
/// aborting; the challenge page swaps documents underneath us. Blocked vs
/// missing is only decided after the window expires, so an interstitial
/// that clears itself still yields `Cleared`.
pub async fn await_token(session: &BrowserSession, wait_secs: u64) -> GateDecision {
    let mut html = String::new();
    for attempt in 0..wait_secs {
        // A failed read mid-challenge means the document is being swapped;
        // keep the previous snapshot rather than losing it.
        if let Ok(current) = session.content().await {
            html = current;
        }
        if let Some(token) = extract_token(&html) {
            debug!(target = "taograb", attempt, "token element present");
            return GateDecision::Cleared { token, html };
        }
        sleep(POLL_INTERVAL).await;
    }

    if is_challenge_markup(&html) {
        GateDecision::Blocked { html }
    } else {
        GateDecision::TokenMissing { html }
    }
}

/// Pulls the access token out of the clipboard button's data attribute.
/// The token is always 16 lowercase hex characters; anything else is
/// treated as absent.
pub fn extract_token(html: &str) -> Option<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN.get_or_init(|| {
        Regex::new(r#"data-clipboard-text="([a-f0-9]{16})""#).expect("token pattern is valid")
    });
    re.captures(html).map(|c| c[1].to_string())
}

pub fn is_challenge_markup(html: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| html.contains(marker))
}
