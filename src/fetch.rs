//! Retrieval of the token-gated channel list.

use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::info;

use crate::browser::BrowserSession;
use crate::error::{GrabError, Result};

/// Bound on the follow-up navigation that fetches the list body.
pub const FETCH_TIMEOUT_MS: f64 = 30_000.0;

/// Anything shorter than this is an error page or an empty stub, not a
/// channel list.
pub const MIN_BODY_BYTES: usize = 100;

/// List id used when the search results don't reveal one.
pub const DEFAULT_RESOURCE_ID: &str = "44023";

const PREVIEW_CHARS: usize = 500;

/// Finds the channel-list id in search-result markup (`lives/<id>.txt`).
pub fn discover_resource_id(html: &str) -> Option<String> {
    static ID: OnceLock<Regex> = OnceLock::new();
    let re = ID.get_or_init(|| Regex::new(r"lives/(\d+)\.txt").expect("id pattern is valid"));
    re.captures(html).map(|c| c[1].to_string())
}

pub fn resource_url(origin: &str, resource_id: &str, token: &str) -> String {
    format!("{origin}/lives/{resource_id}.txt?token={token}")
}

/// Navigates to the gated list and returns its raw text. One attempt; a
/// rejected token surfaces as a too-small body, not a retry.
pub async fn fetch(
    session: &BrowserSession,
    origin: &str,
    resource_id: &str,
    token: &str,
) -> Result<String> {
    let url = resource_url(origin, resource_id, token);
    info!(target = "taograb", %url, "fetching channel list");

    session.goto(&url, FETCH_TIMEOUT_MS).await?;
    let body = session.body_text().await?;
    validate_body(&body)?;
    Ok(body)
}

/// Enforces the minimum-size rule, surfacing a truncated preview of what
/// came back for the operator.
pub fn validate_body(body: &str) -> Result<()> {
    if body.len() < MIN_BODY_BYTES {
        return Err(GrabError::ResourceEmpty {
            len: body.len(),
            preview: body.chars().take(PREVIEW_CHARS).collect(),
        });
    }
    Ok(())
}
