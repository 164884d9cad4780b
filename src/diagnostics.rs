//! Best-effort failure snapshots for operator inspection. Capture failures
//! are logged and swallowed; diagnostics never change the run's outcome.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::browser::BrowserSession;

pub const SCREENSHOT_PATH: &str = "error.png";
pub const HTML_DUMP_PATH: &str = "error.html";

/// Writes a page screenshot and the last rendered markup next to the
/// working directory so a blocked gate can be inspected after the fact.
pub async fn capture(session: &BrowserSession, html: &str) {
    match session
        .page()
        .screenshot_to_file(Path::new(SCREENSHOT_PATH), None)
        .await
    {
        Ok(_) => info!(target = "taograb", path = SCREENSHOT_PATH, "saved failure screenshot"),
        Err(e) => warn!(target = "taograb", error = %e, "could not capture screenshot"),
    }

    if html.is_empty() {
        return;
    }
    match fs::write(HTML_DUMP_PATH, html) {
        Ok(()) => info!(target = "taograb", path = HTML_DUMP_PATH, "saved page markup"),
        Err(e) => warn!(target = "taograb", error = %e, "could not dump page markup"),
    }
}
