use pw::{BrowserContextOptions, GotoOptions, Playwright, StorageState, WaitUntil};
use tracing::debug;

use crate::config::Config;
use crate::error::{GrabError, Result};
use crate::store::SessionSeedStrategy;

/// Desktop Chrome user agent presented to the site; the stock headless one
/// trips the bot mitigation immediately.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

/// One headless browsing session: the single page every pipeline step
/// navigates and reads. Owns the whole Playwright stack for the run.
pub struct BrowserSession {
    _playwright: Playwright,
    browser: pw::protocol::Browser,
    context: pw::protocol::BrowserContext,
    page: pw::protocol::Page,
}

impl BrowserSession {
    /// Launches headless chromium and builds the context from the selected
    /// seed: a persisted storage state restores the whole blob, credential
    /// seeds inject cookies into an otherwise fresh context, and `None`
    /// starts unauthenticated.
    pub async fn launch(config: &Config, seed: SessionSeedStrategy) -> Result<Self> {
        debug!(target = "taograb", "starting Playwright...");
        let playwright = Playwright::launch()
            .await
            .map_err(|e| GrabError::BrowserLaunch(e.to_string()))?;

        let launch_options = pw::LaunchOptions {
            headless: Some(true),
            proxy: config.proxy(),
            ..Default::default()
        };

        let browser = playwright
            .chromium()
            .launch_with_options(launch_options)
            .await?;

        let mut options = BrowserContextOptions::builder().user_agent(USER_AGENT.to_string());
        let seed_cookies = match seed {
            SessionSeedStrategy::Persisted(state) => {
                options = options.storage_state(state);
                Vec::new()
            }
            other => other.seed_cookies(&config.cookie_domain()?),
        };

        let context = browser.new_context_with_options(options.build()).await?;
        if !seed_cookies.is_empty() {
            debug!(target = "taograb", count = seed_cookies.len(), "seeding cookies");
            context.add_cookies(seed_cookies).await?;
        }

        let page = context.new_page().await?;

        Ok(Self {
            _playwright: playwright,
            browser,
            context,
            page,
        })
    }

    /// Navigates the page, bounded by `timeout_ms`. A timeout or network
    /// failure here is fatal to the run.
    pub async fn goto(&self, url: &str, timeout_ms: f64) -> Result<()> {
        let goto_opts = GotoOptions {
            wait_until: Some(WaitUntil::DomContentLoaded),
            timeout: Some(timeout_ms),
            ..Default::default()
        };

        self.page
            .goto(url, Some(goto_opts))
            .await
            .map(|_| ())
            .map_err(|e| GrabError::Navigation {
                url: url.to_string(),
                source: anyhow::Error::new(e),
            })
    }

    /// Rendered markup of the current document.
    pub async fn content(&self) -> Result<String> {
        let locator = self.page.locator("html").await;
        Ok(locator.inner_html().await?)
    }

    /// Visible text of the current document body. Used to read plain-text
    /// responses the browser wraps in a viewer document.
    pub async fn body_text(&self) -> Result<String> {
        let raw = self
            .page
            .evaluate_value("JSON.stringify(document.body.innerText)")
            .await?;
        Ok(serde_json::from_str::<String>(&raw).unwrap_or(raw))
    }

    pub fn page(&self) -> &pw::protocol::Page {
        &self.page
    }

    pub async fn storage_state(&self) -> Result<StorageState> {
        Ok(self.context.storage_state(None).await?)
    }

    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
