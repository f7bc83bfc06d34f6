use crate::page::CdpPage;
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use regex::Regex;
use std::time::Duration;
use taxform_core::{BrowserSession, PageDriver, TabInfo};
use tokio::task::JoinHandle;

const CONNECT_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Attachment to a Chrome started with `--remote-debugging-port`.
///
/// The browser belongs to the user: dropping the session detaches from it
/// and never closes the browser or its tabs.
pub struct CdpSession {
    browser: Browser,
    main: CdpPage,
    handler_task: JoinHandle<()>,
}

impl CdpSession {
    /// Connect to Chrome on `port` and pick the tab showing the return.
    ///
    /// The main tab is the first one whose URL matches `form_pattern`,
    /// falling back to the first open tab.
    pub async fn connect(port: u16, form_pattern: &Regex) -> Result<Self> {
        tracing::info!("CDP session: connecting to Chrome on port {}", port);

        // Chrome may still be starting when we get here
        let url = format!("http://localhost:{}", port);
        let (mut browser, mut handler) = {
            let mut retries = CONNECT_ATTEMPTS;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", url);
                match Browser::connect(&url).await {
                    Ok(result) => {
                        tracing::info!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome on port {} after {} attempts: {}. \
                                 Start it with `taxform login` first.",
                                port, CONNECT_ATTEMPTS, e
                            )));
                        }
                        tracing::info!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        };

        // Nothing on the browser handle works unless the handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        browser.fetch_targets().await?;
        tokio::time::sleep(RETRY_DELAY).await;

        let main = match Self::find_main(&browser, form_pattern).await? {
            Some(page) => page,
            None => {
                tracing::info!("CDP: No open tabs, creating one");
                browser.new_page("about:blank").await?
            }
        };
        tracing::info!(
            "CDP session: main tab is {}",
            main.url().await?.unwrap_or_default()
        );
        let main = CdpPage::new(main);

        Ok(Self {
            browser,
            main,
            handler_task,
        })
    }

    async fn find_main(browser: &Browser, form_pattern: &Regex) -> Result<Option<Page>> {
        let pages = browser.pages().await?;
        for page in &pages {
            let url = page.url().await?.unwrap_or_default();
            if form_pattern.is_match(&url) {
                tracing::debug!("CDP: Using return tab {}", url);
                return Ok(Some(page.clone()));
            }
        }
        if !pages.is_empty() {
            tracing::warn!("No tab shows the return yet, using the first tab");
        }
        Ok(pages.into_iter().next())
    }

    pub fn main(&self) -> &CdpPage {
        &self.main
    }

    async fn find_page(&self, id: &str) -> Result<Page> {
        let pages = self.browser.pages().await?;
        pages
            .into_iter()
            .find(|page| page.target_id().inner() == id)
            .ok_or_else(|| Error::Browser(format!("no tab with id {}", id)))
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    fn main_page(&self) -> &dyn PageDriver {
        &self.main
    }

    async fn tabs(&self) -> taxform_core::Result<Vec<TabInfo>> {
        let pages = self.browser.pages().await.map_err(Error::from)?;
        let mut tabs = Vec::with_capacity(pages.len());
        for page in pages {
            let url = page.url().await.map_err(Error::from)?.unwrap_or_default();
            tabs.push(TabInfo {
                id: page.target_id().inner().clone(),
                url,
            });
        }
        Ok(tabs)
    }

    async fn open_tab(&self, url: &str) -> taxform_core::Result<()> {
        tracing::debug!("Opening new tab at {}", url);
        self.browser.new_page(url).await.map_err(Error::from)?;
        Ok(())
    }

    async fn page(&self, id: &str) -> taxform_core::Result<Box<dyn PageDriver>> {
        let page = self.find_page(id).await?;
        Ok(Box::new(CdpPage::new(page)))
    }

    async fn close_tab(&self, id: &str) -> taxform_core::Result<()> {
        if id == self.main.target_id() {
            return Err(Error::Browser("refusing to close the main tab".to_string()).into());
        }
        let page = self.find_page(id).await?;
        page.close().await.map_err(Error::from)?;
        tracing::debug!("Closed tab {}", id);
        Ok(())
    }
}
