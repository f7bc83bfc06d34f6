//! Capability traits over a live browser.
//!
//! Every method is a single attempt against the current DOM: nothing here
//! waits for an element to appear. Waiting lives in [`crate::ElementHelper`].
//!
//! Element-level failures (no matching element, missing option) are reported
//! as [`crate::Error::Element`]; anything else means the session is unusable.

use crate::Result;
use async_trait::async_trait;

/// One tab of the browser
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Current URL of the tab
    async fn url(&self) -> Result<String>;

    /// Whether at least one element matching `selector` is rendered and visible
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Assign `value` to the last visible match and fire input/change events
    async fn set_text(&self, selector: &str, value: &str) -> Result<()>;

    /// Focus the last visible match, select its content and type `value` over it
    async fn type_over(&self, selector: &str, value: &str) -> Result<()>;

    /// Pick the option whose value or label equals `option`
    async fn select_option(&self, selector: &str, option: &str) -> Result<()>;

    /// Check a radio button or checkbox
    async fn check(&self, selector: &str) -> Result<()>;

    /// Scroll the last visible match into view and click it
    async fn click(&self, selector: &str) -> Result<()>;

    /// Read back the `value` of the last match; `None` when nothing matches
    async fn read_value(&self, selector: &str) -> Result<Option<String>>;

    /// Whether the last match is a checked input; `false` when nothing matches
    async fn is_checked(&self, selector: &str) -> Result<bool>;
}

/// A tab as listed by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: String,
    pub url: String,
}

/// Handle on a browser that somebody else launched and logged in.
///
/// Automators only borrow it; they may open and close tabs of their own but
/// never close the browser or the main page.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// The tab the form is filled in
    fn main_page(&self) -> &dyn PageDriver;

    async fn tabs(&self) -> Result<Vec<TabInfo>>;

    /// Ask the browser to open `url` in a new tab
    async fn open_tab(&self, url: &str) -> Result<()>;

    /// Driver for the tab with the given id
    async fn page(&self, id: &str) -> Result<Box<dyn PageDriver>>;

    async fn close_tab(&self, id: &str) -> Result<()>;
}
