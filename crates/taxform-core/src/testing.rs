//! Scripted in-memory browser for unit tests.

use crate::driver::{BrowserSession, PageDriver, TabInfo};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    SetText(String, String),
    TypeOver(String, String),
    Select(String, String),
    Check(String),
    Click(String),
}

impl Op {
    pub fn is_fill(&self) -> bool {
        !matches!(self, Op::Click(_))
    }
}

#[derive(Default)]
struct PageState {
    url: String,
    visible_from: HashMap<String, Instant>,
    values: HashMap<String, String>,
    checked: HashSet<String>,
    options: HashMap<String, Vec<String>>,
    reveals: HashMap<String, Vec<String>>,
    broken: HashSet<String>,
    ops: Vec<Op>,
    disconnected: bool,
}

/// Page whose DOM is a set of selectors. Clones share state.
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(url: &str) -> Self {
        let page = Self::new();
        page.lock().url = url.to_string();
        page
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap()
    }

    pub fn show(&self, selector: &str) {
        self.lock()
            .visible_from
            .insert(selector.to_string(), Instant::now());
    }

    pub fn hide(&self, selector: &str) {
        self.lock().visible_from.remove(selector);
    }

    pub fn show_after(&self, selector: &str, delay: Duration) {
        self.lock()
            .visible_from
            .insert(selector.to_string(), Instant::now() + delay);
    }

    /// Clicking `selector` makes `revealed` visible
    pub fn on_click(&self, selector: &str, revealed: &[&str]) {
        self.lock().reveals.insert(
            selector.to_string(),
            revealed.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn with_options(&self, selector: &str, options: &[&str]) {
        self.lock().options.insert(
            selector.to_string(),
            options.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Visible, but every action on it fails
    pub fn break_element(&self, selector: &str) {
        self.show(selector);
        self.lock().broken.insert(selector.to_string());
    }

    pub fn set_value(&self, selector: &str, value: &str) {
        self.lock()
            .values
            .insert(selector.to_string(), value.to_string());
    }

    pub fn disconnect(&self) {
        self.lock().disconnected = true;
    }

    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.lock().values.get(selector).cloned()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    pub fn fill_ops(&self) -> Vec<Op> {
        self.ops().into_iter().filter(Op::is_fill).collect()
    }

    fn act(&self, selector: &str, op: Op) -> Result<MutexGuard<'_, PageState>> {
        let mut state = self.lock();
        if state.disconnected {
            return Err(Error::Session("connection closed".to_string()));
        }
        if state.broken.contains(selector) || !visible(&state, selector) {
            return Err(Error::Element(format!("no actionable element for {}", selector)));
        }
        state.ops.push(op);
        Ok(state)
    }
}

fn visible(state: &PageState, selector: &str) -> bool {
    state
        .visible_from
        .get(selector)
        .is_some_and(|from| Instant::now() >= *from)
}

#[async_trait]
impl PageDriver for FakePage {
    async fn url(&self) -> Result<String> {
        Ok(self.lock().url.clone())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let state = self.lock();
        if state.disconnected {
            return Err(Error::Session("connection closed".to_string()));
        }
        Ok(visible(&state, selector))
    }

    async fn set_text(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.act(selector, Op::SetText(selector.into(), value.into()))?;
        state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn type_over(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.act(selector, Op::TypeOver(selector.into(), value.into()))?;
        state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn select_option(&self, selector: &str, option: &str) -> Result<()> {
        let mut state = self.act(selector, Op::Select(selector.into(), option.into()))?;
        let known = state
            .options
            .get(selector)
            .is_some_and(|options| options.iter().any(|o| o == option));
        if !known {
            return Err(Error::Element(format!("option '{}' not found", option)));
        }
        state.values.insert(selector.to_string(), option.to_string());
        Ok(())
    }

    async fn check(&self, selector: &str) -> Result<()> {
        let mut state = self.act(selector, Op::Check(selector.into()))?;
        state.checked.insert(selector.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.act(selector, Op::Click(selector.into()))?;
        if let Some(revealed) = state.reveals.get(selector).cloned() {
            let now = Instant::now();
            for selector in revealed {
                state.visible_from.insert(selector, now);
            }
        }
        Ok(())
    }

    async fn read_value(&self, selector: &str) -> Result<Option<String>> {
        let state = self.lock();
        if state.disconnected {
            return Err(Error::Session("connection closed".to_string()));
        }
        Ok(state.values.get(selector).cloned())
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        Ok(self.lock().checked.contains(selector))
    }
}

type TabScript = Box<dyn Fn(&FakePage) + Send + Sync>;

/// Session around a main [`FakePage`]; opened tabs are built by a script
pub struct FakeSession {
    pub main: FakePage,
    tabs: Mutex<Vec<(TabInfo, FakePage)>>,
    opens_tabs: bool,
    tab_script: Option<TabScript>,
    closed: Mutex<Vec<String>>,
}

impl FakeSession {
    pub fn new(main: FakePage) -> Self {
        let tabs = vec![(
            TabInfo {
                id: "main".to_string(),
                url: main.lock().url.clone(),
            },
            main.clone(),
        )];
        Self {
            main,
            tabs: Mutex::new(tabs),
            opens_tabs: true,
            tab_script: None,
            closed: Mutex::new(Vec::new()),
        }
    }

    /// `open_tab` succeeds but no tab ever appears
    pub fn without_new_tabs(mut self) -> Self {
        self.opens_tabs = false;
        self
    }

    /// Prepare the DOM of every newly opened tab
    pub fn with_tab_script(mut self, script: impl Fn(&FakePage) + Send + Sync + 'static) -> Self {
        self.tab_script = Some(Box::new(script));
        self
    }

    pub fn opened_tab(&self) -> Option<FakePage> {
        let tabs = self.tabs.lock().unwrap();
        tabs.iter().skip(1).last().map(|(_, page)| page.clone())
    }

    pub fn closed_tabs(&self) -> Vec<String> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn main_page(&self) -> &dyn PageDriver {
        &self.main
    }

    async fn tabs(&self) -> Result<Vec<TabInfo>> {
        Ok(self
            .tabs
            .lock()
            .unwrap()
            .iter()
            .map(|(info, _)| info.clone())
            .collect())
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        if !self.opens_tabs {
            return Ok(());
        }
        let page = FakePage::at(url);
        if let Some(script) = &self.tab_script {
            script(&page);
        }
        let mut tabs = self.tabs.lock().unwrap();
        let info = TabInfo {
            id: format!("tab-{}", tabs.len()),
            url: url.to_string(),
        };
        tabs.push((info, page));
        Ok(())
    }

    async fn page(&self, id: &str) -> Result<Box<dyn PageDriver>> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|(info, _)| info.id == id)
            .map(|(_, page)| Box::new(page.clone()) as Box<dyn PageDriver>)
            .ok_or_else(|| Error::Session(format!("no tab {}", id)))
    }

    async fn close_tab(&self, id: &str) -> Result<()> {
        self.tabs.lock().unwrap().retain(|(info, _)| info.id != id);
        self.closed.lock().unwrap().push(id.to_string());
        Ok(())
    }
}
