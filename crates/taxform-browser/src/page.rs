//! [`PageDriver`] over a chromiumoxide [`Page`].
//!
//! Every operation is one `Runtime.evaluate` call. Selectors and values are
//! passed into the script as JSON literals. Actions target the last visible
//! match so that a button repeated across stacked dialogs resolves to the
//! topmost one. Kendo widgets hide the real `input`/`select` behind a
//! wrapper; such an element counts as visible when its wrapper is.

use crate::Error;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use serde::de::DeserializeOwned;
use taxform_core::{PageDriver, Result};

const RESOLVE: &str = r#"
const shown = (node) => {
    const rect = node.getBoundingClientRect();
    const style = window.getComputedStyle(node);
    return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';
};
const widget = (node) => node.closest('.k-widget');
const all = Array.from(document.querySelectorAll(sel));
const visible = all.filter((node) => shown(node) || (widget(node) !== null && shown(widget(node))));
const el = visible.length ? visible[visible.length - 1] : null;
const last = all.length ? all[all.length - 1] : null;
"#;

const REQUIRE_VISIBLE: &str = "if (!el) { return 'no visible element'; }";

const IS_VISIBLE: &str = "return el !== null;";

const SET_TEXT: &str = r#"
el.focus();
el.value = arg;
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
el.blur();
return '';
"#;

const FOCUS_AND_SELECT: &str = r#"
const input = (!shown(el) && widget(el) && widget(el).querySelector('input.k-formatted-value')) || el;
input.scrollIntoView({ block: 'center' });
input.focus();
if (typeof input.select === 'function') { input.select(); }
return document.activeElement === input ? '' : 'could not focus';
"#;

const COMMIT_TYPED: &str = r#"
if (document.activeElement) { document.activeElement.blur(); }
el.dispatchEvent(new Event('change', { bubbles: true }));
return '';
"#;

const SELECT_OPTION: &str = r#"
const options = Array.from(el.options || []);
let value = '';
if (arg !== '') {
    const option = options.find((o) => o.value === arg || o.text.trim() === arg);
    if (!option) { return 'option not found: ' + arg; }
    value = option.value;
}
const kendo = window.jQuery ? window.jQuery(el).data('kendoDropDownList') : null;
if (kendo) {
    kendo.value(value);
    kendo.trigger('change');
} else {
    el.value = value;
    el.dispatchEvent(new Event('change', { bubbles: true }));
}
return '';
"#;

const CHECK: &str = r#"
if (!el.checked) { el.click(); }
return el.checked ? '' : 'still unchecked after click';
"#;

const CLICK: &str = r#"
el.scrollIntoView({ block: 'center' });
el.click();
return '';
"#;

const READ_VALUE: &str = "return last === null ? null : String(last.value ?? '');";

const IS_CHECKED: &str = "return last !== null && last.checked === true;";

/// A tab of the attached Chrome
#[derive(Clone)]
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn target_id(&self) -> String {
        self.page.target_id().inner().clone()
    }

    async fn eval<T: DeserializeOwned>(&self, selector: &str, arg: &str, body: &str) -> Result<T> {
        let script = format!(
            "(function(sel, arg) {{ {} {} }})({}, {})",
            RESOLVE,
            body,
            json_literal(selector),
            json_literal(arg)
        );
        let result = self.page.evaluate(script).await.map_err(Error::from)?;
        let value = result
            .into_value::<T>()
            .map_err(|e| Error::Cdp(format!("unexpected script result for {}: {}", selector, e)))?;
        Ok(value)
    }

    /// Run an action script; a non-empty return value is the reason it failed
    async fn act(&self, selector: &str, arg: &str, body: &str) -> Result<()> {
        let body = format!("{} {}", REQUIRE_VISIBLE, body);
        let failure: String = self.eval(selector, arg, &body).await?;
        if failure.is_empty() {
            Ok(())
        } else {
            Err(taxform_core::Error::Element(format!("{}: {}", selector, failure)))
        }
    }
}

fn json_literal(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn url(&self) -> Result<String> {
        let url = self.page.url().await.map_err(Error::from)?;
        Ok(url.unwrap_or_default())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.eval(selector, "", IS_VISIBLE).await
    }

    async fn set_text(&self, selector: &str, value: &str) -> Result<()> {
        self.act(selector, value, SET_TEXT).await
    }

    async fn type_over(&self, selector: &str, value: &str) -> Result<()> {
        self.act(selector, "", FOCUS_AND_SELECT).await?;
        for ch in value.chars() {
            let params = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::Char)
                .text(ch.to_string())
                .build()
                .map_err(Error::Cdp)?;
            self.page.execute(params).await.map_err(Error::from)?;
        }
        self.act(selector, "", COMMIT_TYPED).await
    }

    async fn select_option(&self, selector: &str, option: &str) -> Result<()> {
        self.act(selector, option, SELECT_OPTION).await
    }

    async fn check(&self, selector: &str) -> Result<()> {
        self.act(selector, "", CHECK).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.act(selector, "", CLICK).await
    }

    async fn read_value(&self, selector: &str) -> Result<Option<String>> {
        self.eval(selector, "", READ_VALUE).await
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        self.eval(selector, "", IS_CHECKED).await
    }
}
