//! Form data: what each section types into the page.
//!
//! A [`FormConfig`] is built once per run, from the compiled-in defaults and
//! an optional JSON overlay, and is never mutated afterwards.

mod config;
mod overrides;
mod types;

pub use config::{FormConfig, SiteUrls, Timeouts};
pub use overrides::FormOverrides;
pub use types::{FieldKind, FieldValue, FormFieldSpec, SectionFields};
