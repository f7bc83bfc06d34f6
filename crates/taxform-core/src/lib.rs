pub mod driver;
pub mod error;
pub mod form;
pub mod interact;
pub mod orchestrator;
pub mod report;
pub mod section;

#[cfg(test)]
mod testing;

pub use driver::{BrowserSession, PageDriver, TabInfo};
pub use error::{Error, Result};
pub use form::{
    FieldKind, FieldValue, FormConfig, FormFieldSpec, FormOverrides, SectionFields, SiteUrls, Timeouts,
};
pub use interact::{ElementHelper, Outcome};
pub use orchestrator::Orchestrator;
pub use report::{FieldCheck, FieldStatus, RunReport, SectionResult, Verification};
pub use section::{Section, SectionName};
