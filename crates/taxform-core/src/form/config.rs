use super::types::{FormFieldSpec, SectionFields};
use crate::section::SectionName;
use crate::{Error, Result};
use regex::Regex;
use std::time::Duration;

/// How long each kind of wait may take
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    /// Container and field waits
    pub element: Duration,
    /// Each fallback selector after the primary one failed
    pub fallback: Duration,
    /// Confirmation dialog after a save or advance click
    pub dialog: Duration,
    /// Info dialog that acknowledges a save
    pub info_dialog: Duration,
    /// Second spelling of the info dialog button ("OK" after "Ok")
    pub info_dialog_retry: Duration,
    /// A newly opened tab showing up in the browser
    pub tab_discovery: Duration,
    /// The user clicking something by hand after automation gave up
    pub manual_action: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(20),
            fallback: Duration::from_secs(5),
            dialog: Duration::from_secs(12),
            info_dialog: Duration::from_secs(10),
            info_dialog_retry: Duration::from_secs(3),
            tab_discovery: Duration::from_secs(15),
            manual_action: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Fixed pages of the filing site
#[derive(Debug, Clone, PartialEq)]
pub struct SiteUrls {
    pub login_url: String,
    pub form_url: String,
    /// Regex matched against tab URLs to recognise the return-filing page
    pub form_tab_pattern: String,
}

impl SiteUrls {
    pub fn form_tab_regex(&self) -> Result<Regex> {
        Regex::new(&self.form_tab_pattern).map_err(|e| {
            Error::Config(format!(
                "invalid tab URL pattern '{}': {}",
                self.form_tab_pattern, e
            ))
        })
    }
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            login_url: "https://eservices.ird.gov.lk/Authentication/LoginPersonal".to_string(),
            form_url: "https://eservices.ird.gov.lk/Assessment/IIT2/ReturnFiling".to_string(),
            form_tab_pattern: r"/Assessment/IIT2/ReturnFiling".to_string(),
        }
    }
}

/// Everything one run needs to know about the form
#[derive(Debug, Clone, PartialEq)]
pub struct FormConfig {
    pub main_return: SectionFields,
    pub schedule_a: SectionFields,
    pub schedule_b: SectionFields,
    pub timeouts: Timeouts,
    pub urls: SiteUrls,
}

impl FormConfig {
    pub fn fields(&self, section: SectionName) -> &SectionFields {
        match section {
            SectionName::MainReturn => &self.main_return,
            SectionName::ScheduleA => &self.schedule_a,
            SectionName::ScheduleB => &self.schedule_b,
        }
    }

    pub(crate) fn fields_mut(&mut self, section: SectionName) -> &mut SectionFields {
        match section {
            SectionName::MainReturn => &mut self.main_return,
            SectionName::ScheduleA => &mut self.schedule_a,
            SectionName::ScheduleB => &mut self.schedule_b,
        }
    }

    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.element = timeout;
        self
    }

    pub fn with_section(mut self, section: SectionName, fields: SectionFields) -> Self {
        *self.fields_mut(section) = fields;
        self
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            main_return: SectionFields::from_defaults(vec![
                FormFieldSpec::choice("Resident_Resident", "Resident"),
                FormFieldSpec::choice("IsSeniorCitizen", "Senior citizen: No"),
            ]),
            schedule_a: SectionFields::from_defaults(vec![
                FormFieldSpec::text("101", "Nature of business", "Consulting services"),
                FormFieldSpec::numeric("102", "Gains and profits", 150_000i64),
                FormFieldSpec::numeric("103", "Total business turnover", 2_000_000i64),
                FormFieldSpec::numeric("104", "Other income", 50_000i64),
                FormFieldSpec::numeric("105", "Deductions", 10_000i64),
            ]),
            schedule_b: SectionFields::from_defaults(vec![
                FormFieldSpec::dropdown(
                    "201",
                    "Activity code",
                    "702000-MANAGEMENT CONSULTANCY ACTIVITIES",
                ),
                FormFieldSpec::text("202", "Nature of business", "Consulting services"),
                FormFieldSpec::numeric("203", "Gains and profits", 150_000i64),
                FormFieldSpec::numeric("204A", "Total business turnover", 2_000_000i64),
            ]),
            timeouts: Timeouts::default(),
            urls: SiteUrls::default(),
        }
    }
}
