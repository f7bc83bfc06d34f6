use super::config::FormConfig;
use super::types::FieldValue;
use crate::section::SectionName;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Field values to overlay on a [`FormConfig`] before a run.
///
/// JSON shape: `{ "schedule_a": { "101": "Trading", "102": 200000 } }`.
/// Field ids keep the order they have in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormOverrides {
    sections: BTreeMap<SectionName, Vec<(String, FieldValue)>>,
}

impl FormOverrides {
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading form data from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        // serde_json's preserve_order keeps object keys in file order
        let raw: Map<String, Value> = serde_json::from_str(content)?;

        let mut sections = BTreeMap::new();
        for (key, values) in raw {
            let section: SectionName = key
                .parse()
                .map_err(|_| Error::Config(format!("unknown section '{}' in form data", key)))?;
            let values: Map<String, Value> = serde_json::from_value(values)?;
            let values = values
                .into_iter()
                .map(|(id, value)| Ok((id, serde_json::from_value(value)?)))
                .collect::<Result<Vec<(String, FieldValue)>>>()?;
            sections.insert(section, values);
        }

        Ok(Self { sections })
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(|values| values.is_empty())
    }

    /// Number of field values carried, across all sections
    pub fn len(&self) -> usize {
        self.sections.values().map(|values| values.len()).sum()
    }
}

impl FormConfig {
    /// New configuration with `overrides` applied; `self` is left as it was
    pub fn with_overrides(&self, overrides: &FormOverrides) -> FormConfig {
        let mut config = self.clone();
        for (section, values) in &overrides.sections {
            for (id, value) in values {
                let updated = config.fields(*section).with_value(id, value.clone());
                *config.fields_mut(*section) = updated;
            }
            tracing::info!(
                "Form data updated for {}: {} field(s)",
                section,
                values.len()
            );
        }
        config
    }
}
