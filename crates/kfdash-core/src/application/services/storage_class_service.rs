use std::sync::Arc;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::domain::{
    ConfigField,
    DomainError,
    DomainResult,
    ParsedConfig,
    StorageClassConfigValues,
    StorageClassRecord,
    StorageClassSummary,
};
use crate::infrastructure::kubernetes::StorageClassStore;

/// Partial edit of a storage class config; unset fields keep their value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
}

pub struct StorageClassService {
    store: Arc<dyn StorageClassStore>,
}

impl StorageClassService {
    pub fn new(store: Arc<dyn StorageClassStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> DomainResult<Vec<StorageClassSummary>> {
        let records = self.store.list().await?;
        let summaries: Vec<StorageClassSummary> =
            records.iter().map(StorageClassSummary::from).collect();

        let corrupted = summaries
            .iter()
            .filter(|s| !s.corrupted_fields.is_empty())
            .count();
        if corrupted > 0 {
            tracing::debug!(corrupted, "Storage classes with corrupted config");
        }

        Ok(summaries)
    }

    /// Applies `update` on top of the repaired config and writes the result
    pub async fn update(
        &self, name: &str, update: StorageClassUpdate,
    ) -> DomainResult<StorageClassConfigValues> {
        let record = self.store.get(name).await?;
        let now = Utc::now();
        let mut values = record.config().repaired(&record.defaults(now));

        if let Some(display_name) = update.display_name {
            let display_name = display_name.trim();
            if display_name.is_empty() {
                return Err(DomainError::InvalidConfig(
                    "Display name cannot be empty".to_string(),
                ));
            }
            values.display_name = display_name.to_string();
        }
        if let Some(description) = update.description {
            values.description = description;
        }
        if let Some(is_enabled) = update.is_enabled {
            if !is_enabled && values.is_default {
                return Err(DomainError::InvalidConfig(format!(
                    "Storage class {} is the default and cannot be disabled",
                    name
                )));
            }
            values.is_enabled = is_enabled;
        }
        values.last_modified = now;

        self.store.write_config(name, &values.to_annotation()?).await?;
        Ok(values)
    }

    /// Resets a single field, keeping every other stored value as it is.
    /// A config that cannot be read field by field is replaced with defaults.
    pub async fn reset_field(
        &self, name: &str, field: ConfigField,
    ) -> DomainResult<ParsedConfig> {
        let record = self.store.get(name).await?;
        let defaults = record.defaults(Utc::now());

        let annotation = match record.config() {
            ParsedConfig::Parsed(mut config) => {
                config.reset_field(field, &defaults);
                config.to_annotation()
            }
            ParsedConfig::Absent | ParsedConfig::Unreadable { .. } => defaults.to_annotation()?,
        };

        self.store.write_config(name, &annotation).await?;
        tracing::info!(storage_class = %name, field = %field, "Reset storage class config field");

        Ok(ParsedConfig::parse(Some(annotation.as_str())))
    }

    /// Makes `name` the dashboard default, clearing the flag everywhere else
    pub async fn set_default(&self, name: &str) -> DomainResult<StorageClassConfigValues> {
        let records = self.store.list().await?;
        let target = records
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| DomainError::NotFound(format!("Storage class {} not found", name)))?;
        let now = Utc::now();

        // target first: a failure part way leaves two defaults, never none
        let mut values = target.config().repaired(&target.defaults(now));
        values.is_default = true;
        values.is_enabled = true;
        values.last_modified = now;
        self.store.write_config(name, &values.to_annotation()?).await?;

        for other in records.iter().filter(|r| r.name != name) {
            if let Some(annotation) = cleared_default(other, now) {
                self.store.write_config(&other.name, &annotation).await?;
                tracing::debug!(storage_class = %other.name, "Cleared default flag");
            }
        }

        tracing::info!(storage_class = %name, "Set default storage class");

        Ok(values)
    }
}

/// Annotation with `isDefault` switched off, or `None` when the class is
/// not currently flagged as default
fn cleared_default(record: &StorageClassRecord, now: DateTime<Utc>) -> Option<String> {
    let ParsedConfig::Parsed(mut config) = record.config() else {
        return None;
    };
    if config.is_default.valid() != Some(&true) {
        return None;
    }

    let mut values = record.defaults(now);
    values.is_default = false;
    config.assign(ConfigField::IsDefault, &values);
    config.assign(ConfigField::LastModified, &values);
    Some(config.to_annotation())
}
