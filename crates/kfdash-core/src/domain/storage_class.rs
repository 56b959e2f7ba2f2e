//! Dashboard metadata stored on StorageClass objects.
//!
//! The config lives as a JSON string in an annotation that anyone with
//! cluster access can edit, so parsing never fails as a whole: each field is
//! checked on its own and invalid ones can be reset individually.

use std::collections::BTreeMap;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

pub const CONFIG_ANNOTATION: &str = "opendatahub.io/sc-config";

pub const OPENSHIFT_DEFAULT_ANNOTATION: &str = "storageclass.kubernetes.io/is-default-class";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigField {
    DisplayName,
    Description,
    IsEnabled,
    IsDefault,
    LastModified,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::DisplayName,
        ConfigField::Description,
        ConfigField::IsEnabled,
        ConfigField::IsDefault,
        ConfigField::LastModified,
    ];

    /// Key used inside the annotation JSON
    pub fn key(&self) -> &'static str {
        match self {
            ConfigField::DisplayName => "displayName",
            ConfigField::Description => "description",
            ConfigField::IsEnabled => "isEnabled",
            ConfigField::IsDefault => "isDefault",
            ConfigField::LastModified => "lastModified",
        }
    }
}

impl std::str::FromStr for ConfigField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "displayName" | "display_name" => Ok(Self::DisplayName),
            "description" => Ok(Self::Description),
            "isEnabled" | "is_enabled" => Ok(Self::IsEnabled),
            "isDefault" | "is_default" => Ok(Self::IsDefault),
            "lastModified" | "last_modified" => Ok(Self::LastModified),
            _ => Err(format!(
                "Unknown storage class config field: {}. Valid options: displayName, description, isEnabled, isDefault, lastModified",
                s
            )),
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldValue<T> {
    Valid(T),
    Invalid(Value),
    Missing,
}

impl<T> FieldValue<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            FieldValue::Valid(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldValue::Invalid(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

fn read_field<T>(
    raw: &Map<String, Value>, field: ConfigField, convert: impl Fn(&Value) -> Option<T>,
) -> FieldValue<T> {
    match raw.get(field.key()) {
        None => FieldValue::Missing,
        Some(value) => match convert(value) {
            Some(parsed) => FieldValue::Valid(parsed),
            None => FieldValue::Invalid(value.clone()),
        },
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// A field-by-field view of a readable annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassConfig {
    pub display_name: FieldValue<String>,
    pub description: FieldValue<String>,
    pub is_enabled: FieldValue<bool>,
    pub is_default: FieldValue<bool>,
    pub last_modified: FieldValue<DateTime<Utc>>,
    #[serde(skip)]
    raw: Map<String, Value>,
}

impl StorageClassConfig {
    pub fn from_object(raw: Map<String, Value>) -> Self {
        Self {
            display_name: read_field(&raw, ConfigField::DisplayName, as_string),
            description: read_field(&raw, ConfigField::Description, as_string),
            is_enabled: read_field(&raw, ConfigField::IsEnabled, Value::as_bool),
            is_default: read_field(&raw, ConfigField::IsDefault, Value::as_bool),
            last_modified: read_field(&raw, ConfigField::LastModified, as_timestamp),
            raw,
        }
    }

    fn is_corrupted(&self, field: ConfigField) -> bool {
        match field {
            ConfigField::DisplayName => !matches!(self.display_name, FieldValue::Valid(_)),
            // description is optional, only a wrong type counts
            ConfigField::Description => self.description.is_invalid(),
            ConfigField::IsEnabled => !matches!(self.is_enabled, FieldValue::Valid(_)),
            ConfigField::IsDefault => !matches!(self.is_default, FieldValue::Valid(_)),
            ConfigField::LastModified => !matches!(self.last_modified, FieldValue::Valid(_)),
        }
    }

    pub fn corrupted_fields(&self) -> Vec<ConfigField> {
        ConfigField::ALL
            .into_iter()
            .filter(|field| self.is_corrupted(*field))
            .collect()
    }

    /// Replaces one field with its default, leaving every other key in the
    /// stored JSON untouched.
    pub fn reset_field(&mut self, field: ConfigField, defaults: &StorageClassConfigValues) {
        self.assign(field, defaults);
    }

    /// Overwrites one field with the matching value from `values`
    pub fn assign(&mut self, field: ConfigField, values: &StorageClassConfigValues) {
        let value = match field {
            ConfigField::DisplayName => Value::String(values.display_name.clone()),
            ConfigField::Description => Value::String(values.description.clone()),
            ConfigField::IsEnabled => Value::Bool(values.is_enabled),
            ConfigField::IsDefault => Value::Bool(values.is_default),
            ConfigField::LastModified => Value::String(format_timestamp(&values.last_modified)),
        };

        let mut raw = std::mem::take(&mut self.raw);
        raw.insert(field.key().to_string(), value);
        *self = Self::from_object(raw);
    }

    /// Annotation JSON for this config, invalid values included
    pub fn to_annotation(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }

    /// Valid fields kept as they are, everything else taken from `defaults`
    pub fn repaired(&self, defaults: &StorageClassConfigValues) -> StorageClassConfigValues {
        StorageClassConfigValues {
            display_name: self
                .display_name
                .valid()
                .cloned()
                .unwrap_or_else(|| defaults.display_name.clone()),
            description: self
                .description
                .valid()
                .cloned()
                .unwrap_or_else(|| defaults.description.clone()),
            is_enabled: self.is_enabled.valid().copied().unwrap_or(defaults.is_enabled),
            is_default: self.is_default.valid().copied().unwrap_or(defaults.is_default),
            last_modified: self
                .last_modified
                .valid()
                .copied()
                .unwrap_or(defaults.last_modified),
        }
    }
}

/// A fully valid config, the shape every write produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassConfigValues {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub is_enabled: bool,
    pub is_default: bool,
    #[serde(with = "timestamp")]
    pub last_modified: DateTime<Utc>,
}

impl StorageClassConfigValues {
    /// Values a class gets when its metadata is missing or reset.
    /// The cluster's own default class starts enabled and selected.
    pub fn defaults(
        storage_class_name: &str, openshift_default: bool, now: DateTime<Utc>,
    ) -> Self {
        Self {
            display_name: storage_class_name.to_string(),
            description: String::new(),
            is_enabled: openshift_default,
            is_default: openshift_default,
            last_modified: now,
        }
    }

    pub fn to_annotation(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

mod timestamp {
    use chrono::{
        DateTime,
        Utc,
    };
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };

    pub fn serialize<S: Serializer>(
        dt: &DateTime<Utc>, serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Result of reading the annotation off a storage class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParsedConfig {
    /// No annotation yet
    Absent,
    /// Annotation present but not a JSON object
    Unreadable { raw: String },
    Parsed(StorageClassConfig),
}

impl ParsedConfig {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ParsedConfig::Absent;
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => ParsedConfig::Parsed(StorageClassConfig::from_object(map)),
            _ => ParsedConfig::Unreadable {
                raw: raw.to_string(),
            },
        }
    }

    pub fn corrupted_fields(&self) -> Vec<ConfigField> {
        match self {
            ParsedConfig::Absent => Vec::new(),
            ParsedConfig::Unreadable { .. } => ConfigField::ALL.to_vec(),
            ParsedConfig::Parsed(config) => config.corrupted_fields(),
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, ParsedConfig::Unreadable { .. })
    }

    pub fn repaired(&self, defaults: &StorageClassConfigValues) -> StorageClassConfigValues {
        match self {
            ParsedConfig::Parsed(config) => config.repaired(defaults),
            _ => defaults.clone(),
        }
    }

    /// Whether the class is currently the dashboard default
    pub fn is_default(&self) -> bool {
        match self {
            ParsedConfig::Parsed(config) => config.is_default.valid().copied().unwrap_or(false),
            _ => false,
        }
    }
}

/// A storage class as read from the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageClassRecord {
    pub name: String,
    pub provisioner: String,
    pub annotations: BTreeMap<String, String>,
}

impl StorageClassRecord {
    pub fn is_openshift_default(&self) -> bool {
        self.annotations
            .get(OPENSHIFT_DEFAULT_ANNOTATION)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn config(&self) -> ParsedConfig {
        ParsedConfig::parse(self.annotations.get(CONFIG_ANNOTATION).map(String::as_str))
    }

    pub fn defaults(&self, now: DateTime<Utc>) -> StorageClassConfigValues {
        StorageClassConfigValues::defaults(&self.name, self.is_openshift_default(), now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassSummary {
    pub name: String,
    pub provisioner: String,
    pub openshift_default: bool,
    pub config: ParsedConfig,
    pub corrupted_fields: Vec<ConfigField>,
}

impl From<&StorageClassRecord> for StorageClassSummary {
    fn from(record: &StorageClassRecord) -> Self {
        let config = record.config();
        Self {
            name: record.name.clone(),
            provisioner: record.provisioner.clone(),
            openshift_default: record.is_openshift_default(),
            corrupted_fields: config.corrupted_fields(),
            config,
        }
    }
}
