pub mod error;
pub mod storage_class;

pub use error::{
    DomainError,
    DomainResult,
};
pub use storage_class::{
    ConfigField,
    FieldValue,
    ParsedConfig,
    StorageClassConfig,
    StorageClassConfigValues,
    StorageClassRecord,
    StorageClassSummary,
};
