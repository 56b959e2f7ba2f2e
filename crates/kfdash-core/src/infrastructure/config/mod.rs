pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validation;

pub use interpolation::{
    interpolate,
    InterpolationError,
};
pub use loader::{
    ConfigLoadError,
    ConfigLoadResult,
    ConfigLoader,
};
pub use schema::{
    KfdashConfig,
    KubernetesConfig,
    PipelinesConfig,
    ServerConfig,
};
pub use validation::ValidationResult;
