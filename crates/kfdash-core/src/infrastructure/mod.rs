pub mod config;
pub mod http_client;
pub mod kubernetes;

pub use config::{
    ConfigLoadError,
    ConfigLoader,
    KfdashConfig,
    KubernetesConfig,
    PipelinesConfig,
    ServerConfig,
};
pub use http_client::create_http_client;
pub use kubernetes::{
    KubeStorageClassStore,
    StorageClassStore,
};
