mod client;
mod config;
mod fetchers;
mod types;

pub use client::KfpClient;
pub use config::KfpSettings;
pub use fetchers::{
    PipelineVersionsFetcher,
    PipelinesFetcher,
    RecurringRunsFetcher,
    RunsFetcher,
};
