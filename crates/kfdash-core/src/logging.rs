use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const DEFAULT_LOG_FILTER: &str =
    "kfdash=info,kfdash_core=info,kfdash_kfp=info,kfdash_web=info,tower_http=info";

pub fn init() {
    init_with_default(DEFAULT_LOG_FILTER);
}

/// `RUST_LOG` wins over `default_filter` when set
pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .init();
}
