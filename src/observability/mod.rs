//! Tracing helpers for pipeline requests.
//!
//! The crate only emits `tracing` events and spans. Applications install
//! their own subscriber, or enable the `subscriber` feature and call
//! `init_tracing`:
//!
//! ```toml
//! azure-pipeline = { version = "0.1", features = ["subscriber"] }
//! ```

mod spans;

pub use spans::RequestSpan;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Fails if a global
/// subscriber is already installed.
#[cfg(feature = "subscriber")]
#[cfg_attr(docsrs, doc(cfg(feature = "subscriber")))]
pub fn init_tracing(default_filter: &str) -> crate::Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| crate::Error::Config(format!("Failed to init subscriber: {}", e)))
}
