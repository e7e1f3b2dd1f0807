pub mod config;
pub mod error;
pub mod handlers;
pub mod image_utils;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod provider_trait;
pub mod providers;
pub mod schema;
pub mod server;
pub mod signals;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `default_level`. With `json` set, events
/// are written as one JSON object per line.
///
/// Note: This function can only be called once.
pub fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
