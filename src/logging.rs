use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Res, error::Error};

/// Installs the process subscriber. Call once, from `main`.
///
/// `level` accepts anything `EnvFilter` understands, e.g. `info` or
/// `playlist_bridge=debug,reqwest=warn`.
pub fn init_tracing(level: &str) -> Res<()> {
    let filter_layer = EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("invalid log level '{level}': {e}")))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(e.to_string()))
}
