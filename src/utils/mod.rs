pub mod build_info;
pub mod persistence;

use std::sync::Once;

use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt, EnvFilter,
};

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber once. `RUST_LOG` replaces the
/// default `xsplittr=info` filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let directive: Directive = "xsplittr=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into());
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(directive));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        tracing::debug!("tracing initialized");
    });
}
