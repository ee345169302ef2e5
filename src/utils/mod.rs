pub mod backups;
pub mod build_info;
pub mod paths;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber; `RUST_LOG` directives extend the default filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "nexus_finance=info".parse() {
            filter = filter.add_directive(directive);
        }

        // A subscriber may already be installed by an embedding application.
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
