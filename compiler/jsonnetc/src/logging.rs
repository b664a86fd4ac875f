//! Tracing subscriber setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Does nothing unless `RUST_LOG` is set
/// (e.g. `RUST_LOG=jsonnet_eval=debug`); `JSONNET_LOG_TREE=1` switches to
/// indented span trees. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let tree = std::env::var("JSONNET_LOG_TREE").is_ok_and(|value| value == "1");
        let flat = (!tree).then(|| {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
        });
        let nested = tree.then(|| HierarchicalLayer::new(2).with_targets(true));
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(flat)
            .with(nested)
            .init();
    });
}
