//! hrw4u command line
//!
//! The `hrw4u` (forward) and `u4wrh` (reverse) binaries share one argument
//! model and one driver; only the translation direction differs.

pub mod cli;
pub mod driver;

pub use cli::{Cli, Jobs};
pub use driver::{run, Options, Translated, SEPARATOR};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr logger
///
/// `--debug` forces the `debug` level; otherwise `RUST_LOG` applies with a
/// `warn` default.
pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
