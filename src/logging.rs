use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "CALCPAD_LOG";
pub const DEFAULT_DIRECTIVES: &str = "calcpad=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn subscriber(file: File) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter()).with(
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true),
    )
}

/// Install the global subscriber, appending to `path`. Nothing goes to the
/// terminal while the TUI owns it.
pub fn init(path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    subscriber(file).try_init()?;
    Ok(())
}
