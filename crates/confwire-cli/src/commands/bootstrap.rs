//! Bootstrap command
//!
//! Usage: confwire bootstrap [--config <FILE>] [--dotenv]

use clap::Args;
use confwire_core::bootstrap::options::KEY_ACCESS_KEY_SECRET;
use confwire_core::bootstrap::{EnvResolver, SystemProperties};
use confwire_core::errors::{ExError, ExErrorKind};
use confwire_core::types::sensitive::REDACTED;
use confwire_core::ConfwireConfig;

#[derive(Debug, Args)]
pub struct BootstrapArgs {
    /// Load `.env` from the working directory before resolving
    #[arg(long)]
    pub dotenv: bool,
}

/// Execute bootstrap command
///
/// Prints one `key=value` line per system property written, sorted by key.
pub fn execute(
    args: BootstrapArgs,
    config: &ConfwireConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.dotenv {
        dotenvy::dotenv().map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_dotenv")
                .with_message(e.to_string())
        })?;
    }

    let resolved = config.bootstrap.resolve(&EnvResolver);

    let props = SystemProperties::new();
    let written = resolved.apply_to(&props);
    tracing::debug!(written = written.len(), "bootstrap properties applied");

    for (key, value) in props.entries() {
        if key == KEY_ACCESS_KEY_SECRET {
            println!("{}={}", key, REDACTED);
        } else {
            println!("{}={}", key, value);
        }
    }

    Ok(())
}
