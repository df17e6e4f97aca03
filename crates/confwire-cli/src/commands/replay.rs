//! Replay command
//!
//! Usage: confwire replay --input <FILE>
//!
//! The input is a JSON document describing sources and a sequence of steps:
//!
//! ```json
//! {
//!   "sources": { "application": { "timeout": 30 } },
//!   "steps": [
//!     {
//!       "source": "application",
//!       "set": { "timeout": 45 },
//!       "remove": [],
//!       "batch": [ { "key": "timeout", "kind": "MODIFIED", "new_value": 45 } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Each step first mutates the source, then delivers its batch. Every
//! published event is written to stdout as one JSON line.

use clap::Args;
use confwire_core::bootstrap::EnvResolver;
use confwire_core::errors::{ConfwireError, ExError, ExErrorKind};
use confwire_core::{
    bind_sources, AggregatedChangeEvent, BoundSource, ChangeBatch, ChangePublisher,
    ConfwireConfig, FnSink, MapAccessor,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Replay document (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayDocument {
    #[serde(default)]
    sources: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayStep {
    source: String,
    #[serde(default)]
    set: BTreeMap<String, Value>,
    #[serde(default)]
    remove: Vec<String>,
    #[serde(default)]
    batch: ChangeBatch,
}

/// Execute replay command
pub fn execute(
    args: ReplayArgs,
    config: &ConfwireConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.input).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("replay")
            .with_message(format!("{}: {}", args.input.display(), e))
    })?;
    let document: ReplayDocument = serde_json::from_str(&text)
        .map_err(|e| ExError::from(ConfwireError::from(e)).with_op("replay"))?;

    let resolved = config.bootstrap.resolve(&EnvResolver);

    let publisher = ChangePublisher::with_options(
        Arc::new(FnSink::new(print_event)),
        config.publisher.clone(),
    );

    let accessors: BTreeMap<String, Arc<MapAccessor>> = document
        .sources
        .into_iter()
        .map(|(name, properties)| (name, Arc::new(MapAccessor::from_pairs(properties))))
        .collect();
    let bound: Vec<BoundSource> = accessors
        .iter()
        .map(|(name, accessor)| BoundSource::new(name.clone(), resolved.order, accessor.clone()))
        .collect();
    bind_sources(&publisher, &resolved, &bound).map_err(ExError::from)?;

    for (index, step) in document.steps.into_iter().enumerate() {
        if let Some(accessor) = accessors.get(&step.source) {
            for (key, value) in step.set {
                accessor.set(key, value);
            }
            for key in &step.remove {
                accessor.remove(key);
            }
        }

        publisher
            .on_batch(&step.source, &step.batch)
            .map_err(|e| {
                let ex_err = ExError::from(e);
                let message = format!("step {}: {}", index, ex_err.message());
                ex_err.with_message(message)
            })?;
    }

    Ok(())
}

fn print_event(event: AggregatedChangeEvent) -> confwire_core::Result<()> {
    let line = serde_json::to_string(&event)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)
        .map_err(|e| ConfwireError::sink(event.source_name.as_str(), e.to_string()))
}
