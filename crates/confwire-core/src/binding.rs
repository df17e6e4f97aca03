//! Binding config-center sources to a publisher.
//!
//! The config-center client exposes its namespaces as a composite of
//! property sources. Binding walks that composite once at startup and
//! registers every source with the publisher, unless auto refresh is off.

use std::sync::Arc;
use std::time::Instant;

use crate::accessor::PropertyAccessor;
use crate::bootstrap::ResolvedBootstrap;
use crate::errors::Result;
use crate::publisher::ChangePublisher;
use crate::{log_op_end, log_op_start};

/// One source of the composite: its name, its precedence and its accessor.
#[derive(Clone)]
pub struct BoundSource {
    pub name: String,
    pub order: i32,
    pub accessor: Arc<dyn PropertyAccessor>,
}

impl BoundSource {
    pub fn new(name: impl Into<String>, order: i32, accessor: Arc<dyn PropertyAccessor>) -> Self {
        Self {
            name: name.into(),
            order,
            accessor,
        }
    }
}

/// What a bind call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Sources newly registered by this call.
    pub registered: Vec<String>,
    /// Sources left alone: already registered, or auto refresh disabled.
    pub skipped: Vec<String>,
}

/// Register every source in `sources` with `publisher`.
///
/// Sources are visited by ascending `order`, then by name. With auto
/// refresh disabled nothing is registered and every source is reported as
/// skipped. An empty composite is logged as a warning and is not an error.
///
/// # Errors
///
/// Stops at the first source whose initial snapshot cannot be read and
/// returns that error; sources registered before it stay registered.
pub fn bind_sources(
    publisher: &ChangePublisher,
    bootstrap: &ResolvedBootstrap,
    sources: &[BoundSource],
) -> Result<BindReport> {
    let start = Instant::now();
    log_op_start!("bind_sources", sources = sources.len());

    let mut report = BindReport::default();

    if sources.is_empty() {
        tracing::warn!(
            app_id = bootstrap.app_id.as_str(),
            "no config-center property sources found to bind"
        );
    } else if !bootstrap.auto_refreshed {
        tracing::info!("auto refresh disabled; config-center sources will not be tracked");
        report.skipped = sources.iter().map(|s| s.name.clone()).collect();
    } else {
        let mut ordered: Vec<&BoundSource> = sources.iter().collect();
        ordered.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        for source in ordered {
            if publisher.register(&source.name, source.accessor.clone())? {
                report.registered.push(source.name.clone());
            } else {
                report.skipped.push(source.name.clone());
            }
        }
    }

    log_op_end!(
        "bind_sources",
        duration_ms = start.elapsed().as_millis() as u64,
        registered = report.registered.len(),
        skipped = report.skipped.len()
    );
    Ok(report)
}
