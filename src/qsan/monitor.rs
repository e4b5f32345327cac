//! Lazy monitoring enablement
//!
//! The array only produces live counters for entities whose monitoring has been
//! switched on. Each poll reads the current stats page, notes which entities report
//! as enabled, and when a known entity is missing asks the array to monitor the
//! whole known set.
//! The switch takes effect on the array's own schedule, so newly enabled entities
//! show up on a later poll and are simply absent from this one.
//!
//! Volumes, disks and FC ports share this flow and differ only in the pieces
//! described by [`MonitoredKind`].

use crate::error::Result;
use crate::qsan::connection::{Endpoint, Session};
use crate::qsan::markup::{Document, Element};
use crate::qsan::types::{Inventory, StatSet, StatsTable};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// What differs between monitored entity kinds
pub trait MonitoredKind {
    /// Short name used in log lines
    fn kind(&self) -> &'static str;

    fn stats_endpoint(&self) -> Endpoint;

    /// Tag of one stat record in the stats page
    fn record_tag(&self) -> &'static str;

    /// Inventory key for a stat record, `None` when it cannot be resolved
    fn key(&self, record: &Element) -> Option<String>;

    fn is_enabled(&self, record: &Element) -> bool;

    /// Converted counters for a stat record
    fn counters(&self, record: &Element) -> StatSet;

    /// Requests that switch monitoring on for `missing` (sorted inventory keys).
    /// A batched request replaces the array's monitored selection, so it must name
    /// every entity in `known`, not just the missing ones.
    fn enable_requests(&self, known: &Inventory, missing: &[String]) -> Vec<Endpoint>;
}

/// Counters and enabled keys found on one stats page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Observation {
    pub stats: StatsTable,
    pub enabled: BTreeSet<String>,
}

pub fn observe<K: MonitoredKind + ?Sized>(kind: &K, page: &Document) -> Observation {
    let mut observation = Observation::default();

    for record in page.find_all(kind.record_tag()) {
        let Some(key) = kind.key(record) else {
            debug!("Skipping {} stat record without a known key", kind.kind());
            continue;
        };
        if kind.is_enabled(record) {
            observation.enabled.insert(key.clone());
        }
        observation.stats.insert(key, kind.counters(record));
    }

    observation
}

/// Known keys that are not enabled, in key order.
pub fn missing(known: &Inventory, enabled: &BTreeSet<String>) -> Vec<String> {
    known
        .keys()
        .filter(|key| !enabled.contains(*key))
        .cloned()
        .collect()
}

/// Reads the stats page for `kind`, enables monitoring where it is off, and returns
/// the counters seen on this poll.
pub async fn poll<K: MonitoredKind + ?Sized>(
    session: &Session,
    kind: &K,
    known: &Inventory,
) -> Result<StatsTable> {
    let page = session.get(&kind.stats_endpoint()).await?;
    let observation = observe(kind, &page);

    let missing = missing(known, &observation.enabled);
    if !missing.is_empty() {
        let requests = kind.enable_requests(known, &missing);
        info!(
            "Enabling {} monitoring for {} entities ({} requests)",
            kind.kind(),
            missing.len(),
            requests.len()
        );
        for request in &requests {
            session.post(request, None).await?;
        }
    }

    debug!(
        "Collected {} stats for {} of {} {} entities",
        kind.kind(),
        observation.stats.len(),
        known.len(),
        kind.kind()
    );
    Ok(observation.stats)
}
