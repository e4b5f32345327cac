//! Stats retrieval
//!
//! Volume, disk and FC port stats go through [`monitor::poll`], which also switches
//! on monitoring for entities the array does not track yet. Cache pool stats need
//! no enablement but join two record streams.
//!
//! Conversions:
//! - volume `tx_rate`/`rx_rate`, disk `thruput`, FC `tx_rate`/`rx_rate`: KiB/s → B/s
//! - cache `cache_size`/`dirty_size`/`total_size`/`used_size`: MiB → bytes
//! - cache hit ratios: `round(hits / (total / 100))`

use crate::error::Result;
use crate::qsan::client::QsanClient;
use crate::qsan::connection::Endpoint;
use crate::qsan::generation::{self, Generation};
use crate::qsan::markup::{Document, Element};
use crate::qsan::monitor::{self, MonitoredKind};
use crate::qsan::naming;
use crate::qsan::types::{Inventory, StatSet, StatsTable};
use crate::qsan::units;
use tracing::{debug, warn};

impl QsanClient {
    /// `iops`, `read`, `write` per volume id.
    pub async fn volume_stats(&self) -> Result<StatsTable> {
        monitor::poll(&self.session, &VolumeMonitor, &self.volumes).await
    }

    /// `latency`, `thruput` per disk id.
    pub async fn disk_stats(&self) -> Result<StatsTable> {
        let kind = DiskMonitor { disks: &self.disks };
        monitor::poll(&self.session, &kind, &self.disks).await
    }

    /// `tx`, `rx` per `controller:port` key.
    pub async fn fc_stats(&self) -> Result<StatsTable> {
        let kind = FcMonitor {
            generation: self.generation,
        };
        monitor::poll(&self.session, &kind, &self.fc_ports).await
    }

    /// One flattened stat set per cache pool name. Empty on SANOS 3.
    pub async fn cache_pool_stats_summarized(&self) -> Result<StatsTable> {
        if !self.generation.supports_cache_pools() {
            debug!("Cache pool stats are not available on {:?}", self.generation);
            return Ok(StatsTable::new());
        }

        let page = self
            .session
            .get(&generation::monitor("monitor_ssd_cache"))
            .await?;
        Ok(summarize_cache_pools(&page))
    }
}

/// Converts a raw counter text into a normalized value.
pub(super) type Convert = fn(&str) -> Option<u64>;

/// Reads `field` from `record` and converts it, warning when it is unreadable.
fn counter(record: &Element, field: &str, convert: Convert) -> Option<String> {
    let raw = record.child_text(field)?;
    match convert(&raw) {
        Some(value) => Some(value.to_string()),
        None => {
            warn!("Unreadable counter {}={:?}", field, raw);
            None
        }
    }
}

/// Builds a stat set from `(metric, field, conversion)` triples.
pub(super) fn counters(record: &Element, layout: &[(&str, &str, Convert)]) -> StatSet {
    layout
        .iter()
        .filter_map(|(metric, field, convert)| {
            counter(record, field, *convert).map(|value| (metric.to_string(), value))
        })
        .collect()
}

fn flag_is_yes(record: &Element) -> bool {
    record
        .child_text("is_enabled")
        .is_some_and(|flag| flag.trim() == "Yes")
}

/// Volumes: a record on the stats page means monitoring is on.
pub struct VolumeMonitor;

impl MonitoredKind for VolumeMonitor {
    fn kind(&self) -> &'static str {
        "volume"
    }

    fn stats_endpoint(&self) -> Endpoint {
        generation::monitor("monitor_volume")
    }

    fn record_tag(&self) -> &'static str {
        "volume_stats"
    }

    fn key(&self, record: &Element) -> Option<String> {
        record.child_text("vd_id")
    }

    fn is_enabled(&self, _record: &Element) -> bool {
        true
    }

    fn counters(&self, record: &Element) -> StatSet {
        counters(
            record,
            &[
                ("iops", "iops_rate", units::whole),
                ("read", "tx_rate", units::kib_to_bytes),
                ("write", "rx_rate", units::kib_to_bytes),
            ],
        )
    }

    fn enable_requests(&self, known: &Inventory, _missing: &[String]) -> Vec<Endpoint> {
        let ids: Vec<&str> = known.keys().map(String::as_str).collect();
        vec![generation::set_monitor("volume_set_monitor").with("volume_arr", ids.join(","))]
    }
}

/// Disks: stat records name a slot, which is resolved back to the disk id.
pub struct DiskMonitor<'a> {
    pub disks: &'a Inventory,
}

impl DiskMonitor<'_> {
    fn id_for_slot(&self, slot: &str) -> Option<String> {
        self.disks
            .iter()
            .find(|(_, attrs)| attrs.get("slot").is_some_and(|s| s == slot))
            .map(|(id, _)| id.clone())
    }
}

impl MonitoredKind for DiskMonitor<'_> {
    fn kind(&self) -> &'static str {
        "disk"
    }

    fn stats_endpoint(&self) -> Endpoint {
        generation::monitor("monitor_disk")
    }

    fn record_tag(&self) -> &'static str {
        "disk_monitor_stats"
    }

    fn key(&self, record: &Element) -> Option<String> {
        let slot = record.child_text("slot")?;
        self.id_for_slot(slot.trim())
    }

    fn is_enabled(&self, record: &Element) -> bool {
        flag_is_yes(record)
    }

    fn counters(&self, record: &Element) -> StatSet {
        counters(
            record,
            &[
                ("latency", "latency", units::whole),
                ("thruput", "thruput", units::kib_to_bytes),
            ],
        )
    }

    /// The array takes the slot numbers of every known disk. Slots are ordered
    /// numerically (`2,9,10`) rather than as text, non-numeric slots last.
    fn enable_requests(&self, known: &Inventory, _missing: &[String]) -> Vec<Endpoint> {
        let mut slots: Vec<&str> = known
            .values()
            .filter_map(|attrs| attrs.get("slot"))
            .map(String::as_str)
            .collect();
        if slots.is_empty() {
            return Vec::new();
        }
        slots.sort_by_key(|slot| (slot.parse::<u32>().unwrap_or(u32::MAX), slot.to_string()));

        vec![generation::set_monitor("disk_set_monitor")
            .with("enc_idx", 0)
            .with("slot_arr", slots.join(","))]
    }
}

/// FC ports: keyed by controller and the index parsed from the port name.
pub struct FcMonitor {
    pub generation: Generation,
}

impl MonitoredKind for FcMonitor {
    fn kind(&self) -> &'static str {
        "FC port"
    }

    fn stats_endpoint(&self) -> Endpoint {
        generation::monitor("monitor_fc")
    }

    fn record_tag(&self) -> &'static str {
        "fc_monitor_stats"
    }

    fn key(&self, record: &Element) -> Option<String> {
        let controller = record.child_text("ctrl_idx")?.trim().parse::<u8>().ok()?;
        let name = record.child_text(self.generation.fc_port_name_field())?;
        let index = naming::fc_port_index(&name, self.generation.fc_port_prefix_len())?;
        Some(naming::fc_port_key(controller, index))
    }

    fn is_enabled(&self, record: &Element) -> bool {
        flag_is_yes(record)
    }

    fn counters(&self, record: &Element) -> StatSet {
        counters(
            record,
            &[
                ("tx", "tx_rate", units::kib_to_bytes),
                ("rx", "rx_rate", units::kib_to_bytes),
            ],
        )
    }

    /// SANOS 4 takes every known port in one request. SANOS 3 takes one request per
    /// port that is not monitored yet.
    fn enable_requests(&self, known: &Inventory, missing: &[String]) -> Vec<Endpoint> {
        if self.generation.batches_fc_enable() {
            let ports: Vec<&str> = known.keys().map(String::as_str).collect();
            return vec![generation::set_monitor("fc_set_monitor").with("port_arr", ports.join(","))];
        }

        missing
            .iter()
            .filter_map(|key| key.split_once(':'))
            .map(|(controller, port)| {
                generation::set_monitor("fc_set_monitor")
                    .with("ctrl_idx", controller)
                    .with("port_idx", port)
            })
            .collect()
    }
}

/// Joins pool records with the volume-group records whose `rg` equals the pool's
/// `rg_id`, summing sizes and hit counters across a pool's groups.
pub fn summarize_cache_pools(page: &Document) -> StatsTable {
    let groups = page.find_all("vg_cache_stats");
    let mut table = StatsTable::new();

    for pool in page.find_all("cache_pool_stats") {
        let Some(name) = pool.child_text("name") else {
            warn!("Skipping cache pool stats without name");
            continue;
        };
        let rg_id = pool.child_text("rg_id").map(|id| id.trim().to_string());

        let members: Vec<&Element> = groups
            .iter()
            .copied()
            .filter(|group| {
                rg_id.is_some() && group.child_text("rg").map(|rg| rg.trim().to_string()) == rg_id
            })
            .collect();

        let mut stats = counters(
            pool,
            &[
                ("total_size", "total_size", units::mib_to_bytes),
                ("used_size", "used_size", units::mib_to_bytes),
            ],
        );
        stats.insert("cache_size".to_string(), sum(&members, "cache_size", units::mib_to_bytes).to_string());
        stats.insert("dirty_size".to_string(), sum(&members, "dirty_size", units::mib_to_bytes).to_string());
        let read_hits = sum(&members, "log_rd_hit", units::whole);
        let reads = sum(&members, "log_rd_tot", units::whole);
        stats.insert("read_hit_ratio".to_string(), units::hit_ratio(read_hits, reads).to_string());
        let write_hits = sum(&members, "log_wr_hit", units::whole);
        let writes = sum(&members, "log_wr_tot", units::whole);
        stats.insert("write_hit_ratio".to_string(), units::hit_ratio(write_hits, writes).to_string());

        debug!("Cache pool {} has {} volume groups", name.trim(), members.len());
        table.insert(naming::cache_pool_key(name.trim()), stats);
    }

    table
}

fn sum(records: &[&Element], field: &str, convert: Convert) -> u64 {
    records
        .iter()
        .filter_map(|record| convert(&record.child_text(field)?))
        .fold(0u64, u64::saturating_add)
}
