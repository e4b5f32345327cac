//! Inventory discovery
//!
//! One pass per entity kind. Each pass builds a complete table locally and only
//! then swaps it into the client, so a transport failure halfway through keeps the
//! previous table.

use crate::error::{ExporterError, Result};
use crate::qsan::client::QsanClient;
use crate::qsan::generation;
use crate::qsan::markup::Document;
use crate::qsan::naming;
use crate::qsan::types::Inventory;
use crate::qsan::units;
use tracing::{debug, info, warn};

/// Controllers searched for FC ports
pub const CONTROLLERS: [u8; 2] = [0, 1];

/// Fields never stored as volume attributes. Some firmware emits a bare `<img/>`
/// inside volume records.
const VOLUME_SKIPPED_FIELDS: &[&str] = &["id", "img"];

impl QsanClient {
    /// Runs all four discovery passes.
    pub async fn discover_all(&mut self) -> Result<()> {
        self.discover_volumes().await?;
        self.discover_disks().await?;
        self.discover_cache_pools().await?;
        self.discover_fc_ports().await?;
        Ok(())
    }

    /// Walks the volume pages until the number of collected volumes equals the
    /// total the array reports.
    ///
    /// # Errors
    ///
    /// [`ExporterError::Protocol`] when a page lacks the total, when a page adds
    /// nothing while volumes are still missing, or when more volumes than the total
    /// were listed.
    pub async fn discover_volumes(&mut self) -> Result<()> {
        let mut volumes = Inventory::new();
        let mut page = 1u32;

        loop {
            let document = self.session.get(&generation::volume_list(page)).await?;
            let total = volume_total(&document).ok_or_else(|| {
                ExporterError::Protocol(format!("volume page {} has no vd_num", page))
            })?;

            let before = volumes.len();
            collect_volumes(&document, &mut volumes);
            debug!(
                "Volume page {}: {} of {} collected",
                page,
                volumes.len(),
                total
            );

            if volumes.len() == total {
                break;
            }
            if volumes.len() > total {
                return Err(ExporterError::Protocol(format!(
                    "array reports {} volumes but listed {}",
                    total,
                    volumes.len()
                )));
            }
            if volumes.len() == before {
                return Err(ExporterError::Protocol(format!(
                    "volume page {} added nothing, {} of {} collected",
                    page,
                    volumes.len(),
                    total
                )));
            }
            page += 1;
        }

        info!("Discovered {} volumes", volumes.len());
        self.volumes = volumes;
        Ok(())
    }

    pub async fn discover_disks(&mut self) -> Result<()> {
        let document = self.session.get(&generation::disk_list()).await?;

        let mut disks = Inventory::new();
        for record in document.find_all("hdd") {
            if !record.has_children() {
                continue;
            }
            let Some(id) = record.child_text("id") else {
                warn!("Skipping disk record without id");
                continue;
            };
            disks.insert(id, record.fields(&["id"]));
        }

        info!("Discovered {} disks", disks.len());
        self.disks = disks;
        Ok(())
    }

    /// Cache pools are keyed by display name with spaces turned into hyphens.
    /// SANOS 3 has no cache pools; the table is then cleared without a request.
    pub async fn discover_cache_pools(&mut self) -> Result<()> {
        if !self.generation.supports_cache_pools() {
            debug!("Cache pools are not available on {:?}", self.generation);
            self.cache_pools = Inventory::new();
            return Ok(());
        }

        let document = self
            .session
            .get(&self.generation.cache_pool_list())
            .await?;

        let mut pools = Inventory::new();
        for record in document.find_all("cache_pool") {
            let Some(name) = record.child_text("name") else {
                warn!("Skipping cache pool record without name");
                continue;
            };
            pools.insert(naming::cache_pool_key(name.trim()), record.fields(&["name"]));
        }

        info!("Discovered {} cache pools", pools.len());
        self.cache_pools = pools;
        Ok(())
    }

    /// Lists FC ports of both controllers under `controller:port` keys. A controller
    /// that answers without ports (absent, or no FC module) is skipped.
    pub async fn discover_fc_ports(&mut self) -> Result<()> {
        let name_field = self.generation.fc_port_name_field();
        let prefix_len = self.generation.fc_port_prefix_len();

        let mut ports = Inventory::new();
        for controller in CONTROLLERS {
            let document = self
                .session
                .get(&self.generation.fc_port_list(controller))
                .await?;

            let records = document.find_all("fc_port");
            if records.is_empty() {
                debug!("Controller {} reports no FC ports", controller);
                continue;
            }

            for record in records {
                let index = record
                    .child_text(name_field)
                    .and_then(|name| naming::fc_port_index(&name, prefix_len));
                let Some(index) = index else {
                    warn!(
                        "Skipping FC port on controller {} with unreadable {}",
                        controller, name_field
                    );
                    continue;
                };
                ports.insert(naming::fc_port_key(controller, index), record.fields(&[]));
            }
        }

        info!("Discovered {} FC ports", ports.len());
        self.fc_ports = ports;
        Ok(())
    }
}

fn volume_total(document: &Document) -> Option<usize> {
    document
        .child_text("vd_num")
        .and_then(|total| units::parse_counter(&total))
        .map(|total| total as usize)
}

/// Adds the volumes of one page. An empty `udv` record marks the end of a page
/// and is not stored.
fn collect_volumes(document: &Document, volumes: &mut Inventory) {
    for record in document.find_all("udv") {
        if !record.has_children() {
            debug!("End-of-page volume record");
            continue;
        }
        let Some(id) = record.child_text("id") else {
            warn!("Skipping volume record without id");
            continue;
        };
        volumes.insert(id, record.fields(VOLUME_SKIPPED_FIELDS));
    }
}
