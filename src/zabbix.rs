//! Zabbix Output
//!
//! Turns client results into what Zabbix external checks expect:
//!
//! - low-level discovery documents, e.g. `{"data": [{"{#VOLUME}": "vol-1_RAID5_1TB"}]}`
//! - sender-style lines, `<zhost>\t<item key>\t<value>`
//!
//! # Item keys
//!
//! - `qsan.sanos4.volume.{iops,read,write}[<volume name>]`
//! - `qsan.sanos4.disk.{latency,thruput}[<disk name>]`
//! - `qsan.sanos4.fc.{tx,rx}[<port name>]`
//! - `qsan.sanos4.cachepool.<metric>[<pool name>]`
//! - `qsan.sanos4.storage.{iops,read,write}`
//! - `qsan.sanos4.storage.healthy` (1 or 0; omitted when health is indeterminate)

use crate::error::Result;
use crate::qsan::types::{StatSet, StatsTable};
use crate::qsan::QsanClient;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{info, warn};

/// Item key prefix shared with the existing Zabbix templates. It is the same for
/// SANOS 3 arrays.
pub const ITEM_PREFIX: &str = "qsan.sanos4";

/// What a single invocation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    #[value(name = "discovery:volume")]
    DiscoveryVolume,
    #[value(name = "discovery:disk")]
    DiscoveryDisk,
    #[value(name = "discovery:cachepool")]
    DiscoveryCachePool,
    #[value(name = "discovery:fc")]
    DiscoveryFc,
    #[value(name = "stats:volume")]
    StatsVolume,
    #[value(name = "stats:disk")]
    StatsDisk,
    #[value(name = "stats:fc")]
    StatsFc,
    #[value(name = "stats:cachepool")]
    StatsCachePool,
    #[value(name = "stats:storage")]
    StatsStorage,
    #[value(name = "stats:health")]
    StatsHealth,
    #[value(name = "stats:all")]
    StatsAll,
}

#[derive(Debug, Serialize)]
struct DiscoveryDocument {
    data: Vec<BTreeMap<&'static str, String>>,
}

/// Pretty-printed LLD document with one `{macro_name: name}` entry per name.
pub fn discovery_document(macro_name: &'static str, names: &[String]) -> Result<String> {
    let document = DiscoveryDocument {
        data: names
            .iter()
            .map(|name| BTreeMap::from([(macro_name, name.clone())]))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn item_line(zhost: &str, key: &str, value: &str) -> String {
    format!("{}\t{}\t{}", zhost, key, value)
}

/// Item lines for a per-entity stats table. `name_of` maps an entity id to its
/// display name; unknown ids are reported under the raw id.
pub fn entity_lines(
    zhost: &str,
    kind: &str,
    table: &StatsTable,
    name_of: impl Fn(&str) -> Option<String>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (id, stats) in table {
        let name = name_of(id).unwrap_or_else(|| id.clone());
        for (metric, value) in stats {
            let key = format!("{}.{}.{}[{}]", ITEM_PREFIX, kind, metric, name);
            lines.push(item_line(zhost, &key, value));
        }
    }
    lines
}

pub fn storage_lines(zhost: &str, stats: &StatSet) -> Vec<String> {
    stats
        .iter()
        .map(|(metric, value)| {
            let key = format!("{}.storage.{}", ITEM_PREFIX, metric);
            item_line(zhost, &key, value)
        })
        .collect()
}

fn display_names<'k>(
    ids: impl Iterator<Item = &'k String>,
    name_of: impl Fn(&str) -> Option<String>,
) -> Vec<String> {
    ids.map(|id| name_of(id).unwrap_or_else(|| id.clone()))
        .collect()
}

/// Runs a [`Method`] against a connected, discovered client and writes the result.
pub struct Reporter<'a, W: Write> {
    client: &'a QsanClient,
    zhost: &'a str,
    out: W,
}

impl<'a, W: Write> Reporter<'a, W> {
    pub fn new(client: &'a QsanClient, zhost: &'a str, out: W) -> Self {
        Self { client, zhost, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub async fn run(&mut self, method: Method) -> Result<()> {
        info!("Running {:?}", method);
        match method {
            Method::DiscoveryVolume => {
                let names = display_names(self.client.volumes().keys(), |id| self.client.volume_name(id));
                self.write_discovery("{#VOLUME}", &names)
            }
            Method::DiscoveryDisk => {
                let names = display_names(self.client.disks().keys(), |id| self.client.disk_name(id));
                self.write_discovery("{#DISK}", &names)
            }
            Method::DiscoveryCachePool => {
                let names: Vec<String> = self.client.cache_pools().keys().cloned().collect();
                self.write_discovery("{#CACHEPOOL}", &names)
            }
            Method::DiscoveryFc => {
                let names = display_names(self.client.fc_ports().keys(), |key| self.client.fc_port_name(key));
                self.write_discovery("{#FCPORT}", &names)
            }
            Method::StatsVolume => self.volume_stats().await,
            Method::StatsDisk => self.disk_stats().await,
            Method::StatsFc => self.fc_stats().await,
            Method::StatsCachePool => self.cache_pool_stats().await,
            Method::StatsStorage => self.storage_stats().await,
            Method::StatsHealth => self.health().await,
            Method::StatsAll => {
                self.volume_stats().await?;
                self.storage_stats().await?;
                self.disk_stats().await?;
                self.fc_stats().await?;
                self.cache_pool_stats().await?;
                self.health().await
            }
        }
    }

    fn write_discovery(&mut self, macro_name: &'static str, names: &[String]) -> Result<()> {
        let document = discovery_document(macro_name, names)?;
        writeln!(self.out, "{}", document)?;
        Ok(())
    }

    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    async fn volume_stats(&mut self) -> Result<()> {
        let table = self.client.volume_stats().await?;
        let lines = entity_lines(self.zhost, "volume", &table, |id| self.client.volume_name(id));
        self.write_lines(&lines)
    }

    async fn disk_stats(&mut self) -> Result<()> {
        let table = self.client.disk_stats().await?;
        let lines = entity_lines(self.zhost, "disk", &table, |id| self.client.disk_name(id));
        self.write_lines(&lines)
    }

    async fn fc_stats(&mut self) -> Result<()> {
        let table = self.client.fc_stats().await?;
        let lines = entity_lines(self.zhost, "fc", &table, |key| self.client.fc_port_name(key));
        self.write_lines(&lines)
    }

    async fn cache_pool_stats(&mut self) -> Result<()> {
        let table = self.client.cache_pool_stats_summarized().await?;
        let lines = entity_lines(self.zhost, "cachepool", &table, |_| None);
        self.write_lines(&lines)
    }

    async fn storage_stats(&mut self) -> Result<()> {
        let stats = self.client.storage_stats().await?;
        let lines = storage_lines(self.zhost, &stats);
        self.write_lines(&lines)
    }

    async fn health(&mut self) -> Result<()> {
        let health = self.client.storage_health().await?;
        match health.as_bool() {
            Some(healthy) => {
                let key = format!("{}.storage.healthy", ITEM_PREFIX);
                let line = item_line(self.zhost, &key, if healthy { "1" } else { "0" });
                self.write_lines(&[line])
            }
            None => {
                warn!("Storage health could not be evaluated");
                Ok(())
            }
        }
    }
}
