//! QSAN Storage Array Client
//!
//! This module provides the client for a QSAN array's management web interface.
//! The interface is a PHP application answering with XML fragments or HTML pages;
//! there is no documented API, so the client walks the same endpoints the web UI
//! uses.
//!
//! # Lifecycle
//!
//! 1. [`QsanClient::connect`] opens a fresh HTTP session and logs in
//! 2. The post-login page is inspected once to pick the firmware [`Generation`]
//! 3. Discovery passes fill the per-kind inventories (see `discovery.rs`)
//! 4. Stats calls read counters and lazily enable monitoring (see `stats.rs`)
//!
//! A run never logs in twice and never re-detects the generation.
//!
//! # Example
//!
//! ```no_run
//! use qsan_exporter::config::QsanConfig;
//! use qsan_exporter::qsan::QsanClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut client = QsanClient::connect(QsanConfig::for_host("10.0.0.20")).await?;
//! client.discover_all().await?;
//! for (id, counters) in client.volume_stats().await? {
//!     println!("{:?} {:?}", client.volume_name(&id), counters);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::QsanConfig;
use crate::error::{ExporterError, Result};
use crate::qsan::connection::Session;
use crate::qsan::generation::{self, Generation};
use crate::qsan::health;
use crate::qsan::markup::Document;
use crate::qsan::naming;
use crate::qsan::types::{Health, Inventory, StatSet};
use crate::qsan::stats;
use crate::qsan::units;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// Client for one QSAN array
///
/// Owns the HTTP session and the inventory tables. Discovery replaces a table
/// wholesale and only after every page was fetched, so a failed pass leaves the
/// previous table in place.
pub struct QsanClient {
    pub(super) session: Session,
    pub(super) generation: Generation,
    pub(super) volumes: Inventory,
    pub(super) disks: Inventory,
    pub(super) cache_pools: Inventory,
    pub(super) fc_ports: Inventory,
}

impl QsanClient {
    /// Opens a session, logs in and detects the firmware generation.
    ///
    /// # Errors
    ///
    /// - [`ExporterError::Auth`] when the array rejects the credentials
    /// - a transport error when the login page cannot be fetched
    pub async fn connect(config: QsanConfig) -> Result<Self> {
        let session = Session::open(&config)?;

        info!("Logging in to {} as {}", session.base_url(), config.username);
        let page = authorize(&session, &config.username, &config.password)
            .await?
            .ok_or_else(|| {
                ExporterError::Auth(format!(
                    "{} did not accept the credentials for {}",
                    config.host, config.username
                ))
            })?;

        let generation = Generation::detect(&page);
        info!("Logged in, detected {:?} firmware", generation);

        Ok(Self {
            session,
            generation,
            volumes: Inventory::new(),
            disks: Inventory::new(),
            cache_pools: Inventory::new(),
            fc_ports: Inventory::new(),
        })
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn volumes(&self) -> &Inventory {
        &self.volumes
    }

    pub fn disks(&self) -> &Inventory {
        &self.disks
    }

    pub fn cache_pools(&self) -> &Inventory {
        &self.cache_pools
    }

    pub fn fc_ports(&self) -> &Inventory {
        &self.fc_ports
    }

    pub fn volume_name(&self, id: &str) -> Option<String> {
        self.volumes.get(id).map(naming::volume_name)
    }

    pub fn disk_name(&self, id: &str) -> Option<String> {
        self.disks.get(id).map(naming::disk_name)
    }

    pub fn fc_port_name(&self, key: &str) -> Option<String> {
        self.fc_ports
            .get(key)
            .map(|attrs| naming::fc_port_name(key, attrs, self.generation.fc_port_name_field()))
    }

    /// Array-wide IOPS and throughput from the dashboard.
    ///
    /// Empty on SANOS 3, and empty when the dashboard has no `controller` element.
    pub async fn storage_stats(&self) -> Result<StatSet> {
        if !self.generation.supports_storage_stats() {
            debug!("Dashboard stats are not available on {:?}", self.generation);
            return Ok(StatSet::new());
        }

        let page = self.session.get(&generation::monitor("monitor_dashboard")).await?;
        Ok(dashboard_stats(&page))
    }

    pub async fn storage_health(&self) -> Result<Health> {
        let page = self.session.get(&self.generation.health_status()).await?;
        let health = match self.generation {
            Generation::Sanos4 => health::from_status_list(&page),
            Generation::Sanos3 => health::from_status_indicator(&page),
        };
        debug!("Storage health: {}", health);
        Ok(health)
    }
}

/// Posts the login form. Returns the resulting page when it shows a logout control.
pub async fn authorize(
    session: &Session,
    username: &str,
    password: &SecretString,
) -> Result<Option<Document>> {
    let form = [
        ("lang_sel", "en"),
        ("login", "Login"),
        ("username", username),
        ("password", password.expose_secret()),
    ];

    let page = session.post(&generation::login(), Some(form.as_slice())).await?;
    Ok(is_authorized(&page).then_some(page))
}

/// A logged-in page carries `div#logout_btn`, or a `Logout` image on SANOS 3.
pub fn is_authorized(page: &Document) -> bool {
    page.find_with_attribute("div", "id", "logout_btn").is_some()
        || page.find_with_attribute("img", "title", "Logout").is_some()
}

/// Dashboard counters: `iops` in whole operations, `read`/`write` converted from MiB
/// to bytes. Unreadable counters are logged and left out.
pub fn dashboard_stats(page: &Document) -> StatSet {
    if page.find("controller").is_none() {
        debug!("Dashboard has no controller element");
        return StatSet::new();
    }

    stats::counters(
        page,
        &[
            ("iops", "iops", units::whole),
            ("read", "tx", units::mib_to_bytes),
            ("write", "rx", units::mib_to_bytes),
        ],
    )
}
