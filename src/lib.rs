//! QSAN Storage Exporter for Zabbix
//!
//! Polls a QSAN storage array through its management web interface and reports
//! volume, disk, cache pool and fibre-channel port counters to Zabbix.
//!
//! # Overview
//!
//! The array has no stats API. The exporter logs in like a browser, detects the
//! firmware generation (SANOS 3 or SANOS 4), discovers the inventory and reads the
//! monitoring pages. Counters are normalized to bytes/s and IOPS. Monitoring that
//! is switched off on the array is switched on during the poll, so those entities
//! report from the next poll on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   HTTP (form login,   ┌─────────────────┐
//! │  QSAN array │   XML/HTML pages)     │    Exporter     │
//! │  web UI     │ ◄───────────────────► │  ┌───────────┐  │   stdout    ┌────────┐
//! └─────────────┘                       │  │QsanClient │  │ ──────────► │ Zabbix │
//!                                       │  └───────────┘  │  LLD JSON / └────────┘
//!                                       │  ┌───────────┐  │  item lines
//!                                       │  │ Reporter  │  │
//!                                       │  └───────────┘  │
//!                                       └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`qsan`] - array client: session, discovery, stats, naming
//! - [`zabbix`] - discovery documents and item lines
//! - [`config`] - configuration management
//! - [`error`] - error types
//!
//! # Quick Start
//!
//! ```no_run
//! use qsan_exporter::config::Config;
//! use qsan_exporter::qsan::QsanClient;
//! use qsan_exporter::zabbix::{Method, Reporter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let mut client = QsanClient::connect(config.qsan.clone()).await?;
//!     client.discover_all().await?;
//!     Reporter::new(&client, &config.zabbix.host, std::io::stdout())
//!         .run(Method::StatsAll)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod qsan;
pub mod zabbix;
