pub mod client;
pub mod connection;
pub mod discovery;
pub mod generation;
pub mod health;
pub mod markup;
pub mod monitor;
pub mod naming;
pub mod stats;
pub mod types;
pub mod units;

pub use client::QsanClient;
pub use connection::{Endpoint, Session};
pub use generation::Generation;
