// src/gateway/mod.rs
pub mod reporter;
pub mod service;
pub mod stats;
pub mod ucip;

pub use reporter::spawn_stats_reporter;
pub use service::{AirGateway, GatewaySettings};
pub use stats::{StatsSnapshot, TransactionStats};
pub use ucip::{generate_transaction_id, Origin};
