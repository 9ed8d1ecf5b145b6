// src/gateway/stats.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Peso de la última muestra en la media móvil exponencial
pub const EWMA_ALPHA: f64 = 0.1;

/// Contadores de transacciones AIR
///
/// `average_response_time_ms` es una EWMA, no una media real: no guarda
/// historial y pondera más las latencias recientes.
#[derive(Debug, Clone)]
pub struct TransactionStats {
    total: u64,
    succeeded: u64,
    failed: u64,
    average_response_time_ms: f64,
    last_reset: DateTime<Utc>,
}

impl Default for TransactionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStats {
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            average_response_time_ms: 0.0,
            last_reset: Utc::now(),
        }
    }

    pub fn record_started(&mut self) {
        self.total += 1;
    }

    pub fn record_completed(&mut self, success: bool, elapsed_ms: f64) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        self.average_response_time_ms =
            EWMA_ALPHA * elapsed_ms + (1.0 - EWMA_ALPHA) * self.average_response_time_ms;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let success_rate = if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        };

        StatsSnapshot {
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            average_response_time_ms: self.average_response_time_ms,
            success_rate,
            last_reset: self.last_reset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub average_response_time_ms: f64,
    pub success_rate: f64,
    pub last_reset: DateTime<Utc>,
}
