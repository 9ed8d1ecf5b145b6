// src/gateway/reporter.rs
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use super::service::AirGateway;

/// Registra una instantánea de estadísticas cada `every` mientras el gateway
/// esté listo. El dueño del handle lo aborta al apagar el servicio.
pub fn spawn_stats_reporter(gateway: Arc<AirGateway>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // El primer tick es inmediato
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if !gateway.is_ready().await {
                continue;
            }

            let stats = gateway.get_stats().await;
            info!(
                total = stats.total,
                succeeded = stats.succeeded,
                failed = stats.failed,
                avg_response_ms = stats.average_response_time_ms,
                success_rate = stats.success_rate,
                "📊 AIR transaction stats"
            );
        }
    })
}
