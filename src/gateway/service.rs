// src/gateway/service.rs
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::stats::{StatsSnapshot, TransactionStats};
use super::ucip::{self, Origin};
use crate::error::GatewayError;
use crate::models::{
    GetAccountDetailsParams, GetBalanceParams, RefillParams, RouteHint, UpdateBalanceParams,
};
use crate::provider::NodeProvider;
use crate::routing::{ClientSettings, NodeRegistry, RequestRouter};
use crate::xmlrpc::{Request, Response};

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Entorno de despliegue activo; filtra los nodos del proveedor
    pub environment: String,
    pub client: ClientSettings,
    pub origin: Origin,
}

/// Fachada del gateway AIR
///
/// Se construye explícitamente y se comparte con `Arc`. El enrutador es una
/// instantánea inmutable: `reload` publica otra completa y las llamadas en
/// curso terminan con la anterior.
pub struct AirGateway {
    settings: GatewaySettings,
    provider: Arc<dyn NodeProvider>,
    router: RwLock<Option<Arc<RequestRouter>>>,
    stats: Mutex<TransactionStats>,
}

impl AirGateway {
    pub fn new(settings: GatewaySettings, provider: Arc<dyn NodeProvider>) -> Self {
        Self {
            settings,
            provider,
            router: RwLock::new(None),
            stats: Mutex::new(TransactionStats::new()),
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Carga los nodos del entorno y deja el gateway listo.
    /// Repetir la llamada estando listo no hace nada.
    #[instrument(skip(self), fields(environment = %self.settings.environment))]
    pub async fn initialize(&self) -> Result<(), GatewayError> {
        let mut slot = self.router.write().await;

        if slot.is_some() {
            warn!("AIR gateway already initialized");
            return Ok(());
        }

        let router = self.build_router().await?;
        info!(
            "✅ AIR gateway initialized with {} nodes: {:?}, routing keys: {:?}",
            router.registry().len(),
            router.registry().node_ids(),
            router.registry().routes().keys()
        );

        *slot = Some(Arc::new(router));
        Ok(())
    }

    /// Reconstruye registro y tabla de enrutamiento y los publica de una vez.
    /// Si falla, la instantánea anterior sigue en uso.
    #[instrument(skip(self), fields(environment = %self.settings.environment))]
    pub async fn reload(&self) -> Result<Vec<String>, GatewayError> {
        if !self.is_ready().await {
            return Err(GatewayError::NotInitialized);
        }

        let router = Arc::new(self.build_router().await?);
        let node_ids = router.registry().node_ids().to_vec();
        let routing_keys: Vec<String> = router
            .registry()
            .routes()
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut slot = self.router.write().await;
        if slot.is_none() {
            // shutdown concurrente
            return Err(GatewayError::NotInitialized);
        }
        *slot = Some(router);

        info!(
            "🔄 AIR gateway reloaded: {:?}, routing keys: {:?}",
            node_ids, routing_keys
        );
        Ok(node_ids)
    }

    pub async fn shutdown(&self) {
        if self.router.write().await.take().is_some() {
            info!("🛑 AIR gateway shut down");
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.router.read().await.is_some()
    }

    /// Ids de nodo activos en orden de configuración
    pub async fn node_ids(&self) -> Vec<String> {
        self.router
            .read()
            .await
            .as_ref()
            .map(|r| r.registry().node_ids().to_vec())
            .unwrap_or_default()
    }

    async fn build_router(&self) -> Result<RequestRouter, GatewayError> {
        let nodes = self.provider.nodes_for(&self.settings.environment).await?;

        let registry = NodeRegistry::build(&nodes, &self.settings.client)?;
        if registry.is_empty() {
            return Err(GatewayError::NoNodesConfigured(
                self.settings.environment.clone(),
            ));
        }

        Ok(RequestRouter::new(registry))
    }

    /// Envía una request genérica al nodo elegido por el enrutador.
    ///
    /// Las estadísticas se actualizan tanto en éxito como en error; el error
    /// se devuelve tal cual, sin reintentos.
    #[instrument(skip(self, request), fields(method = %request.method_name))]
    pub async fn execute_request(
        &self,
        request: Request,
        node_id: Option<&str>,
        routing_key: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let router = self
            .router
            .read()
            .await
            .clone()
            .ok_or(GatewayError::NotInitialized)?;

        self.stats.lock().await.record_started();
        let started = Instant::now();

        let result = match router.select(node_id, routing_key) {
            Ok(client) => {
                debug!("Routing {} to {}", request.method_name, client.node_id());
                client.call(&request).await
            }
            Err(e) => Err(e),
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats
            .lock()
            .await
            .record_completed(result.is_ok(), elapsed_ms);

        match &result {
            Ok(Response::Fault { code, message }) => {
                info!("AIR fault for {}: {} {}", request.method_name, code, message);
            }
            Err(e) if e.is_routing() => {
                warn!("AIR request {} not routed: {}", request.method_name, e)
            }
            Err(e) => error!("AIR request {} failed: {}", request.method_name, e),
            Ok(_) => {}
        }

        result
    }

    async fn execute_routed(
        &self,
        request: Request,
        route: &RouteHint,
    ) -> Result<Response, GatewayError> {
        self.execute_request(
            request,
            route.node_id.as_deref(),
            route.routing_key.as_deref(),
        )
        .await
    }

    pub async fn get_balance(
        &self,
        params: &GetBalanceParams,
        route: &RouteHint,
    ) -> Result<Response, GatewayError> {
        let request = ucip::get_balance(params, &self.settings.origin);
        self.execute_routed(request, route).await
    }

    pub async fn refill(
        &self,
        params: &RefillParams,
        route: &RouteHint,
    ) -> Result<Response, GatewayError> {
        let request = ucip::refill(params, &self.settings.origin);
        self.execute_routed(request, route).await
    }

    pub async fn update_balance(
        &self,
        params: &UpdateBalanceParams,
        route: &RouteHint,
    ) -> Result<Response, GatewayError> {
        let request = ucip::update_balance(params, &self.settings.origin);
        self.execute_routed(request, route).await
    }

    pub async fn get_account_details(
        &self,
        params: &GetAccountDetailsParams,
        route: &RouteHint,
    ) -> Result<Response, GatewayError> {
        let request = ucip::get_account_details(params, &self.settings.origin);
        self.execute_routed(request, route).await
    }

    pub async fn get_stats(&self) -> StatsSnapshot {
        self.stats.lock().await.snapshot()
    }

    /// Las llamadas en curso aplican su resultado sobre los contadores nuevos
    pub async fn reset_stats(&self) {
        self.stats.lock().await.reset();
        info!("AIR transaction stats reset");
    }
}
