// src/routing/registry.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::provider::NodeDescriptor;
use crate::xmlrpc::{AirClient, DEFAULT_TIMEOUT_MS};

/// Parámetros comunes para crear los clientes de cada nodo
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub path: String,
    pub timeout_ms: u64,
    pub max_connections_per_node: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            path: "/Air".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_connections_per_node: 20,
        }
    }
}

/// Pool de destinos intercambiables para una clave de enrutamiento
pub struct RoutePool {
    destinations: Vec<Arc<AirClient>>,
    cursor: AtomicUsize,
}

impl RoutePool {
    fn new() -> Self {
        Self {
            destinations: Vec::new(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Round-robin: toma el destino del cursor y lo avanza módulo `len`
    /// en una sola operación atómica.
    pub fn next(&self) -> Option<Arc<AirClient>> {
        if self.is_empty() {
            return None;
        }
        let len = self.destinations.len();

        let idx = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);

        self.destinations.get(idx).cloned()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

/// Clave de enrutamiento -> destinos en orden de configuración
#[derive(Default)]
pub struct RoutingTable {
    pools: HashMap<String, RoutePool>,
}

impl RoutingTable {
    pub fn pool(&self, routing_key: &str) -> Option<&RoutePool> {
        self.pools.get(routing_key)
    }

    /// Claves configuradas, ordenadas
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn push(&mut self, routing_key: &str, client: Arc<AirClient>) {
        self.pools
            .entry(routing_key.to_string())
            .or_insert_with(RoutePool::new)
            .destinations
            .push(client);
    }
}

/// Un cliente por nodo activo, más la tabla de enrutamiento
///
/// Se construye completa y no se modifica después; una recarga crea otra.
pub struct NodeRegistry {
    clients: HashMap<String, Arc<AirClient>>,
    order: Vec<String>,
    routes: RoutingTable,
}

impl NodeRegistry {
    pub fn build(
        descriptors: &[NodeDescriptor],
        settings: &ClientSettings,
    ) -> Result<Self, GatewayError> {
        let mut clients = HashMap::new();
        let mut order = Vec::new();
        let mut routes = RoutingTable::default();

        for descriptor in descriptors {
            if !descriptor.active {
                debug!("Skipping inactive AIR node: {}", descriptor.node_id);
                continue;
            }

            if clients.contains_key(&descriptor.node_id) {
                warn!("Duplicate AIR node id ignored: {}", descriptor.node_id);
                continue;
            }

            let client = Arc::new(AirClient::new(
                &descriptor.node_id,
                &descriptor.endpoint_url(&settings.path),
                settings.timeout_ms,
                settings.max_connections_per_node,
            )?);

            if let Some(key) = descriptor.routing_key.as_deref().filter(|k| !k.is_empty()) {
                routes.push(key, client.clone());
            }

            order.push(descriptor.node_id.clone());
            clients.insert(descriptor.node_id.clone(), client);
        }

        Ok(Self {
            clients,
            order,
            routes,
        })
    }

    pub fn client(&self, node_id: &str) -> Option<Arc<AirClient>> {
        self.clients.get(node_id).cloned()
    }

    /// Primer cliente en orden de configuración
    pub fn first(&self) -> Option<Arc<AirClient>> {
        self.order.first().and_then(|id| self.client(id))
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Ids de nodo en orden de configuración
    pub fn node_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
