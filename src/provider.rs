// src/provider.rs
//! Proveedor de definiciones de nodos AIR
//!
//! La topología real vive fuera del gateway (caché de configuración en base
//! de datos). Aquí sólo se consume a través de `NodeProvider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Definición de un nodo AIR tal como la entrega el proveedor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub node_id: String,
    pub host: String,
    pub port: u16,
    /// Clave de enrutamiento (tipo de AF)
    #[serde(default)]
    pub routing_key: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub environment: String,
}

fn default_active() -> bool {
    true
}

impl NodeDescriptor {
    /// URL del endpoint XML-RPC del nodo
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }
}

/// Fuente de nodos activos para un entorno de despliegue
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeProvider: Send + Sync {
    /// Nodos del entorno indicado, en orden de configuración
    async fn nodes_for(&self, environment: &str) -> Result<Vec<NodeDescriptor>, GatewayError>;
}

/// Proveedor con una lista fija (variable `AIR_NODES`)
pub struct StaticNodeProvider {
    nodes: Vec<NodeDescriptor>,
}

impl StaticNodeProvider {
    pub fn new(nodes: Vec<NodeDescriptor>) -> Self {
        Self { nodes }
    }
}

#[async_trait]
impl NodeProvider for StaticNodeProvider {
    async fn nodes_for(&self, environment: &str) -> Result<Vec<NodeDescriptor>, GatewayError> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.environment == environment)
            .cloned()
            .collect())
    }
}
