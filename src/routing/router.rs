// src/routing/router.rs
use std::sync::Arc;

use super::registry::NodeRegistry;
use crate::error::GatewayError;
use crate::xmlrpc::AirClient;

/// Selección del nodo destino de una llamada
///
/// Precedencia: `node_id` explícito, luego `routing_key` (round-robin),
/// y si no hay ninguno el primer nodo en orden de configuración.
pub struct RequestRouter {
    registry: NodeRegistry,
}

impl RequestRouter {
    pub fn new(registry: NodeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn select(
        &self,
        node_id: Option<&str>,
        routing_key: Option<&str>,
    ) -> Result<Arc<AirClient>, GatewayError> {
        if let Some(node_id) = node_id {
            return self
                .registry
                .client(node_id)
                .ok_or_else(|| GatewayError::UnknownNode(node_id.to_string()));
        }

        if let Some(routing_key) = routing_key {
            return self
                .registry
                .routes()
                .pool(routing_key)
                .and_then(|pool| pool.next())
                .ok_or_else(|| GatewayError::NoDestinations(routing_key.to_string()));
        }

        self.registry.first().ok_or(GatewayError::NoClients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::NodeDescriptor;
    use crate::routing::ClientSettings;
    use std::collections::HashMap;

    fn descriptor(id: &str, key: Option<&str>) -> NodeDescriptor {
        NodeDescriptor {
            node_id: id.to_string(),
            host: "127.0.0.1".to_string(),
            port: 10010,
            routing_key: key.map(str::to_string),
            active: true,
            environment: "test".to_string(),
        }
    }

    fn router(descriptors: &[NodeDescriptor]) -> RequestRouter {
        RequestRouter::new(NodeRegistry::build(descriptors, &ClientSettings::default()).unwrap())
    }

    #[test]
    fn test_round_robin_sequence_and_cursor() {
        let router = router(&[
            descriptor("A", Some("k")),
            descriptor("B", Some("k")),
            descriptor("C", Some("k")),
        ]);

        let chosen: Vec<String> = (0..7)
            .map(|_| router.select(None, Some("k")).unwrap().node_id().to_string())
            .collect();

        assert_eq!(chosen, vec!["A", "B", "C", "A", "B", "C", "A"]);
        assert_eq!(router.registry().routes().pool("k").unwrap().cursor(), 1);
    }

    #[test]
    fn test_node_id_takes_precedence_over_routing_key() {
        let router = router(&[descriptor("A", Some("k")), descriptor("X", None)]);

        let client = router.select(Some("X"), Some("k")).unwrap();
        assert_eq!(client.node_id(), "X");
        // El cursor de "k" no se movió
        assert_eq!(router.registry().routes().pool("k").unwrap().cursor(), 0);
    }

    #[test]
    fn test_unknown_node() {
        let router = router(&[descriptor("A", None)]);
        let err = router.select(Some("Z"), None).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownNode(id) if id == "Z"));
    }

    #[test]
    fn test_no_destinations_for_key() {
        let router = router(&[descriptor("A", Some("k"))]);
        let err = router.select(None, Some("other")).unwrap_err();
        assert!(matches!(err, GatewayError::NoDestinations(key) if key == "other"));
    }

    #[test]
    fn test_fallback_is_first_in_config_order() {
        let router = router(&[
            descriptor("m", None),
            descriptor("b", Some("k")),
            descriptor("a", None),
        ]);

        for _ in 0..3 {
            assert_eq!(router.select(None, None).unwrap().node_id(), "m");
        }
    }

    #[test]
    fn test_no_clients() {
        let router = router(&[]);
        assert!(matches!(router.select(None, None), Err(GatewayError::NoClients)));
    }

    #[test]
    fn test_concurrent_selection_is_fair() {
        let router = Arc::new(router(&[
            descriptor("A", Some("k")),
            descriptor("B", Some("k")),
            descriptor("C", Some("k")),
        ]));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let router = router.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| router.select(None, Some("k")).unwrap().node_id().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                *counts.entry(id).or_default() += 1;
            }
        }

        assert_eq!(counts.get("A"), Some(&100));
        assert_eq!(counts.get("B"), Some(&100));
        assert_eq!(counts.get("C"), Some(&100));
        assert_eq!(router.registry().routes().pool("k").unwrap().cursor(), 0);
    }
}
