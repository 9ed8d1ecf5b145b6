// src/config.rs
use std::env;
use std::time::Duration;

use crate::error::GatewayError;
use crate::gateway::{GatewaySettings, Origin};
use crate::provider::NodeDescriptor;
use crate::routing::ClientSettings;
use crate::xmlrpc::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub air_nodes: Vec<NodeDescriptor>,
    pub air_path: String,
    pub air_timeout_ms: u64,
    pub air_max_connections_per_node: usize,
    pub origin_node_type: String,
    pub origin_host: Option<String>,
    /// 0 desactiva el reporte periódico
    pub stats_report_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenv::dotenv().ok();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string());

        let air_nodes =
            Self::parse_air_nodes(&env::var("AIR_NODES").unwrap_or_default(), &environment)?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 9100)?,
            air_nodes,
            air_path: env::var("AIR_PATH").unwrap_or_else(|_| "/Air".to_string()),
            air_timeout_ms: parse_var("AIR_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            air_max_connections_per_node: parse_var("AIR_MAX_CONNECTIONS_PER_NODE", 20)?,
            origin_node_type: env::var("AIR_ORIGIN_NODE_TYPE").unwrap_or_else(|_| "EXT".to_string()),
            origin_host: env::var("AIR_ORIGIN_HOST").ok(),
            stats_report_interval_secs: parse_var("STATS_REPORT_INTERVAL_SECS", 60)?,
            environment,
        })
    }

    /// Formato: `id:host:port[:routingKey[:environment[:active]]]`, separados por coma
    pub fn parse_air_nodes(
        nodes_str: &str,
        default_environment: &str,
    ) -> Result<Vec<NodeDescriptor>, GatewayError> {
        if nodes_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut nodes = Vec::new();

        for node_config in nodes_str.split(',') {
            let node_config = node_config.trim();
            if node_config.is_empty() {
                continue;
            }

            let parts: Vec<&str> = node_config.split(':').map(str::trim).collect();
            if parts.len() < 3 || parts.len() > 6 || parts[0].is_empty() || parts[1].is_empty() {
                return Err(GatewayError::Config(format!(
                    "Invalid AIR_NODES entry: {}",
                    node_config
                )));
            }

            let port = parts[2].parse().map_err(|_| {
                GatewayError::Config(format!("Invalid port in AIR_NODES entry: {}", node_config))
            })?;

            let routing_key = parts
                .get(3)
                .filter(|k| !k.is_empty())
                .map(|k| k.to_string());

            let environment = parts
                .get(4)
                .filter(|e| !e.is_empty())
                .map(|e| e.to_string())
                .unwrap_or_else(|| default_environment.to_string());

            let active = match parts.get(5).copied() {
                None | Some("") | Some("true") | Some("1") => true,
                Some("false") | Some("0") => false,
                Some(other) => {
                    return Err(GatewayError::Config(format!(
                        "Invalid active flag '{}' in AIR_NODES entry: {}",
                        other, node_config
                    )))
                }
            };

            nodes.push(NodeDescriptor {
                node_id: parts[0].to_string(),
                host: parts[1].to_string(),
                port,
                routing_key,
                active,
                environment,
            });
        }

        Ok(nodes)
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        let default_origin = Origin::default();

        GatewaySettings {
            environment: self.environment.clone(),
            client: ClientSettings {
                path: self.air_path.clone(),
                timeout_ms: self.air_timeout_ms,
                max_connections_per_node: self.air_max_connections_per_node,
            },
            origin: Origin {
                node_type: self.origin_node_type.clone(),
                host_name: self
                    .origin_host
                    .clone()
                    .unwrap_or(default_origin.host_name),
            },
        }
    }

    pub fn stats_report_interval(&self) -> Option<Duration> {
        (self.stats_report_interval_secs > 0)
            .then(|| Duration::from_secs(self.stats_report_interval_secs))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, GatewayError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GatewayError::Config(format!("Invalid {}: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_entry() {
        let nodes = Config::parse_air_nodes("air01:10.0.0.1:10010", "production").unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node_id, "air01");
        assert_eq!(nodes[0].host, "10.0.0.1");
        assert_eq!(nodes[0].port, 10010);
        assert_eq!(nodes[0].routing_key, None);
        assert_eq!(nodes[0].environment, "production");
        assert!(nodes[0].active);
    }

    #[test]
    fn test_parse_full_entries() {
        let nodes = Config::parse_air_nodes(
            "air01:10.0.0.1:10010:AF1:staging:false, air02:10.0.0.2:10010::,air03:h3:1:AF2",
            "production",
        )
        .unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].routing_key.as_deref(), Some("AF1"));
        assert_eq!(nodes[0].environment, "staging");
        assert!(!nodes[0].active);
        assert_eq!(nodes[1].routing_key, None);
        assert_eq!(nodes[1].environment, "production");
        assert_eq!(nodes[2].routing_key.as_deref(), Some("AF2"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(Config::parse_air_nodes("", "production").unwrap().is_empty());
        assert!(Config::parse_air_nodes("  ", "production").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Config::parse_air_nodes("air01:10.0.0.1", "p").is_err());
        assert!(Config::parse_air_nodes("air01:10.0.0.1:notaport", "p").is_err());
        assert!(Config::parse_air_nodes("air01:h:1:k:e:maybe", "p").is_err());
        assert!(Config::parse_air_nodes(":h:1", "p").is_err());
    }

    #[test]
    fn test_gateway_settings_mapping() {
        let config = Config {
            environment: "staging".to_string(),
            host: "0.0.0.0".to_string(),
            port: 9100,
            air_nodes: vec![],
            air_path: "/Air".to_string(),
            air_timeout_ms: 1500,
            air_max_connections_per_node: 8,
            origin_node_type: "EXT".to_string(),
            origin_host: Some("gw01".to_string()),
            stats_report_interval_secs: 0,
        };

        let settings = config.gateway_settings();
        assert_eq!(settings.environment, "staging");
        assert_eq!(settings.client.timeout_ms, 1500);
        assert_eq!(settings.client.max_connections_per_node, 8);
        assert_eq!(settings.origin.host_name, "gw01");
        assert!(config.stats_report_interval().is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:9100");
    }
}
