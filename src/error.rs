// src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::xmlrpc::DecodeError;

/// Errores del gateway AIR
///
/// Un fault XML-RPC no aparece aquí: se devuelve como `Response::Fault`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(#[from] DecodeError),

    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: request took longer than {0}ms")]
    Timeout(u64),

    #[error("Unknown AIR node: {0}")]
    UnknownNode(String),

    #[error("No destinations for routing key: {0}")]
    NoDestinations(String),

    #[error("No AIR clients registered")]
    NoClients,

    #[error("Gateway not initialized")]
    NotInitialized,

    #[error("No AIR nodes configured for environment: {0}")]
    NoNodesConfigured(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Node provider error: {0}")]
    Provider(String),
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(json!({
            "error": self.error_code(),
            "message": self.to_string(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UnknownNode(_) => StatusCode::NOT_FOUND,
            GatewayError::NoDestinations(_) | GatewayError::NoClients => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::NotInitialized | GatewayError::NoNodesConfigured(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::ProtocolDecode(_)
            | GatewayError::HttpStatus { .. }
            | GatewayError::Connection(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl GatewayError {
    pub fn error_code(&self) -> &str {
        match self {
            GatewayError::ProtocolDecode(_) => "protocol_decode_error",
            GatewayError::HttpStatus { .. } => "transport_error",
            GatewayError::Connection(_) => "transport_error",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::UnknownNode(_) => "unknown_node",
            GatewayError::NoDestinations(_) => "no_destinations",
            GatewayError::NoClients => "no_clients",
            GatewayError::NotInitialized => "not_initialized",
            GatewayError::NoNodesConfigured(_) => "no_nodes_configured",
            GatewayError::Config(_) => "config_error",
            GatewayError::Provider(_) => "provider_error",
        }
    }

    /// Errores de enrutamiento: no se llegó a intentar la llamada de red
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            GatewayError::UnknownNode(_) | GatewayError::NoDestinations(_) | GatewayError::NoClients
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::NotInitialized.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(GatewayError::Timeout(50).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            GatewayError::UnknownNode("air9".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::HttpStatus {
                status: 500,
                body: String::new()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_decode_error_conversion() {
        let err: GatewayError = DecodeError::new("bad", "<x/>").into();
        assert_eq!(err.error_code(), "protocol_decode_error");
        assert!(err.to_string().contains("<x/>"));
    }
}
