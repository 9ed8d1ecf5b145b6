//! Cliente HTTP XML-RPC para nodos AIR
//!
//! Un `AirClient` por nodo. Cada llamada es un único POST sin reintentos ni
//! redirecciones; la política de reintento queda del lado del llamador.

use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, ClientBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

use super::codec;
use super::value::{Request, Response};
use crate::error::GatewayError;

/// Media type XML-RPC
pub const XMLRPC_CONTENT_TYPE: &str = "text/xml";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Cliente para comunicación con un nodo AIR
#[derive(Debug)]
pub struct AirClient {
    http_client: Client,
    node_id: String,
    endpoint_url: String,
    timeout: Duration,
}

impl AirClient {
    /// Crea un nuevo cliente AIR
    ///
    /// # Arguments
    ///
    /// * `node_id` - Identificador del nodo (ej: "air01")
    /// * `endpoint_url` - URL completa (ej: "http://10.0.0.1:10010/Air")
    /// * `timeout_ms` - Timeout por llamada en milisegundos
    /// * `max_connections` - Conexiones ociosas a conservar por nodo
    pub fn new(
        node_id: &str,
        endpoint_url: &str,
        timeout_ms: u64,
        max_connections: usize,
    ) -> Result<Self, GatewayError> {
        let timeout = Duration::from_millis(timeout_ms);

        let http_client = ClientBuilder::new()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(max_connections)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        Ok(Self {
            http_client,
            node_id: node_id.to_string(),
            endpoint_url: endpoint_url.to_string(),
            timeout,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ejecuta una llamada XML-RPC contra el nodo
    ///
    /// Devuelve `Response::Fault` si el nodo contestó con `<fault>`; cualquier
    /// status no-2xx, fallo de conexión, timeout o cuerpo ilegible es error.
    #[instrument(skip(self, request), fields(node = %self.node_id, method = %request.method_name))]
    pub async fn call(&self, request: &Request) -> Result<Response, GatewayError> {
        let body = codec::encode_call(request);

        debug!("AIR request: endpoint={}, body={}", self.endpoint_url, body);

        let started = Instant::now();

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, XMLRPC_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        debug!(
            "AIR response: status={}, latency_ms={}",
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            error!("AIR HTTP error: node={}, status={}", self.node_id, status);
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(codec::decode_response(&text)?)
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout.as_millis() as u64)
        } else {
            GatewayError::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AirClient::new("air01", "http://localhost:10010/Air", DEFAULT_TIMEOUT_MS, 20);
        assert!(client.is_ok());
    }

    #[test]
    fn test_accessors() {
        let client = AirClient::new("air02", "http://10.0.0.2:10010/Air", 250, 4).unwrap();

        assert_eq!(client.node_id(), "air02");
        assert_eq!(client.endpoint_url(), "http://10.0.0.2:10010/Air");
        assert_eq!(client.timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Puerto 1 en loopback: nadie escucha
        let client = AirClient::new("air03", "http://127.0.0.1:1/Air", 2_000, 1).unwrap();
        let request = Request::new("GetBalanceAndDate", vec![]);

        let err = client.call(&request).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Connection(_) | GatewayError::Timeout(_)
        ));
    }
}
