// src/lib.rs
//! Apolo AIR Gateway
//!
//! Traduce operaciones de saldo (consulta, recarga, ajuste, detalle de
//! cuenta) a llamadas UCIP sobre XML-RPC contra uno o varios nodos AIR, y
//! enruta cada llamada al nodo correspondiente.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod provider;
pub mod routing;
pub mod xmlrpc;

pub use error::GatewayError;
pub use gateway::AirGateway;
