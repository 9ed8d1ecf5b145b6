//! AIR XML-RPC Module
//!
//! Este módulo implementa el protocolo UCIP sobre XML-RPC:
//! - `value`: árbol tipado de valores, requests y responses
//! - `codec`: serialización y parseo del sobre XML-RPC
//! - `client`: transporte HTTP hacia un nodo AIR
//!
//! # Uso
//!
//! ```rust,ignore
//! use apolo_air_gateway::xmlrpc::{AirClient, Members, Request, Value};
//!
//! let client = AirClient::new("air01", "http://10.0.0.1:10010/Air", 30_000, 20)?;
//!
//! let request = Request::new(
//!     "GetBalanceAndDate",
//!     vec![Value::Struct(Members::new().with("subscriberNumber", "1234567890"))],
//! );
//! let response = client.call(&request).await?;
//! ```

mod client;
pub mod codec;
mod value;
mod xml;

pub use client::{AirClient, DEFAULT_TIMEOUT_MS, XMLRPC_CONTENT_TYPE};
pub use codec::{decode_call, decode_response, encode_call, encode_response, encode_value, DecodeError};
pub use value::{Members, Request, Response, Value};
