//! Tipos de datos XML-RPC
//!
//! `Value` es el árbol tipado que viaja en los `params` de una llamada UCIP.
//! Los structs conservan el orden de inserción y no admiten nombres repetidos.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Valor XML-RPC
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Array(Vec<Value>),
    Struct(Members),
    /// `<nil/>` o un `<value>` sin tipo reconocido
    Nil,
}

/// Miembros de un struct XML-RPC, en orden de inserción
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Members(Vec<(String, Value)>);

impl Members {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserta un miembro. Si el nombre ya existe se sobrescribe el valor
    /// manteniendo su posición original.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();

        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Variante encadenable de `insert`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserta sólo si hay valor
    pub fn with_opt<V: Into<Value>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Members {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut members = Members::new();
        for (name, value) in iter {
            members.insert(name, value);
        }
        members
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Members> {
        match self {
            Value::Struct(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Atajo para leer un miembro de un struct
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|m| m.get(name))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Members> for Value {
    fn from(v: Members) -> Self {
        Value::Struct(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

// JSON plano hacia la capa HTTP
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::Nil => serializer.serialize_unit(),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, value) in members.iter() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

/// Llamada XML-RPC: nombre del método y parámetros posicionales
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method_name: String,
    pub params: Vec<Value>,
}

impl Request {
    pub fn new(method_name: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method_name: method_name.into(),
            params,
        }
    }
}

/// Respuesta normalizada de un nodo AIR
///
/// Un `Fault` no es un error de transporte: el nodo contestó correctamente
/// que no puede atender la operación.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `params` con un único valor, o `Value::Array` si llegaron varios
    Success(Value),
    Fault { code: i64, message: String },
}

impl Response {
    pub fn response_code(&self) -> i64 {
        match self {
            Response::Success(_) => 0,
            Response::Fault { code, .. } => *code,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Response::Fault { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Response::Success(data) => Some(data),
            Response::Fault { .. } => None,
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("responseCode", &self.response_code())?;
        match self {
            Response::Success(data) => map.serialize_entry("data", data)?,
            Response::Fault { message, .. } => map.serialize_entry("responseMessage", message)?,
        }
        map.end()
    }
}
