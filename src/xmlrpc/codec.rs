//! Codec XML-RPC
//!
//! Serializa `Value`/`Request`/`Response` al formato de cable y los
//! reconstruye desde el XML recibido. La decodificación elige la variante
//! según la etiqueta presente en `<value>`, con esta precedencia:
//! string, i4/int/i8, double, boolean, dateTime.iso8601, array, struct.
//!
//! Formato de fecha: `YYYYMMDDTHH:MM:SS+0000` (el que usan los nodos AIR).
//! Si el valor lleva fracción de segundo se escribe `HH:MM:SS.fff`; al
//! decodificar también se acepta RFC 3339 y la forma sin zona horaria.
//!
//! La profundidad de anidamiento está acotada por `MAX_VALUE_DEPTH`.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use quick_xml::escape::escape;
use std::fmt::Write as _;
use thiserror::Error;

use super::value::{Members, Request, Response, Value};
use super::xml::{self, Element};

const FRAGMENT_MAX_CHARS: usize = 200;
const DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S%z";
const DATETIME_FRACTION_FORMAT: &str = "%Y%m%dT%H:%M:%S%.f%z";

/// Niveles de array/struct admitidos dentro de un `<value>`
pub const MAX_VALUE_DEPTH: usize = 64;

/// Respuesta XML-RPC mal formada o no reconocida
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{reason} (fragment: {fragment})")]
pub struct DecodeError {
    pub reason: String,
    pub fragment: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>, fragment: &str) -> Self {
        Self {
            reason: reason.into(),
            fragment: fragment.chars().take(FRAGMENT_MAX_CHARS).collect(),
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Codifica un valor como elemento `<value>`
pub fn encode_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Codifica el sobre `methodCall` completo
pub fn encode_call(request: &Request) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(request.method_name.as_str()));
    out.push_str("</methodName><params>");
    for param in &request.params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

/// Codifica un `methodResponse` (éxito o fault)
pub fn encode_response(response: &Response) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodResponse>");
    match response {
        Response::Success(data) => {
            out.push_str("<params><param>");
            write_value(&mut out, data);
            out.push_str("</param></params>");
        }
        Response::Fault { code, message } => {
            let fault = Members::new()
                .with("faultCode", *code)
                .with("faultString", message.as_str());
            out.push_str("<fault>");
            write_value(&mut out, &Value::Struct(fault));
            out.push_str("</fault>");
        }
    }
    out.push_str("</methodResponse>\n");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Integer(i) => {
            let _ = write!(out, "<int>{}</int>", i);
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{}</double>", d);
        }
        Value::Boolean(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", if *b { 1 } else { 0 });
        }
        Value::DateTime(dt) => {
            let format = if dt.nanosecond() == 0 {
                DATETIME_FORMAT
            } else {
                DATETIME_FRACTION_FORMAT
            };
            let _ = write!(
                out,
                "<dateTime.iso8601>{}</dateTime.iso8601>",
                dt.format(format)
            );
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members.iter() {
                out.push_str("<member><name>");
                out.push_str(&escape(name));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodifica un `<value>` ya parseado
pub fn decode_value(element: &Element) -> Result<Value, DecodeError> {
    decode_nested(element, 0)
}

fn decode_nested(element: &Element, depth: usize) -> Result<Value, DecodeError> {
    if depth > MAX_VALUE_DEPTH {
        return Err(DecodeError::new("value nesting too deep", &element.describe()));
    }

    if element.name != "value" {
        return Err(DecodeError::new(
            format!("expected <value>, found <{}>", element.name),
            &element.describe(),
        ));
    }

    // <value>texto</value> sin tipo es string
    if element.children.is_empty() {
        return Ok(Value::String(element.text.clone()));
    }

    if let Some(s) = element.child("string") {
        return Ok(Value::String(s.text.clone()));
    }

    if let Some(i) = element
        .child("i4")
        .or_else(|| element.child("int"))
        .or_else(|| element.child("i8"))
    {
        return i
            .text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| DecodeError::new("invalid integer", &i.describe()));
    }

    if let Some(d) = element.child("double") {
        return d
            .text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| DecodeError::new("invalid double", &d.describe()));
    }

    if let Some(b) = element.child("boolean") {
        return match b.text.trim() {
            "1" | "true" => Ok(Value::Boolean(true)),
            "0" | "false" => Ok(Value::Boolean(false)),
            _ => Err(DecodeError::new("invalid boolean", &b.describe())),
        };
    }

    if let Some(dt) = element.child("dateTime.iso8601") {
        return parse_datetime(dt.text.trim())
            .map(Value::DateTime)
            .ok_or_else(|| DecodeError::new("invalid dateTime.iso8601", &dt.describe()));
    }

    if let Some(array) = element.child("array") {
        return decode_array(array, depth + 1);
    }

    if let Some(st) = element.child("struct") {
        return decode_struct(st, depth + 1).map(Value::Struct);
    }

    Ok(Value::Nil)
}

fn decode_array(array: &Element, depth: usize) -> Result<Value, DecodeError> {
    let Some(data) = array.child("data") else {
        return Ok(Value::Array(Vec::new()));
    };

    data.children_named("value")
        .map(|value| decode_nested(value, depth))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn decode_struct(st: &Element, depth: usize) -> Result<Members, DecodeError> {
    let mut members = Members::new();

    // Nombres repetidos: gana el último
    for member in st.children_named("member") {
        let name = member
            .child("name")
            .ok_or_else(|| DecodeError::new("struct member without <name>", &member.describe()))?;
        let value = member
            .child("value")
            .ok_or_else(|| DecodeError::new("struct member without <value>", &member.describe()))?;

        // El nombre se conserva tal cual, igual que el contenido de <string>
        members.insert(name.text.as_str(), decode_nested(value, depth)?);
    }

    Ok(members)
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    for format in [DATETIME_FORMAT, DATETIME_FRACTION_FORMAT] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decodifica el cuerpo de un `methodResponse`
pub fn decode_response(body: &str) -> Result<Response, DecodeError> {
    let root = xml::parse(body)?;

    if root.name != "methodResponse" {
        return Err(DecodeError::new(
            format!("expected <methodResponse>, found <{}>", root.name),
            body,
        ));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| DecodeError::new("<fault> without <value>", body))?;
        return Ok(fault_from_value(&decode_value(value)?));
    }

    let params = root
        .child("params")
        .ok_or_else(|| DecodeError::new("<methodResponse> without <params> or <fault>", body))?;

    let mut values = decode_params(params, body)?;
    let data = match values.len() {
        0 => Value::Nil,
        1 => values.remove(0),
        _ => Value::Array(values),
    };

    Ok(Response::Success(data))
}

/// Decodifica el cuerpo de un `methodCall`
pub fn decode_call(body: &str) -> Result<Request, DecodeError> {
    let root = xml::parse(body)?;

    if root.name != "methodCall" {
        return Err(DecodeError::new(
            format!("expected <methodCall>, found <{}>", root.name),
            body,
        ));
    }

    let method_name = root
        .child("methodName")
        .map(|m| m.text.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| DecodeError::new("<methodCall> without <methodName>", body))?;

    let params = match root.child("params") {
        Some(params) => decode_params(params, body)?,
        None => Vec::new(),
    };

    Ok(Request::new(method_name, params))
}

fn decode_params(params: &Element, body: &str) -> Result<Vec<Value>, DecodeError> {
    params
        .children_named("param")
        .map(|param| {
            let value = param
                .child("value")
                .ok_or_else(|| DecodeError::new("<param> without <value>", body))?;
            decode_value(value)
        })
        .collect()
}

fn fault_from_value(value: &Value) -> Response {
    let code = value.get("faultCode").and_then(|c| match c {
        Value::Integer(i) => Some(*i),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    let message = value
        .get("faultString")
        .and_then(Value::as_str)
        .map(str::to_string);

    Response::Fault {
        code: code.unwrap_or(-1),
        message: message.unwrap_or_else(|| "Unknown fault".to_string()),
    }
}
