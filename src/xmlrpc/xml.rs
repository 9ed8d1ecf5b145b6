//! Árbol XML mínimo sobre los eventos de `quick-xml`
//!
//! Sólo conserva lo que XML-RPC necesita: nombre local, texto y subelementos.
//! Los atributos, comentarios e instrucciones de proceso se descartan.
//! Los documentos con más de `MAX_ELEMENT_DEPTH` niveles se rechazan.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::codec::DecodeError;

/// Cubre de sobra `MAX_VALUE_DEPTH` (tres elementos por nivel) más el sobre
pub const MAX_ELEMENT_DEPTH: usize = 256;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Primer hijo con ese nombre
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Fragmento aproximado para mensajes de error
    pub fn describe(&self) -> String {
        if self.children.is_empty() {
            format!("<{}>{}</{}>", self.name, self.text, self.name)
        } else {
            let inner: Vec<&str> = self.children.iter().map(|c| c.name.as_str()).collect();
            format!("<{}>[{}]</{}>", self.name, inner.join(","), self.name)
        }
    }
}

/// Parsea un documento completo y devuelve el elemento raíz
pub fn parse(input: &str) -> Result<Element, DecodeError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(DecodeError::new("element nesting too deep", input));
                }
                stack.push(Element::named(local_name(e.local_name().as_ref(), input)?));
            }
            Ok(Event::Empty(e)) => {
                let element = Element::named(local_name(e.local_name().as_ref(), input)?);
                attach(&mut stack, &mut root, element, input)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::new("unexpected closing tag", input))?;
                attach(&mut stack, &mut root, element, input)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| DecodeError::new(format!("invalid text: {}", e), input))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DecodeError::new(format!("malformed XML: {}", e), input));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::new(
            format!("unclosed element <{}>", open.name),
            input,
        ));
    }

    root.ok_or_else(|| DecodeError::new("empty document", input))
}

fn local_name(raw: &[u8], input: &str) -> Result<String, DecodeError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|_| DecodeError::new("element name is not UTF-8", input))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    input: &str,
) -> Result<(), DecodeError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(DecodeError::new("more than one root element", input));
    }
    *root = Some(element);
    Ok(())
}
