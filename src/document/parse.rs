//! Event-driven parser building an [`Element`] tree with resolved namespaces.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::element::{Element, Node};
use crate::error::{Error, Result};

/// Prefix bindings declared on one element; `None` is the default namespace.
type Scope = Vec<(Option<String>, String)>;

pub(crate) fn parse_element(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(markup)? {
            Event::Start(start) => {
                ensure_single_root(&root)?;
                let element = open(&start, &mut scopes)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                ensure_single_root(&root)?;
                let element = open(&start, &mut scopes)?;
                scopes.pop();
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Markup("unexpected closing tag".into()))?;
                scopes.pop();
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(markup)?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Markup(format!(
            "element '{}' is never closed",
            open.name()
        )));
    }
    root.ok_or_else(|| Error::Markup("document has no root element".into()))
}

fn open(start: &BytesStart<'_>, scopes: &mut Vec<Scope>) -> Result<Element> {
    let name = utf8(start.name().as_ref())?;
    let mut element = Element::new(name);
    let mut scope = Scope::new();

    for attr in start.attributes() {
        let attr = attr.map_err(markup)?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(markup)?.into_owned();
        if key == "xmlns" {
            scope.push((None, value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((Some(prefix.to_string()), value.clone()));
        }
        element.set_attr(key, value);
    }

    scopes.push(scope);
    let namespace = resolve(scopes, element.prefix());
    element.set_namespace(namespace);
    Ok(element)
}

fn close(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.push_node(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.push_node(Node::Text(text.to_string()));
            Ok(())
        }
        None => Err(Error::Markup(format!(
            "text outside the root element: '{}'",
            text.trim()
        ))),
    }
}

fn resolve(scopes: &[Scope], prefix: Option<&str>) -> Option<String> {
    scopes.iter().rev().find_map(|scope| {
        scope
            .iter()
            .find(|(bound, _)| bound.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
    })
}

fn ensure_single_root(root: &Option<Element>) -> Result<()> {
    match root {
        Some(existing) => Err(Error::Markup(format!(
            "content after the root element '{}'",
            existing.name()
        ))),
        None => Ok(()),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(markup)
}

fn markup(err: impl std::fmt::Display) -> Error {
    Error::Markup(err.to_string())
}
