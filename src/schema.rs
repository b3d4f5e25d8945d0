//! Structural schema for finished answer documents.
//!
//! The schema is a TOML file keyed by element local name:
//!
//! ```toml
//! target_namespace = "urn:schemas-microsoft-com:unattend"
//! root = "unattend"
//! foreign_namespaces = ["urn:unattend-assembler:extensions"]
//!
//! [elements.RunSynchronousCommand]
//! children = ["Order", "Path", "Description"]
//! required_children = ["Order", "Path"]
//! attributes = ["wcm:action"]
//!
//! [elements.Order]
//! content = "integer"
//! ```
//!
//! Namespace declarations (`xmlns`, `xmlns:*`) are always allowed. Elements
//! in a foreign namespace are skipped together with their subtree.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::document::Element;
use crate::error::{Error, Result};

/// Packaged definition used by the validation pass.
pub const PACKAGED_SCHEMA: &str = include_str!("../resources/unattend-schema.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    target_namespace: String,
    root: String,
    #[serde(default)]
    foreign_namespaces: Vec<String>,
    elements: BTreeMap<String, ElementRule>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Content {
    /// Child elements only, each one declared.
    #[default]
    Elements,
    Text,
    Integer,
    Boolean,
    /// Declared children are checked, undeclared ones and text are skipped.
    Lax,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ElementRule {
    content: Content,
    children: Vec<String>,
    required_children: Vec<String>,
    attributes: Vec<String>,
    required_attributes: Vec<String>,
    /// Allowed values per attribute.
    values: BTreeMap<String, Vec<String>>,
    /// Allowed text for text content.
    one_of: Vec<String>,
    /// Attribute that must be unique among same-named children.
    unique_attribute: Option<String>,
    /// Grandchild whose text must be unique among children.
    unique_child_text: Option<String>,
}

impl Schema {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let schema: Schema =
            toml::from_str(text).map_err(|e| Error::config(format!("parsing schema: {e}")))?;
        schema.check_references()?;
        Ok(schema)
    }

    /// The packaged schema, parsed once per process.
    pub fn packaged() -> Result<&'static Schema> {
        static PACKAGED: OnceLock<std::result::Result<Schema, String>> = OnceLock::new();
        PACKAGED
            .get_or_init(|| Schema::from_toml_str(PACKAGED_SCHEMA).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| Error::defect(format!("packaged schema: {e}")))
    }

    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    /// Check the namespace first, then the structure.
    pub fn validate(&self, root: &Element) -> Result<()> {
        let found = root.namespace().unwrap_or_default();
        if found != self.target_namespace {
            return Err(Error::NamespaceMismatch {
                expected: self.target_namespace.clone(),
                found: found.to_string(),
            });
        }
        let path = format!("/{}", root.local_name());
        if root.local_name() != self.root {
            return Err(Error::schema(
                path,
                format!("root element must be '{}'", self.root),
            ));
        }
        self.check_element(root, &path)
    }

    fn check_references(&self) -> Result<()> {
        if !self.elements.contains_key(&self.root) {
            return Err(Error::config(format!("root '{}' has no rule", self.root)));
        }
        for (name, rule) in &self.elements {
            for child in rule.children.iter().chain(&rule.required_children) {
                if !self.elements.contains_key(child) {
                    return Err(Error::config(format!(
                        "'{name}' lists child '{child}' which has no rule"
                    )));
                }
            }
        }
        Ok(())
    }

    fn is_foreign(&self, element: &Element) -> bool {
        element
            .namespace()
            .is_some_and(|ns| self.foreign_namespaces.iter().any(|f| f == ns))
    }

    fn check_element(&self, element: &Element, path: &str) -> Result<()> {
        let rule = self
            .elements
            .get(element.local_name())
            .ok_or_else(|| Error::schema(path, "element is not declared"))?;
        check_attributes(element, rule, path)?;

        match rule.content {
            Content::Elements | Content::Lax => self.check_children(element, rule, path),
            Content::Text | Content::Integer | Content::Boolean => {
                check_text(element, rule, path)
            }
        }
    }

    fn check_children(&self, element: &Element, rule: &ElementRule, path: &str) -> Result<()> {
        let lax = rule.content == Content::Lax;
        if !lax && !element.text().trim().is_empty() {
            return Err(Error::schema(path, "text is not allowed here"));
        }

        let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
        for child in element.elements() {
            if self.is_foreign(child) {
                continue;
            }
            let name = child.local_name();
            let position = positions.entry(name).or_default();
            *position += 1;
            let child_path = format!("{path}/{}", segment(child, *position));

            if child.namespace() != Some(self.target_namespace.as_str()) {
                return Err(Error::schema(
                    child_path,
                    format!(
                        "element is in namespace '{}'",
                        child.namespace().unwrap_or_default()
                    ),
                ));
            }
            if !rule.children.iter().any(|c| c == name) {
                if lax {
                    continue;
                }
                return Err(Error::schema(
                    child_path,
                    format!("'{name}' is not allowed in '{}'", element.local_name()),
                ));
            }
            self.check_element(child, &child_path)?;
        }

        for required in &rule.required_children {
            if element.child(required).is_none() {
                return Err(Error::schema(
                    path,
                    format!("missing required child '{required}'"),
                ));
            }
        }
        check_uniqueness(element, rule, path)
    }
}

fn check_attributes(element: &Element, rule: &ElementRule, path: &str) -> Result<()> {
    for (name, value) in element.attributes() {
        if name == "xmlns" || name.starts_with("xmlns:") {
            continue;
        }
        if !rule.attributes.iter().any(|a| a == name) {
            return Err(Error::schema(
                path,
                format!("attribute '{name}' is not allowed"),
            ));
        }
        if let Some(allowed) = rule.values.get(name) {
            if !allowed.iter().any(|v| v == value) {
                return Err(Error::schema(
                    path,
                    format!("attribute '{name}' has invalid value '{value}'"),
                ));
            }
        }
    }
    for required in &rule.required_attributes {
        if element.attr(required).is_none() {
            return Err(Error::schema(
                path,
                format!("missing required attribute '{required}'"),
            ));
        }
    }
    Ok(())
}

fn check_text(element: &Element, rule: &ElementRule, path: &str) -> Result<()> {
    if element.elements().next().is_some() {
        return Err(Error::schema(path, "child elements are not allowed here"));
    }
    let text = element.text();
    let value = text.trim();
    match rule.content {
        Content::Integer if value.parse::<u64>().is_err() => {
            return Err(Error::schema(path, format!("'{value}' is not an integer")));
        }
        Content::Boolean if !matches!(value, "true" | "false") => {
            return Err(Error::schema(path, format!("'{value}' is not a boolean")));
        }
        _ => {}
    }
    if !rule.one_of.is_empty() && !rule.one_of.iter().any(|v| v == value) {
        return Err(Error::schema(
            path,
            format!("'{value}' is not one of {}", rule.one_of.join(", ")),
        ));
    }
    Ok(())
}

fn check_uniqueness(element: &Element, rule: &ElementRule, path: &str) -> Result<()> {
    if let Some(attribute) = &rule.unique_attribute {
        let mut seen = HashSet::new();
        for child in element.elements() {
            if let Some(value) = child.attr(attribute) {
                if !seen.insert((child.local_name(), value)) {
                    return Err(Error::schema(
                        path,
                        format!("duplicate {} with {attribute}='{value}'", child.local_name()),
                    ));
                }
            }
        }
    }
    if let Some(grandchild) = &rule.unique_child_text {
        let mut seen = HashSet::new();
        for value in element
            .elements()
            .filter_map(|child| child.child(grandchild))
            .map(Element::text)
        {
            if !seen.insert(value.trim().to_string()) {
                return Err(Error::schema(
                    path,
                    format!("duplicate {grandchild} '{}'", value.trim()),
                ));
            }
        }
    }
    Ok(())
}

/// Path segment, qualified by `pass`/`name` when present, else by position.
fn segment(element: &Element, position: usize) -> String {
    let name = element.local_name();
    match (element.attr("pass"), element.attr("name")) {
        (Some(pass), _) => format!("{name}[@pass='{pass}']"),
        (None, Some(key)) => format!("{name}[@name='{key}']"),
        (None, None) => format!("{name}[{position}]"),
    }
}
