//! The answer document: a namespace-aware tree loaded from the packaged
//! base template, with lazy get-or-create access to per-phase `settings`
//! and per-(phase, name) `component` nodes.

mod element;
mod parse;
mod writer;

pub use element::{Element, Node};

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::phase::Phase;

/// Primary answer-file namespace.
pub const UNATTEND_NS: &str = "urn:schemas-microsoft-com:unattend";
/// State namespace carrying `wcm:action`.
pub const WCM_NS: &str = "http://schemas.microsoft.com/WMIConfig/2002/State";
/// Private namespace for embedded files.
pub const EXTENSIONS_NS: &str = "urn:unattend-assembler:extensions";

/// Starting document for every run.
pub const BASE_TEMPLATE: &str = include_str!("../../resources/base-template.xml");

const PUBLIC_KEY_TOKEN: &str = "31bf3856ad364e35";

/// Processor architecture stamped on generated components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    Amd64,
    X86,
    Arm64,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::X86 => "x86",
            Architecture::Arm64 => "arm64",
        }
    }
}

/// The document one generation run mutates.
#[derive(Debug, Clone)]
pub struct AnswerDocument {
    root: Element,
    architecture: Architecture,
}

impl AnswerDocument {
    /// Load a fresh copy of the base template.
    pub fn from_template(architecture: Architecture) -> Result<Self> {
        let root = Element::parse(BASE_TEMPLATE)
            .map_err(|e| Error::defect(format!("packaged base template: {e}")))?;
        Ok(Self { root, architecture })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn settings(&self, phase: Phase) -> Option<&Element> {
        self.root
            .elements()
            .find(|e| is_settings_for(e, phase))
    }

    /// The `settings` element for `phase`, created if the template lacks it.
    pub fn settings_mut(&mut self, phase: Phase) -> &mut Element {
        self.root.child_or_insert_with(
            |e| is_settings_for(e, phase),
            || Element::new("settings").with_attr("pass", phase.pass_name()),
        )
    }

    pub fn component(&self, phase: Phase, name: &str) -> Option<&Element> {
        self.settings(phase)?
            .elements()
            .find(|e| is_component_named(e, name))
    }

    /// The component `name` in `phase`, created once on first access.
    pub fn component_mut(&mut self, phase: Phase, name: &str) -> &mut Element {
        let architecture = self.architecture;
        self.settings_mut(phase).child_or_insert_with(
            |e| is_component_named(e, name),
            || new_component(name, architecture),
        )
    }

    /// Insert a caller-supplied component verbatim.
    ///
    /// Fails when `phase` already holds a component with the same name.
    pub fn insert_verbatim_component(&mut self, phase: Phase, mut component: Element) -> Result<()> {
        let name = component
            .attr("name")
            .ok_or_else(|| Error::config("custom component has no 'name' attribute"))?
            .to_string();
        if self.component(phase, &name).is_some() {
            return Err(Error::config(format!(
                "custom component '{name}' in pass '{phase}' collides with a generated component"
            )));
        }
        component.mark_verbatim();
        self.settings_mut(phase).push(component);
        Ok(())
    }

    /// Canonical text form: tab-indented, CRLF, no XML declaration.
    pub fn to_canonical_string(&self) -> String {
        self.root.to_canonical_string()
    }

    /// Canonical UTF-8 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_canonical_string().into_bytes()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

fn is_settings_for(element: &Element, phase: Phase) -> bool {
    element.local_name() == "settings" && element.attr("pass") == Some(phase.pass_name())
}

fn is_component_named(element: &Element, name: &str) -> bool {
    element.local_name() == "component" && element.attr("name") == Some(name)
}

fn new_component(name: &str, architecture: Architecture) -> Element {
    Element::new("component")
        .with_attr("name", name)
        .with_attr("processorArchitecture", architecture.as_str())
        .with_attr("publicKeyToken", PUBLIC_KEY_TOKEN)
        .with_attr("language", "neutral")
        .with_attr("versionScope", "nonSxS")
}
