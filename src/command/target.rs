//! Command targeting: "append a command line to phase X".
//!
//! Three phases accept commands, each with its own container shape:
//!
//! ```text
//! windowsPE   Microsoft-Windows-Setup        RunSynchronous/RunSynchronousCommand/Path
//! specialize  Microsoft-Windows-Deployment   RunSynchronous/RunSynchronousCommand/Path
//! oobeSystem  Microsoft-Windows-Shell-Setup  FirstLogonCommands/SynchronousCommand/CommandLine
//! ```
//!
//! The component and container are created on first use and reused after
//! that, so independent passes targeting the same phase share one container
//! and their commands land in call order.

use tracing::trace;

use crate::document::{AnswerDocument, Element};
use crate::error::{Error, Result};
use crate::phase::Phase;

/// Where commands for one phase live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContainerShape {
    pub(crate) component: &'static str,
    pub(crate) container: &'static str,
    pub(crate) item: &'static str,
    pub(crate) field: &'static str,
}

const SETUP_COMMANDS: ContainerShape = ContainerShape {
    component: "Microsoft-Windows-Setup",
    container: "RunSynchronous",
    item: "RunSynchronousCommand",
    field: "Path",
};

const DEPLOYMENT_COMMANDS: ContainerShape = ContainerShape {
    component: "Microsoft-Windows-Deployment",
    container: "RunSynchronous",
    item: "RunSynchronousCommand",
    field: "Path",
};

const FIRST_LOGON_COMMANDS: ContainerShape = ContainerShape {
    component: "Microsoft-Windows-Shell-Setup",
    container: "FirstLogonCommands",
    item: "SynchronousCommand",
    field: "CommandLine",
};

pub(crate) fn shape_for(phase: Phase) -> Option<ContainerShape> {
    match phase {
        Phase::WindowsPe => Some(SETUP_COMMANDS),
        Phase::Specialize => Some(DEPLOYMENT_COMMANDS),
        Phase::OobeSystem => Some(FIRST_LOGON_COMMANDS),
        Phase::OfflineServicing
        | Phase::Generalize
        | Phase::AuditSystem
        | Phase::AuditUser => None,
    }
}

/// Item element name for a container element name, if it is one.
pub(crate) fn item_name_for(container: &str) -> Option<&'static str> {
    [SETUP_COMMANDS, DEPLOYMENT_COMMANDS, FIRST_LOGON_COMMANDS]
        .into_iter()
        .find(|shape| shape.container == container)
        .map(|shape| shape.item)
}

/// Writes command nodes into one phase's container.
#[derive(Debug)]
pub struct Appender<'a> {
    container: &'a mut Element,
    shape: ContainerShape,
    phase: Phase,
}

/// Get an [`Appender`] for `phase`, creating the component and container
/// on first use.
pub fn target(document: &mut AnswerDocument, phase: Phase) -> Result<Appender<'_>> {
    let shape = shape_for(phase).ok_or_else(|| {
        Error::config(format!("pass '{phase}' does not support command injection"))
    })?;
    let container = document
        .component_mut(phase, shape.component)
        .child_or_insert(shape.container);
    Ok(Appender {
        container,
        shape,
        phase,
    })
}

impl Appender<'_> {
    /// Append one command node, unnumbered.
    pub fn append(&mut self, command: impl Into<String>) {
        let command = command.into();
        trace!(phase = %self.phase, command = %command, "append command");
        let field = Element::new(self.shape.field).with_text(command);
        self.container
            .push(Element::new(self.shape.item).with_child(field));
    }

    /// Append one command node per string, in iteration order.
    pub fn append_all<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for command in commands {
            self.append(command);
        }
    }

    /// Number of command nodes in the container.
    pub fn len(&self) -> usize {
        self.container
            .elements()
            .filter(|e| e.local_name() == self.shape.item)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Command lines currently held by `phase`'s container, in document order.
pub fn command_lines(document: &AnswerDocument, phase: Phase) -> Vec<String> {
    let Some(shape) = shape_for(phase) else {
        return Vec::new();
    };
    document
        .component(phase, shape.component)
        .and_then(|component| component.child(shape.container))
        .map(|container| {
            container
                .elements()
                .filter(|item| item.local_name() == shape.item)
                .filter_map(|item| item.child(shape.field))
                .map(Element::text)
                .collect()
        })
        .unwrap_or_default()
}
