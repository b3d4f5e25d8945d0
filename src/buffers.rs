//! Phase-scoped script buffers.
//!
//! Passes append PowerShell statements here instead of emitting one command
//! node each. A flush pass later writes every buffer as one script file plus
//! a single invocation, so statements can share local variables.

use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};

/// The four accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Runs as SYSTEM during specialize.
    Specialize,
    /// Runs when the first user logs on.
    FirstLogon,
    /// Runs once for every user, at that user's first logon.
    UserOnce,
    /// Runs against the mounted default-user hive during specialize.
    DefaultUser,
}

impl BufferKind {
    pub const ALL: [BufferKind; 4] = [
        BufferKind::Specialize,
        BufferKind::FirstLogon,
        BufferKind::UserOnce,
        BufferKind::DefaultUser,
    ];

    /// Fixed path of the flushed script on the target machine.
    pub fn script_path(self) -> &'static str {
        match self {
            BufferKind::Specialize => r"C:\Windows\Setup\Scripts\Specialize.ps1",
            BufferKind::FirstLogon => r"C:\Windows\Setup\Scripts\FirstLogon.ps1",
            BufferKind::UserOnce => r"C:\Windows\Setup\Scripts\UserOnce.ps1",
            BufferKind::DefaultUser => r"C:\Windows\Setup\Scripts\DefaultUser.ps1",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Specialize => write!(f, "Specialize"),
            BufferKind::FirstLogon => write!(f, "FirstLogon"),
            BufferKind::UserOnce => write!(f, "UserOnce"),
            BufferKind::DefaultUser => write!(f, "DefaultUser"),
        }
    }
}

/// Append-only list of statements.
#[derive(Debug, Clone)]
pub struct ScriptBuffer {
    kind: BufferKind,
    statements: Vec<String>,
    flushed: bool,
}

impl ScriptBuffer {
    pub fn new(kind: BufferKind) -> Self {
        Self {
            kind,
            statements: Vec::new(),
            flushed: false,
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn append(&mut self, statement: impl Into<String>) {
        let statement = statement.into();
        trace!(buffer = %self.kind, statement = %statement, "append statement");
        self.statements.push(statement);
    }

    pub fn append_all<I, S>(&mut self, statements: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for statement in statements {
            self.append(statement);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Hand the statements to the flush pass. Only allowed once.
    pub(crate) fn drain(&mut self) -> Result<Vec<String>> {
        if self.flushed {
            return Err(Error::defect(format!(
                "{} buffer flushed twice",
                self.kind
            )));
        }
        self.flushed = true;
        Ok(std::mem::take(&mut self.statements))
    }
}

/// The buffers of one generation run.
#[derive(Debug, Clone)]
pub struct ScriptBuffers {
    specialize: ScriptBuffer,
    first_logon: ScriptBuffer,
    user_once: ScriptBuffer,
    default_user: ScriptBuffer,
}

impl Default for ScriptBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptBuffers {
    pub fn new() -> Self {
        Self {
            specialize: ScriptBuffer::new(BufferKind::Specialize),
            first_logon: ScriptBuffer::new(BufferKind::FirstLogon),
            user_once: ScriptBuffer::new(BufferKind::UserOnce),
            default_user: ScriptBuffer::new(BufferKind::DefaultUser),
        }
    }

    pub fn get(&self, kind: BufferKind) -> &ScriptBuffer {
        match kind {
            BufferKind::Specialize => &self.specialize,
            BufferKind::FirstLogon => &self.first_logon,
            BufferKind::UserOnce => &self.user_once,
            BufferKind::DefaultUser => &self.default_user,
        }
    }

    pub fn get_mut(&mut self, kind: BufferKind) -> &mut ScriptBuffer {
        match kind {
            BufferKind::Specialize => &mut self.specialize,
            BufferKind::FirstLogon => &mut self.first_logon,
            BufferKind::UserOnce => &mut self.user_once,
            BufferKind::DefaultUser => &mut self.default_user,
        }
    }

    pub fn specialize(&mut self) -> &mut ScriptBuffer {
        &mut self.specialize
    }

    pub fn first_logon(&mut self) -> &mut ScriptBuffer {
        &mut self.first_logon
    }

    pub fn user_once(&mut self) -> &mut ScriptBuffer {
        &mut self.user_once
    }

    pub fn default_user(&mut self) -> &mut ScriptBuffer {
        &mut self.default_user
    }

    /// Every buffer was flushed and nothing was appended afterwards.
    pub fn ensure_drained(&self) -> Result<()> {
        for kind in BufferKind::ALL {
            let buffer = self.get(kind);
            if !buffer.flushed {
                return Err(Error::defect(format!("{kind} buffer was never flushed")));
            }
            if !buffer.is_empty() {
                return Err(Error::defect(format!(
                    "{} statement(s) appended to the {kind} buffer after it was flushed",
                    buffer.statements.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut buffers = ScriptBuffers::new();
        buffers.specialize().append("a");
        buffers.specialize().append_all(["b", "c"]);
        assert_eq!(buffers.get(BufferKind::Specialize).statements(), ["a", "b", "c"]);
        assert!(buffers.get(BufferKind::FirstLogon).is_empty());
    }

    #[test]
    fn test_drain_only_once() {
        let mut buffer = ScriptBuffer::new(BufferKind::UserOnce);
        buffer.append("x");
        assert_eq!(buffer.drain().unwrap(), vec!["x".to_string()]);
        assert!(buffer.is_empty());
        assert!(matches!(buffer.drain(), Err(Error::Defect(_))));
    }

    #[test]
    fn test_ensure_drained_detects_late_append() {
        let mut buffers = ScriptBuffers::new();
        assert!(buffers.ensure_drained().is_err());
        for kind in BufferKind::ALL {
            buffers.get_mut(kind).drain().unwrap();
        }
        buffers.ensure_drained().unwrap();

        buffers.first_logon().append("too late");
        let err = buffers.ensure_drained().unwrap_err();
        assert!(err.to_string().contains("FirstLogon"));
    }

    #[test]
    fn test_script_paths_are_distinct() {
        let mut paths: Vec<_> = BufferKind::ALL.iter().map(|k| k.script_path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);
    }
}
