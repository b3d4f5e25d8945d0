//! Caller scripts.
//!
//! PowerShell scripts are spliced into the matching buffer. Every other
//! kind is attached as an embedded file and the buffer only gets a line
//! that runs it.

use tracing::debug;

use crate::buffers::BufferKind;
use crate::error::Result;
use crate::extensions;
use crate::settings::{ScriptKind, ScriptPhase};

use super::{Pass, PassContext};

const SCRIPT_DIR: &str = r"C:\Windows\Setup\Scripts";

pub struct Scripts;

impl Pass for Scripts {
    fn name(&self) -> &str {
        "scripts"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        for (index, script) in ctx.config.scripts.iter().enumerate() {
            let buffer = buffer_for(script.phase);
            let statement = match script.kind {
                ScriptKind::Ps1 => script.content.clone(),
                kind => {
                    let path = script_path(index + 1, kind);
                    extensions::attach_text(ctx.document, &path, &script.content)?;
                    invocation(kind, &path)
                }
            };
            debug!(index, buffer = %buffer, kind = script.kind.extension(), "queued caller script");
            ctx.buffers.get_mut(buffer).append(statement);
        }
        Ok(())
    }
}

fn buffer_for(phase: ScriptPhase) -> BufferKind {
    match phase {
        ScriptPhase::System => BufferKind::Specialize,
        ScriptPhase::FirstLogon => BufferKind::FirstLogon,
        ScriptPhase::UserOnce => BufferKind::UserOnce,
        ScriptPhase::DefaultUser => BufferKind::DefaultUser,
    }
}

fn script_path(number: usize, kind: ScriptKind) -> String {
    format!(r"{SCRIPT_DIR}\unattend-{number:02}.{}", kind.extension())
}

fn invocation(kind: ScriptKind, path: &str) -> String {
    match kind {
        ScriptKind::Ps1 => format!("& '{path}'"),
        ScriptKind::Cmd => format!(r#"cmd.exe /c "{path}""#),
        ScriptKind::Reg => format!(r#"reg.exe import "{path}""#),
        ScriptKind::Vbs => format!(r#"cscript.exe //E:vbscript "{path}""#),
        ScriptKind::Js => format!(r#"cscript.exe //E:jscript "{path}""#),
    }
}
