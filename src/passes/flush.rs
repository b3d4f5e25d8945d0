//! Buffer flushes: one script file and one invocation per non-empty buffer.
//!
//! | Buffer      | File written in | Invoked by                                  |
//! |-------------|-----------------|---------------------------------------------|
//! | UserOnce    | specialize      | a DefaultUser statement registering RunOnce |
//! | DefaultUser | specialize      | hive load, `-File`, hive unload (specialize)|
//! | Specialize  | specialize      | `-File` in specialize                       |
//! | FirstLogon  | oobeSystem      | `-File` in first-logon commands             |
//!
//! UserOnce has to flush before DefaultUser since it appends to it.

use tracing::debug;

use crate::buffers::BufferKind;
use crate::codec;
use crate::command::{self, target, DEFAULT_USER_HIVE_FILE, DEFAULT_USER_HIVE_KEY};
use crate::error::Result;
use crate::phase::Phase;

use super::{Pass, PassContext};

const RUN_ONCE_KEY: &str = r"HKEY_USERS\DefaultUser\Software\Microsoft\Windows\CurrentVersion\RunOnce";

/// Flush pass for one buffer.
#[derive(Debug, Clone, Copy)]
pub struct Flush(pub BufferKind);

impl Pass for Flush {
    fn name(&self) -> &str {
        match self.0 {
            BufferKind::Specialize => "flush-specialize",
            BufferKind::FirstLogon => "flush-first-logon",
            BufferKind::UserOnce => "flush-user-once",
            BufferKind::DefaultUser => "flush-default-user",
        }
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let kind = self.0;
        let statements = ctx.buffers.get_mut(kind).drain()?;
        if statements.is_empty() {
            return Ok(());
        }

        let path = kind.script_path();
        let plan = codec::write_to_file(path, &statements.join("\r\n"));
        debug!(buffer = %kind, statements = statements.len(), commands = plan.len(), "flushing buffer");

        match kind {
            BufferKind::UserOnce => {
                target(ctx.document, Phase::Specialize)?.append_all(plan);
                ctx.buffers.default_user().append(format!(
                    "[Microsoft.Win32.Registry]::SetValue( {}, 'UserOnce', {} )",
                    command::ps_literal(RUN_ONCE_KEY),
                    command::ps_literal(&command::powershell_file(path)),
                ));
            }
            BufferKind::DefaultUser => {
                let mut specialize = target(ctx.document, Phase::Specialize)?;
                specialize.append_all(plan);
                specialize.append(command::registry_load(
                    DEFAULT_USER_HIVE_KEY,
                    DEFAULT_USER_HIVE_FILE,
                ));
                specialize.append(command::powershell_file(path));
                specialize.append(command::registry_unload(DEFAULT_USER_HIVE_KEY));
            }
            BufferKind::Specialize => {
                let mut specialize = target(ctx.document, Phase::Specialize)?;
                specialize.append_all(plan);
                specialize.append(command::powershell_file(path));
            }
            BufferKind::FirstLogon => {
                let mut first_logon = target(ctx.document, Phase::OobeSystem)?;
                first_logon.append_all(plan);
                first_logon.append(command::powershell_file(path));
            }
        }
        Ok(())
    }
}
