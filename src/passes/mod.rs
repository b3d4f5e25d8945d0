//! Transformation passes.
//!
//! A pass reads the settings and mutates the shared document and script
//! buffers. Passes never talk to each other directly: whatever one pass
//! leaves in the document or a buffer is all the next one sees.
//!
//! # Example
//!
//! ```rust
//! use unattend_assembler::passes::{Pass, PassContext};
//! use unattend_assembler::Result;
//!
//! struct Marker;
//!
//! impl Pass for Marker {
//!     fn name(&self) -> &str { "marker" }
//!     fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
//!         ctx.buffers.specialize().append("Write-Host 'marker'");
//!         Ok(())
//!     }
//! }
//! ```

mod accounts;
mod bypass;
mod cleanup;
mod custom;
mod disk;
mod edition;
mod features;
mod flush;
mod identity;
mod locales;
mod order;
mod policy;
mod scripts;
mod validate;
mod wifi;

pub use accounts::Accounts;
pub use bypass::Bypass;
pub use cleanup::Cleanup;
pub use custom::CustomComponents;
pub use disk::Disk;
pub use edition::Edition;
pub use features::Features;
pub use flush::Flush;
pub use identity::{ComputerName, TimeZone};
pub use locales::Locales;
pub use order::Order;
pub use policy::{Lockout, PasswordExpiration};
pub use scripts::Scripts;
pub use validate::Validate;
pub use wifi::Wifi;

use crate::buffers::ScriptBuffers;
use crate::document::AnswerDocument;
use crate::error::Result;
use crate::settings::Configuration;

/// Shared state lent to one pass for the duration of one call.
pub struct PassContext<'a> {
    pub config: &'a Configuration,
    pub document: &'a mut AnswerDocument,
    pub buffers: &'a mut ScriptBuffers,
}

/// One step of the pipeline.
pub trait Pass {
    /// Name for logging and identification.
    fn name(&self) -> &str;

    /// Mutate the document and buffers. An error aborts the whole run.
    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()>;
}

/// Component names shared by several passes.
pub(crate) mod components {
    pub const SETUP: &str = "Microsoft-Windows-Setup";
    pub const SHELL_SETUP: &str = "Microsoft-Windows-Shell-Setup";
    pub const INTERNATIONAL_CORE: &str = "Microsoft-Windows-International-Core";
    pub const INTERNATIONAL_CORE_WINPE: &str = "Microsoft-Windows-International-Core-WinPE";
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::buffers::BufferKind;
    use crate::document::Architecture;

    /// Run `pass` alone against a fresh template.
    pub(crate) fn run(pass: &dyn Pass, config: &Configuration) -> (AnswerDocument, ScriptBuffers) {
        let mut document = AnswerDocument::from_template(Architecture::Amd64).unwrap();
        let mut buffers = ScriptBuffers::new();
        pass.apply(&mut PassContext {
            config,
            document: &mut document,
            buffers: &mut buffers,
        })
        .unwrap();
        (document, buffers)
    }

    pub(crate) fn statements(buffers: &ScriptBuffers, kind: BufferKind) -> Vec<String> {
        buffers.get(kind).statements().to_vec()
    }
}
