//! The fixed pass sequence and one-shot generation entry points.
//!
//! Structural passes run first, then the buffer flushes, caller components
//! and cleanup. Order assignment and validation come last because both need
//! the complete tree. The first failing pass aborts the run and the
//! half-built document is dropped.

use tracing::{debug, info};

use crate::buffers::{BufferKind, ScriptBuffers};
use crate::command::target::command_lines;
use crate::document::AnswerDocument;
use crate::error::Result;
use crate::passes::{self, Pass, PassContext};
use crate::phase::Phase;
use crate::settings::Configuration;

/// An ordered list of passes.
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self {
        Self { passes }
    }

    /// Every pass, in the order the answer file needs them.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(passes::Disk),
            Box::new(passes::Edition),
            Box::new(passes::Locales),
            Box::new(passes::ComputerName),
            Box::new(passes::TimeZone),
            Box::new(passes::Accounts),
            Box::new(passes::Lockout),
            Box::new(passes::PasswordExpiration),
            Box::new(passes::Bypass),
            Box::new(passes::Features),
            Box::new(passes::Wifi),
            Box::new(passes::Scripts),
            Box::new(passes::Flush(BufferKind::UserOnce)),
            Box::new(passes::Flush(BufferKind::DefaultUser)),
            Box::new(passes::Flush(BufferKind::Specialize)),
            Box::new(passes::Flush(BufferKind::FirstLogon)),
            Box::new(passes::CustomComponents),
            Box::new(passes::Cleanup),
            Box::new(passes::Order),
            Box::new(passes::Validate),
        ])
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Build one answer document from `config`.
    pub fn run(&self, config: &Configuration) -> Result<AnswerDocument> {
        config.validate()?;

        let mut document = AnswerDocument::from_template(config.architecture)?;
        let mut buffers = ScriptBuffers::new();
        for pass in &self.passes {
            debug!(pass = pass.name(), "running pass");
            pass.apply(&mut PassContext {
                config,
                document: &mut document,
                buffers: &mut buffers,
            })?;
        }

        let commands: usize = [Phase::WindowsPe, Phase::Specialize, Phase::OobeSystem]
            .into_iter()
            .map(|phase| command_lines(&document, phase).len())
            .sum();
        info!(passes = self.passes.len(), commands, "answer file assembled");
        Ok(document)
    }
}

/// Run the standard pipeline.
pub fn generate(config: &Configuration) -> Result<AnswerDocument> {
    Pipeline::standard().run(config)
}

/// Run the standard pipeline and serialize canonically.
pub fn generate_bytes(config: &Configuration) -> Result<Vec<u8>> {
    Ok(generate(config)?.to_bytes())
}
