//! Assembles answer files for unattended OS setup.
//!
//! Besides static settings, an answer file carries imperative steps: shell,
//! registry and PowerShell commands that run during named setup phases.
//! This crate builds such a document from a typed [`Configuration`]:
//!
//! - **Document model** - namespace-aware tree with lazy get-or-create access
//! - **Command targeting** - "append a command to phase X"
//! - **Codec** - rebuilds arbitrary text as a file through length-limited,
//!   escaped shell commands
//! - **Script buffers** - statements collected across passes, flushed as one
//!   script file plus one invocation each
//! - **Pipeline** - fixed sequence of passes ending in order assignment and
//!   a schema gate
//!
//! # Architecture
//!
//! ```text
//! Configuration ──validate──▶ Pipeline
//!                               │
//!                               ├── structural passes ──▶ AnswerDocument + ScriptBuffers
//!                               ├── flush passes      ──▶ codec ──▶ command::target
//!                               ├── custom components, cleanup
//!                               ├── order
//!                               └── validate (schema)
//! ```
//!
//! # Example
//!
//! ```rust
//! use unattend_assembler::settings::Configuration;
//!
//! let config = Configuration::from_toml_str(r#"
//!     [[scripts]]
//!     phase = "first-logon"
//!     kind = "ps1"
//!     content = "Write-Host 'hello'"
//! "#).unwrap();
//!
//! let xml = unattend_assembler::generate(&config).unwrap().to_canonical_string();
//! assert!(xml.contains("FirstLogon.ps1"));
//! ```

pub mod buffers;
pub mod codec;
pub mod command;
pub mod document;
pub mod error;
pub mod extensions;
pub mod passes;
pub mod phase;
pub mod pipeline;
pub mod schema;
pub mod settings;

pub use document::{AnswerDocument, Architecture, Element};
pub use error::{Error, Result};
pub use phase::Phase;
pub use pipeline::{generate, generate_bytes, Pipeline};
pub use settings::Configuration;
