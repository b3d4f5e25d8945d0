//! Command-line idioms understood by the target machine.
//!
//! These helpers only build strings. Inserting them into the document is the
//! job of [`target`].
//!
//! # Example
//!
//! ```rust
//! use unattend_assembler::command::{self, RegistryValue};
//!
//! let cmd = command::registry_add(
//!     r"HKLM\SYSTEM\Setup\LabConfig",
//!     "BypassTPMCheck",
//!     RegistryValue::Dword(1),
//! );
//! assert_eq!(
//!     cmd,
//!     r#"reg.exe add "HKLM\SYSTEM\Setup\LabConfig" /v BypassTPMCheck /t REG_DWORD /d 1 /f"#
//! );
//! ```

pub mod target;

pub use target::{target, Appender};

/// Hive key under which the default user profile is mounted.
pub const DEFAULT_USER_HIVE_KEY: &str = r"HKU\DefaultUser";
/// Registry file of the default user profile.
pub const DEFAULT_USER_HIVE_FILE: &str = r"C:\Users\Default\NTUSER.DAT";

/// Typed registry data for `reg.exe add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    Dword(u32),
    String(String),
}

/// Run `command` through the command interpreter.
pub fn shell(command: &str) -> String {
    format!(r#"cmd.exe /c "{command}""#)
}

/// `reg.exe add` for a single value, overwriting without prompting.
pub fn registry_add(key: &str, name: &str, value: RegistryValue) -> String {
    match value {
        RegistryValue::Dword(data) => {
            format!(r#"reg.exe add "{key}" /v {name} /t REG_DWORD /d {data} /f"#)
        }
        RegistryValue::String(data) => {
            format!(r#"reg.exe add "{key}" /v {name} /t REG_SZ /d "{data}" /f"#)
        }
    }
}

pub fn registry_load(key: &str, file: &str) -> String {
    format!(r#"reg.exe load "{key}" "{file}""#)
}

pub fn registry_unload(key: &str) -> String {
    format!(r#"reg.exe unload "{key}""#)
}

/// Run a PowerShell script file without profile or execution-policy prompts.
pub fn powershell_file(path: &str) -> String {
    format!(
        r#"powershell.exe -WindowStyle "Normal" -ExecutionPolicy "Unrestricted" -NoProfile -File "{path}""#
    )
}

/// Run an inline PowerShell command. `script` must not contain `"`.
pub fn powershell_command(script: &str) -> String {
    format!(r#"powershell.exe -WindowStyle "Normal" -NoProfile -Command "{script}""#)
}

/// Quote a string as a PowerShell single-quoted literal.
pub fn ps_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
