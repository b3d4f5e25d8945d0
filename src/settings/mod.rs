//! Input model for one generation run.
//!
//! Every "kind of X" setting is a tagged enum (`mode = "..."` in TOML/JSON)
//! that passes match exhaustively. `Configuration::default()` is the empty
//! case: everything interactive, no toggles, no scripts.
//!
//! # Example
//!
//! ```rust
//! use unattend_assembler::settings::Configuration;
//!
//! let config = Configuration::from_toml_str(r#"
//!     [computer_name]
//!     mode = "custom"
//!     name = "LAB-PC-01"
//!
//!     [toggles]
//!     enable_long_paths = true
//! "#).unwrap();
//! assert!(config.toggles.enable_long_paths);
//! ```

mod values;

pub use values::{AccountName, ComputerName, InputLocale, LanguageTag, ProductKey, TimeZoneId};

pub use crate::document::Architecture;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::document::Element;
use crate::error::{Error, Result};
use crate::phase::Phase;

/// Everything the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    pub architecture: Architecture,
    pub partitioning: PartitionSettings,
    pub edition: EditionSettings,
    pub language: LanguageSettings,
    pub computer_name: ComputerNameSettings,
    pub time_zone: TimeZoneSettings,
    pub accounts: AccountSettings,
    pub lockout: LockoutSettings,
    pub password_expiration: PasswordExpirationSettings,
    pub toggles: FeatureToggles,
    pub wifi: WifiSettings,
    pub scripts: Vec<Script>,
    pub custom_components: Vec<CustomComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PartitionSettings {
    #[default]
    Interactive,
    /// Run a caller-supplied diskpart script, then install to a fixed
    /// partition.
    Custom {
        diskpart_script: String,
        install_to: InstallTo,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallTo {
    pub disk: u32,
    pub partition: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum EditionSettings {
    #[default]
    Interactive,
    ProductKey {
        key: ProductKey,
    },
    /// Use the key embedded in the firmware.
    Firmware,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum LanguageSettings {
    #[default]
    Interactive,
    Unattended {
        ui_language: LanguageTag,
        system_locale: LanguageTag,
        user_locale: LanguageTag,
        input_locale: InputLocale,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ComputerNameSettings {
    #[default]
    Random,
    Custom {
        name: ComputerName,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum TimeZoneSettings {
    #[default]
    Implicit,
    Explicit {
        id: TimeZoneId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AccountSettings {
    #[default]
    Interactive,
    Unattended {
        accounts: Vec<Account>,
        #[serde(default)]
        auto_logon: AutoLogon,
        #[serde(default)]
        obscure_passwords: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    pub name: AccountName,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub group: AccountGroup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountGroup {
    #[default]
    Administrators,
    Users,
}

impl AccountGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountGroup::Administrators => "Administrators",
            AccountGroup::Users => "Users",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AutoLogon {
    #[default]
    Disabled,
    /// Enable the built-in Administrator and log on with it.
    BuiltinAdmin { password: String },
    /// Log on with the first administrator from `accounts`.
    Own,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum LockoutSettings {
    #[default]
    Default,
    Disabled,
    Custom {
        /// Failed attempts before lockout.
        threshold: u32,
        /// Lockout duration in minutes.
        duration: u32,
        /// Observation window in minutes.
        window: u32,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PasswordExpirationSettings {
    #[default]
    Default,
    Unlimited,
    Custom {
        /// Days.
        max_age: u32,
    },
}

/// On/off tweaks, all off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureToggles {
    pub bypass_requirements_check: bool,
    pub bypass_network_check: bool,
    pub enable_long_paths: bool,
    pub disable_last_access: bool,
    pub prevent_device_encryption: bool,
    pub allow_powershell_scripts: bool,
    pub show_file_extensions: bool,
    pub classic_context_menu: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum WifiSettings {
    #[default]
    Interactive,
    /// Hide the wireless page during OOBE.
    Skip,
    /// Import a profile XML (a `WLANProfile` document).
    Profile { xml: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub phase: ScriptPhase,
    pub kind: ScriptKind,
    pub content: String,
}

/// When a caller script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptPhase {
    System,
    FirstLogon,
    UserOnce,
    DefaultUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Ps1,
    Cmd,
    Reg,
    Vbs,
    Js,
}

impl ScriptKind {
    pub fn extension(self) -> &'static str {
        match self {
            ScriptKind::Ps1 => "ps1",
            ScriptKind::Cmd => "cmd",
            ScriptKind::Reg => "reg",
            ScriptKind::Vbs => "vbs",
            ScriptKind::Js => "js",
        }
    }
}

/// Raw component markup inserted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomComponent {
    pub phase: Phase,
    pub markup: String,
}

impl CustomComponent {
    /// Parse the markup and check it is a named `component`.
    pub fn parse(&self) -> Result<Element> {
        let element = Element::parse(&self.markup).map_err(|e| {
            Error::config(format!("custom_components ({}): {e}", self.phase))
        })?;
        if element.local_name() != "component" {
            return Err(Error::config(format!(
                "custom_components ({}): root element must be 'component', found '{}'",
                self.phase,
                element.name()
            )));
        }
        if element.attr("name").map_or(true, |name| name.trim().is_empty()) {
            return Err(Error::config(format!(
                "custom_components ({}): component needs a 'name' attribute",
                self.phase
            )));
        }
        Ok(element)
    }
}

impl WifiSettings {
    /// Parse the profile payload, if any.
    pub fn profile(&self) -> Result<Option<Element>> {
        let WifiSettings::Profile { xml } = self else {
            return Ok(None);
        };
        let element =
            Element::parse(xml).map_err(|e| Error::config(format!("wifi.xml: {e}")))?;
        if element.local_name() != "WLANProfile" {
            return Err(Error::config(format!(
                "wifi.xml: root element must be 'WLANProfile', found '{}'",
                element.name()
            )));
        }
        Ok(Some(element))
    }
}

impl Configuration {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Configuration = toml::from_str(text)
            .map_err(|e| Error::config(format!("parsing TOML settings: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Configuration = serde_json::from_str(text)
            .map_err(|e| Error::config(format!("parsing JSON settings: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(Error::config(format!(
                "settings file '{}' must end in .toml or .json",
                path.display()
            ))),
        }
    }

    /// Range and cross-field checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.validate_partitioning()?;
        self.validate_accounts()?;
        self.validate_policies()?;
        self.validate_payloads()?;
        Ok(())
    }

    fn validate_partitioning(&self) -> Result<()> {
        match &self.partitioning {
            PartitionSettings::Interactive => Ok(()),
            PartitionSettings::Custom {
                diskpart_script,
                install_to,
            } => {
                if diskpart_script.trim().is_empty() {
                    return Err(Error::config(
                        "partitioning.diskpart_script must not be empty",
                    ));
                }
                if install_to.partition == 0 {
                    return Err(Error::config(
                        "partitioning.install_to.partition starts at 1",
                    ));
                }
                Ok(())
            }
        }
    }

    fn validate_accounts(&self) -> Result<()> {
        let AccountSettings::Unattended {
            accounts,
            auto_logon,
            ..
        } = &self.accounts
        else {
            return Ok(());
        };

        let mut seen = HashSet::new();
        for account in accounts {
            let key = account.name.as_str().to_lowercase();
            if !seen.insert(key) {
                return Err(Error::config(format!(
                    "accounts: name '{}' is used more than once",
                    account.name
                )));
            }
            if account.display_name.chars().count() > 256 {
                return Err(Error::config(format!(
                    "accounts: display name of '{}' is longer than 256 characters",
                    account.name
                )));
            }
        }

        // The built-in Administrator covers for a missing admin account.
        let has_admin = accounts
            .iter()
            .any(|a| a.group == AccountGroup::Administrators);
        if !has_admin && !matches!(auto_logon, AutoLogon::BuiltinAdmin { .. }) {
            return Err(Error::config(
                "accounts: at least one account must be in the Administrators group",
            ));
        }
        Ok(())
    }

    fn validate_policies(&self) -> Result<()> {
        if let LockoutSettings::Custom {
            threshold,
            duration,
            window,
        } = self.lockout
        {
            if !(1..=999).contains(&threshold) {
                return Err(Error::config(format!(
                    "lockout.threshold must be 1 to 999, got {threshold}"
                )));
            }
            if !(1..=99_999).contains(&duration) {
                return Err(Error::config(format!(
                    "lockout.duration must be 1 to 99999 minutes, got {duration}"
                )));
            }
            if window == 0 || window > duration {
                return Err(Error::config(format!(
                    "lockout.window must be 1 to {duration} minutes, got {window}"
                )));
            }
        }
        if let PasswordExpirationSettings::Custom { max_age } = self.password_expiration {
            if !(1..=999).contains(&max_age) {
                return Err(Error::config(format!(
                    "password_expiration.max_age must be 1 to 999 days, got {max_age}"
                )));
            }
        }
        Ok(())
    }

    fn validate_payloads(&self) -> Result<()> {
        self.wifi.profile()?;
        for (index, script) in self.scripts.iter().enumerate() {
            if script.content.trim().is_empty() {
                return Err(Error::config(format!(
                    "scripts[{index}].content must not be empty"
                )));
            }
        }
        for component in &self.custom_components {
            component.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let config = Configuration::from_toml_str("").unwrap();
        assert_eq!(config.partitioning, PartitionSettings::Interactive);
        assert_eq!(config.accounts, AccountSettings::Interactive);
        assert_eq!(config.toggles, FeatureToggles::default());
        assert!(config.scripts.is_empty());
        assert_eq!(config.architecture, Architecture::Amd64);
    }

    #[test]
    fn test_full_toml_parses() {
        let config = Configuration::from_toml_str(
            r#"
            architecture = "arm64"

            [partitioning]
            mode = "custom"
            diskpart_script = "SELECT DISK=0\nCLEAN"
            install_to = { disk = 0, partition = 3 }

            [edition]
            mode = "product-key"
            key = "VK7JG-NPHTM-C97JM-9MPGT-3V66T"

            [language]
            mode = "unattended"
            ui_language = "en-US"
            system_locale = "en-US"
            user_locale = "de-DE"
            input_locale = "0409:00000409"

            [accounts]
            mode = "unattended"
            obscure_passwords = true
            auto_logon = { mode = "own" }

            [[accounts.accounts]]
            name = "Admin"
            password = "secret"

            [[accounts.accounts]]
            name = "Guest User"
            group = "users"

            [lockout]
            mode = "custom"
            threshold = 10
            duration = 10
            window = 10

            [[scripts]]
            phase = "first-logon"
            kind = "ps1"
            content = "Write-Host hi"

            [[custom_components]]
            phase = "oobeSystem"
            markup = '<component name="Microsoft-Windows-SecureStartup-FilterDriver" />'
            "#,
        )
        .unwrap();

        assert_eq!(config.architecture, Architecture::Arm64);
        let AccountSettings::Unattended { accounts, auto_logon, obscure_passwords } =
            &config.accounts
        else {
            panic!("accounts should be unattended");
        };
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].group, AccountGroup::Users);
        assert_eq!(*auto_logon, AutoLogon::Own);
        assert!(*obscure_passwords);
        assert_eq!(config.scripts[0].phase, ScriptPhase::FirstLogon);
        assert_eq!(config.custom_components[0].phase, Phase::OobeSystem);
    }

    #[test]
    fn test_json_parses() {
        let config = Configuration::from_json_str(
            r#"{ "computer_name": { "mode": "custom", "name": "PC-7" },
                 "toggles": { "show_file_extensions": true } }"#,
        )
        .unwrap();
        assert!(config.toggles.show_file_extensions);
        assert!(matches!(config.computer_name, ComputerNameSettings::Custom { .. }));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = Configuration::from_toml_str("[toggles]\nno_such_toggle = true").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_accounts_need_an_admin() {
        let err = Configuration::from_toml_str(
            r#"
            [accounts]
            mode = "unattended"
            [[accounts.accounts]]
            name = "User"
            group = "users"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Administrators"));
    }

    #[test]
    fn test_builtin_admin_auto_logon_needs_no_admin_account() {
        let config = Configuration::from_toml_str(
            r#"
            [accounts]
            mode = "unattended"
            auto_logon = { mode = "builtin-admin", password = "pw" }
            [[accounts.accounts]]
            name = "User"
            group = "users"
            "#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_duplicate_account_names_rejected() {
        let err = Configuration::from_toml_str(
            r#"
            [accounts]
            mode = "unattended"
            [[accounts.accounts]]
            name = "Admin"
            [[accounts.accounts]]
            name = "ADMIN"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_policy_ranges() {
        let mut config = Configuration {
            lockout: LockoutSettings::Custom {
                threshold: 1000,
                duration: 10,
                window: 10,
            },
            ..Configuration::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("threshold"));

        config.lockout = LockoutSettings::Custom {
            threshold: 5,
            duration: 10,
            window: 11,
        };
        assert!(config.validate().unwrap_err().to_string().contains("window"));

        config.lockout = LockoutSettings::Disabled;
        config.password_expiration = PasswordExpirationSettings::Custom { max_age: 0 };
        assert!(config.validate().unwrap_err().to_string().contains("max_age"));
    }

    #[test]
    fn test_partitioning_checks() {
        let config = Configuration {
            partitioning: PartitionSettings::Custom {
                diskpart_script: "  ".into(),
                install_to: InstallTo { disk: 0, partition: 1 },
            },
            ..Configuration::default()
        };
        assert!(config.validate().is_err());

        let config = Configuration {
            partitioning: PartitionSettings::Custom {
                diskpart_script: "CLEAN".into(),
                install_to: InstallTo { disk: 0, partition: 0 },
            },
            ..Configuration::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_payload_checks() {
        let config = Configuration {
            wifi: WifiSettings::Profile {
                xml: "<WLANProfile><name>x</name>".into(),
            },
            ..Configuration::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("wifi.xml"));

        let config = Configuration {
            wifi: WifiSettings::Profile {
                xml: "<Other/>".into(),
            },
            ..Configuration::default()
        };
        assert!(config.validate().is_err());

        let config = Configuration {
            custom_components: vec![CustomComponent {
                phase: Phase::Specialize,
                markup: "<component/>".into(),
            }],
            ..Configuration::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("'name'"));

        let config = Configuration {
            scripts: vec![Script {
                phase: ScriptPhase::System,
                kind: ScriptKind::Cmd,
                content: "\r\n".into(),
            }],
            ..Configuration::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("scripts[0]"));
    }

    #[test]
    fn test_load_by_extension() {
        let temp = tempfile::TempDir::new().unwrap();
        let toml_path = temp.path().join("settings.toml");
        std::fs::write(&toml_path, "[toggles]\nenable_long_paths = true\n").unwrap();
        assert!(Configuration::load(&toml_path).unwrap().toggles.enable_long_paths);

        let other = temp.path().join("settings.yaml");
        std::fs::write(&other, "").unwrap();
        assert!(matches!(Configuration::load(&other), Err(Error::Config(_))));
    }
}
