//! Local accounts, auto-logon and the OOBE pages that become pointless once
//! accounts are predefined.
//!
//! Obscured passwords are base64 over UTF-16LE of the password followed by
//! the element name (`Password` or `AdministratorPassword`), which is what
//! setup expects when `PlainText` is `false`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::document::Element;
use crate::error::{Error, Result};
use crate::phase::Phase;
use crate::settings::{AccountGroup, AccountSettings, AutoLogon};

use super::{components, Pass, PassContext};

const BUILTIN_ADMINISTRATOR: &str = "Administrator";

pub struct Accounts;

impl Pass for Accounts {
    fn name(&self) -> &str {
        "accounts"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let AccountSettings::Unattended {
            accounts,
            auto_logon,
            obscure_passwords,
        } = &ctx.config.accounts
        else {
            return Ok(());
        };
        let obscure = *obscure_passwords;

        let shell = ctx
            .document
            .component_mut(Phase::OobeSystem, components::SHELL_SETUP);

        let user_accounts = shell.child_or_insert("UserAccounts");
        let local_accounts = user_accounts.child_or_insert("LocalAccounts");
        for account in accounts {
            let mut entry = Element::new("LocalAccount")
                .with_attr("wcm:action", "add")
                .with_child(Element::new("Name").with_text(account.name.as_str()))
                .with_child(Element::new("Group").with_text(account.group.as_str()))
                .with_child(password_element("Password", &account.password, obscure));
            if !account.display_name.is_empty() {
                entry.push(Element::new("DisplayName").with_text(account.display_name.as_str()));
            }
            local_accounts.push(entry);
        }

        let logon = match auto_logon {
            AutoLogon::Disabled => None,
            AutoLogon::BuiltinAdmin { password } => {
                user_accounts.push(password_element("AdministratorPassword", password, obscure));
                Some((BUILTIN_ADMINISTRATOR, password.as_str()))
            }
            AutoLogon::Own => {
                let admin = accounts
                    .iter()
                    .find(|a| a.group == AccountGroup::Administrators)
                    .ok_or_else(|| {
                        Error::config("accounts: auto_logon 'own' needs an administrator account")
                    })?;
                Some((admin.name.as_str(), admin.password.as_str()))
            }
        };

        if let Some((username, password)) = logon {
            shell.push(
                Element::new("AutoLogon")
                    .with_child(Element::new("Username").with_text(username))
                    .with_child(Element::new("Enabled").with_text("true"))
                    .with_child(Element::new("LogonCount").with_text("1"))
                    .with_child(password_element("Password", password, obscure)),
            );
        }

        let oobe = shell.child_or_insert("OOBE");
        for page in ["HideEULAPage", "HideLocalAccountScreen", "HideOnlineAccountScreens"] {
            oobe.child_or_insert(page).set_text("true");
        }
        oobe.child_or_insert("ProtectYourPC").set_text("3");

        if logon.is_some() {
            // LogonCount is a ceiling, not a counter setup clears.
            ctx.buffers.first_logon().append(
                "Set-ItemProperty -LiteralPath 'Registry::HKLM\\Software\\Microsoft\\Windows NT\\CurrentVersion\\Winlogon' -Name 'AutoLogonCount' -Type 'DWord' -Force -Value 0",
            );
        }
        Ok(())
    }
}

/// `<{name}><Value/><PlainText/></{name}>` in the requested encoding.
fn password_element(name: &str, password: &str, obscure: bool) -> Element {
    let (value, plain) = if obscure {
        (obscure_password(password, name), "false")
    } else {
        (password.to_string(), "true")
    };
    Element::new(name)
        .with_child(Element::new("Value").with_text(value))
        .with_child(Element::new("PlainText").with_text(plain))
}

fn obscure_password(password: &str, suffix: &str) -> String {
    let bytes: Vec<u8> = password
        .encode_utf16()
        .chain(suffix.encode_utf16())
        .flat_map(u16::to_le_bytes)
        .collect();
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::BufferKind;
    use crate::passes::testing;
    use crate::settings::{Account, AccountName, Configuration};

    fn account(name: &str, password: &str, group: AccountGroup) -> Account {
        Account {
            name: AccountName::new(name).unwrap(),
            display_name: String::new(),
            password: password.into(),
            group,
        }
    }

    fn config(auto_logon: AutoLogon, obscure: bool) -> Configuration {
        Configuration {
            accounts: AccountSettings::Unattended {
                accounts: vec![
                    account("Admin", "pw", AccountGroup::Administrators),
                    account("Kid", "", AccountGroup::Users),
                ],
                auto_logon,
                obscure_passwords: obscure,
            },
            ..Configuration::default()
        }
    }

    #[test]
    fn test_obscured_password_encoding() {
        // "pwPassword" as UTF-16LE.
        assert_eq!(
            obscure_password("pw", "Password"),
            "cAB3AFAAYQBzAHMAdwBvAHIAZAA="
        );
    }

    #[test]
    fn test_local_accounts_written() {
        let (doc, buffers) = testing::run(&Accounts, &config(AutoLogon::Disabled, false));
        let shell = doc.component(Phase::OobeSystem, components::SHELL_SETUP).unwrap();
        let local: Vec<_> = shell
            .descend(&["UserAccounts", "LocalAccounts"])
            .unwrap()
            .elements()
            .collect();
        assert_eq!(local.len(), 2);
        assert_eq!(local[0].attr("wcm:action"), Some("add"));
        assert_eq!(local[0].child("Name").unwrap().text(), "Admin");
        assert_eq!(local[1].child("Group").unwrap().text(), "Users");
        assert_eq!(
            local[0].descend(&["Password", "PlainText"]).unwrap().text(),
            "true"
        );
        assert!(shell.child("AutoLogon").is_none());
        assert_eq!(shell.descend(&["OOBE", "ProtectYourPC"]).unwrap().text(), "3");
        assert!(buffers.get(BufferKind::FirstLogon).is_empty());
    }

    #[test]
    fn test_own_auto_logon_uses_first_admin() {
        let (doc, buffers) = testing::run(&Accounts, &config(AutoLogon::Own, true));
        let logon = doc
            .component(Phase::OobeSystem, components::SHELL_SETUP)
            .and_then(|c| c.child("AutoLogon"))
            .unwrap();
        assert_eq!(logon.child("Username").unwrap().text(), "Admin");
        assert_eq!(
            logon.descend(&["Password", "Value"]).unwrap().text(),
            obscure_password("pw", "Password")
        );
        let statements = testing::statements(&buffers, BufferKind::FirstLogon);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].contains("AutoLogonCount"));
    }

    #[test]
    fn test_builtin_admin_sets_administrator_password() {
        let (doc, _) = testing::run(
            &Accounts,
            &config(AutoLogon::BuiltinAdmin { password: "root".into() }, true),
        );
        let shell = doc.component(Phase::OobeSystem, components::SHELL_SETUP).unwrap();
        assert_eq!(
            shell
                .descend(&["UserAccounts", "AdministratorPassword", "Value"])
                .unwrap()
                .text(),
            obscure_password("root", "AdministratorPassword")
        );
        assert_eq!(
            shell.descend(&["AutoLogon", "Username"]).unwrap().text(),
            "Administrator"
        );
    }

    #[test]
    fn test_interactive_writes_nothing() {
        let (doc, _) = testing::run(&Accounts, &Configuration::default());
        assert!(doc.component(Phase::OobeSystem, components::SHELL_SETUP).is_none());
    }
}
