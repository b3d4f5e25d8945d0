//! System and per-user tweaks driven by the feature toggles.

use crate::command::{self, RegistryValue, DEFAULT_USER_HIVE_KEY};
use crate::error::Result;

use super::{Pass, PassContext};

const CLASSIC_CONTEXT_MENU: &str = r#"reg.exe add "HKCU\Software\Classes\CLSID\{86ca1aa0-34aa-4e8b-a509-50c905bae2a2}\InprocServer32" /ve /f"#;

pub struct Features;

impl Pass for Features {
    fn name(&self) -> &str {
        "features"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let toggles = ctx.config.toggles;
        let specialize = ctx.buffers.specialize();

        if toggles.enable_long_paths {
            specialize.append(command::registry_add(
                r"HKLM\SYSTEM\CurrentControlSet\Control\FileSystem",
                "LongPathsEnabled",
                RegistryValue::Dword(1),
            ));
        }
        if toggles.disable_last_access {
            specialize.append("fsutil.exe behavior set disableLastAccess 1");
        }
        if toggles.prevent_device_encryption {
            specialize.append(command::registry_add(
                r"HKLM\SYSTEM\CurrentControlSet\Control\BitLocker",
                "PreventDeviceEncryption",
                RegistryValue::Dword(1),
            ));
        }
        if toggles.allow_powershell_scripts {
            specialize.append(
                "Set-ExecutionPolicy -Scope 'LocalMachine' -ExecutionPolicy 'RemoteSigned' -Force",
            );
        }

        if toggles.show_file_extensions {
            ctx.buffers.default_user().append(command::registry_add(
                &format!(
                    r"{DEFAULT_USER_HIVE_KEY}\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced"
                ),
                "HideFileExt",
                RegistryValue::Dword(0),
            ));
        }
        if toggles.classic_context_menu {
            ctx.buffers.user_once().append(CLASSIC_CONTEXT_MENU);
        }
        Ok(())
    }
}
