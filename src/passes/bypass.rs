//! Hardware requirement and network checks.
//!
//! The requirement check runs inside setup itself, so its override has to
//! land as windowsPE commands. The network check only matters in OOBE and
//! can go through the specialize script.

use crate::command::{self, target, RegistryValue};
use crate::error::Result;
use crate::phase::Phase;

use super::{Pass, PassContext};

const LAB_CONFIG_KEY: &str = r"HKLM\SYSTEM\Setup\LabConfig";
const LAB_CONFIG_VALUES: [&str; 3] = ["BypassTPMCheck", "BypassSecureBootCheck", "BypassRAMCheck"];

pub struct Bypass;

impl Pass for Bypass {
    fn name(&self) -> &str {
        "bypass"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let toggles = ctx.config.toggles;

        if toggles.bypass_requirements_check {
            let mut pe = target(ctx.document, Phase::WindowsPe)?;
            for name in LAB_CONFIG_VALUES {
                pe.append(command::registry_add(
                    LAB_CONFIG_KEY,
                    name,
                    RegistryValue::Dword(1),
                ));
            }
            ctx.buffers.specialize().append(command::registry_add(
                r"HKLM\SYSTEM\Setup\MoSetup",
                "AllowUpgradesWithUnsupportedTPMOrCPU",
                RegistryValue::Dword(1),
            ));
        }

        if toggles.bypass_network_check {
            ctx.buffers.specialize().append(command::registry_add(
                r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\OOBE",
                "BypassNRO",
                RegistryValue::Dword(1),
            ));
        }
        Ok(())
    }
}
