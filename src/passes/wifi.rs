//! Wireless setup: skip the OOBE page, or import a caller profile.

use crate::codec;
use crate::command::target;
use crate::error::Result;
use crate::phase::Phase;
use crate::settings::WifiSettings;

use super::{components, Pass, PassContext};

pub const WIFI_PROFILE_PATH: &str = r"C:\Windows\Setup\Scripts\Wifi.xml";

pub struct Wifi;

impl Pass for Wifi {
    fn name(&self) -> &str {
        "wifi"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        if matches!(ctx.config.wifi, WifiSettings::Interactive) {
            return Ok(());
        }
        if let Some(profile) = ctx.config.wifi.profile()? {
            target(ctx.document, Phase::Specialize)?
                .append_all(codec::embed_document(WIFI_PROFILE_PATH, &profile));
            ctx.buffers.specialize().append(format!(
                r#"netsh.exe wlan add profile filename="{WIFI_PROFILE_PATH}" user=all"#
            ));
        }

        ctx.document
            .component_mut(Phase::OobeSystem, components::SHELL_SETUP)
            .child_or_insert("OOBE")
            .child_or_insert("HideWirelessSetupInOOBE")
            .set_text("true");
        Ok(())
    }
}
