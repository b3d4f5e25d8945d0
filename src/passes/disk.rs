//! Partitioning: a caller diskpart script run from windowsPE, then a fixed
//! install target.

use crate::codec;
use crate::command::{self, target};
use crate::error::Result;
use crate::phase::Phase;
use crate::settings::PartitionSettings;

use super::{components, Pass, PassContext};

/// Scratch location on the setup RAM drive.
pub const DISKPART_SCRIPT_PATH: &str = r"X:\diskpart.txt";
const DISKPART_LOG_PATH: &str = r"X:\diskpart.log";

pub struct Disk;

impl Pass for Disk {
    fn name(&self) -> &str {
        "disk"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let PartitionSettings::Custom {
            diskpart_script,
            install_to,
        } = &ctx.config.partitioning
        else {
            return Ok(());
        };

        let mut pe = target(ctx.document, Phase::WindowsPe)?;
        pe.append_all(codec::write_to_file(DISKPART_SCRIPT_PATH, diskpart_script));
        pe.append(command::shell(&format!(
            r#"diskpart.exe /s "{DISKPART_SCRIPT_PATH}" >>"{DISKPART_LOG_PATH}""#
        )));

        let os_image = ctx
            .document
            .component_mut(Phase::WindowsPe, components::SETUP)
            .child_or_insert("ImageInstall")
            .child_or_insert("OSImage");
        let install = os_image.child_or_insert("InstallTo");
        install
            .child_or_insert("DiskID")
            .set_text(install_to.disk.to_string());
        install
            .child_or_insert("PartitionID")
            .set_text(install_to.partition.to_string());
        Ok(())
    }
}
