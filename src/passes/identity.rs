//! Computer name and time zone, both plain specialize settings.

use crate::error::Result;
use crate::phase::Phase;
use crate::settings::{ComputerNameSettings, TimeZoneSettings};

use super::{components, Pass, PassContext};

pub struct ComputerName;

impl Pass for ComputerName {
    fn name(&self) -> &str {
        "computer-name"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        // Setup picks a random name when the element is absent.
        if let ComputerNameSettings::Custom { name } = &ctx.config.computer_name {
            ctx.document
                .component_mut(Phase::Specialize, components::SHELL_SETUP)
                .child_or_insert("ComputerName")
                .set_text(name.as_str());
        }
        Ok(())
    }
}

pub struct TimeZone;

impl Pass for TimeZone {
    fn name(&self) -> &str {
        "time-zone"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        if let TimeZoneSettings::Explicit { id } = &ctx.config.time_zone {
            ctx.document
                .component_mut(Phase::Specialize, components::SHELL_SETUP)
                .child_or_insert("TimeZone")
                .set_text(id.as_str());
        }
        Ok(())
    }
}
