//! Drops placeholders nothing wrote into: empty generated components, then
//! `settings` elements left without components.

use crate::error::Result;

use super::{Pass, PassContext};

pub struct Cleanup;

impl Pass for Cleanup {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let root = ctx.document.root_mut();
        for settings in root.elements_mut().filter(|e| e.local_name() == "settings") {
            settings.retain_elements(|e| {
                e.is_verbatim() || e.local_name() != "component" || !e.is_empty()
            });
        }
        root.retain_elements(|e| {
            e.local_name() != "settings" || e.elements().next().is_some()
        });
        Ok(())
    }
}
