//! Caller-supplied components, inserted verbatim.

use crate::error::Result;

use super::{Pass, PassContext};

pub struct CustomComponents;

impl Pass for CustomComponents {
    fn name(&self) -> &str {
        "custom-components"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        for component in &ctx.config.custom_components {
            let element = component.parse()?;
            ctx.document
                .insert_verbatim_component(component.phase, element)?;
        }
        Ok(())
    }
}
