//! Final gate: the finished tree against the packaged schema.

use crate::error::Result;
use crate::schema::Schema;

use super::{Pass, PassContext};

pub struct Validate;

impl Pass for Validate {
    fn name(&self) -> &str {
        "validate"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        Schema::packaged()?.validate(ctx.document.root())
    }
}
