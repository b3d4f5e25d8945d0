//! Account lockout and password expiration via `net.exe accounts`.

use crate::error::Result;
use crate::settings::{LockoutSettings, PasswordExpirationSettings};

use super::{Pass, PassContext};

pub struct Lockout;

impl Pass for Lockout {
    fn name(&self) -> &str {
        "lockout"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let statement = match ctx.config.lockout {
            LockoutSettings::Default => return Ok(()),
            LockoutSettings::Disabled => "net.exe accounts /lockoutthreshold:0".to_string(),
            LockoutSettings::Custom {
                threshold,
                duration,
                window,
            } => format!(
                "net.exe accounts /lockoutthreshold:{threshold} /lockoutduration:{duration} /lockoutwindow:{window}"
            ),
        };
        ctx.buffers.specialize().append(statement);
        Ok(())
    }
}

pub struct PasswordExpiration;

impl Pass for PasswordExpiration {
    fn name(&self) -> &str {
        "password-expiration"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let max_age = match ctx.config.password_expiration {
            PasswordExpirationSettings::Default => return Ok(()),
            PasswordExpirationSettings::Unlimited => "UNLIMITED".to_string(),
            PasswordExpirationSettings::Custom { max_age } => max_age.to_string(),
        };
        ctx.buffers
            .specialize()
            .append(format!("net.exe accounts /maxpwage:{max_age}"));
        Ok(())
    }
}
