//! Installation phases ("configuration passes") of the target installer.
//!
//! The numeric order follows the order in which setup runs the passes.
//! Pipeline order is independent of it: any pass may write into any
//! phase's region at any step.

use std::fmt;

use serde::Deserialize;

/// One of the seven fixed installation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Offline servicing of the image before it is applied.
    #[serde(rename = "offlineServicing")]
    OfflineServicing = 1,
    /// Setup running from the installation media (pre-OS).
    #[serde(rename = "windowsPE")]
    WindowsPe = 2,
    /// Sysprep generalize.
    #[serde(rename = "generalize")]
    Generalize = 3,
    /// Machine-specific configuration of the installed system.
    #[serde(rename = "specialize")]
    Specialize = 4,
    /// Audit mode, system context.
    #[serde(rename = "auditSystem")]
    AuditSystem = 5,
    /// Audit mode, user context.
    #[serde(rename = "auditUser")]
    AuditUser = 6,
    /// Out-of-box experience, including first logon.
    #[serde(rename = "oobeSystem")]
    OobeSystem = 7,
}

impl Phase {
    /// All phases in install order.
    pub const ALL: [Phase; 7] = [
        Phase::OfflineServicing,
        Phase::WindowsPe,
        Phase::Generalize,
        Phase::Specialize,
        Phase::AuditSystem,
        Phase::AuditUser,
        Phase::OobeSystem,
    ];

    /// Value of the `pass` attribute on the phase's `settings` element.
    pub fn pass_name(self) -> &'static str {
        match self {
            Phase::OfflineServicing => "offlineServicing",
            Phase::WindowsPe => "windowsPE",
            Phase::Generalize => "generalize",
            Phase::Specialize => "specialize",
            Phase::AuditSystem => "auditSystem",
            Phase::AuditUser => "auditUser",
            Phase::OobeSystem => "oobeSystem",
        }
    }

    pub fn from_pass_name(name: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.pass_name() == name)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pass_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::OfflineServicing < Phase::WindowsPe);
        assert!(Phase::WindowsPe < Phase::Specialize);
        assert!(Phase::Specialize < Phase::OobeSystem);
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::OfflineServicing.to_string(), "offlineServicing");
        assert_eq!(Phase::WindowsPe.to_string(), "windowsPE");
        assert_eq!(Phase::Generalize.to_string(), "generalize");
        assert_eq!(Phase::Specialize.to_string(), "specialize");
        assert_eq!(Phase::AuditSystem.to_string(), "auditSystem");
        assert_eq!(Phase::AuditUser.to_string(), "auditUser");
        assert_eq!(Phase::OobeSystem.to_string(), "oobeSystem");
    }

    #[test]
    fn test_from_pass_name_round_trips() {
        for phase in Phase::ALL {
            assert_eq!(Phase::from_pass_name(phase.pass_name()), Some(phase));
        }
        assert_eq!(Phase::from_pass_name("WindowsPE"), None);
    }

    #[test]
    fn test_phase_deserializes_from_pass_name() {
        #[derive(Deserialize)]
        struct Holder {
            phase: Phase,
        }
        let holder: Holder = toml::from_str("phase = \"oobeSystem\"").unwrap();
        assert_eq!(holder.phase, Phase::OobeSystem);
    }
}
