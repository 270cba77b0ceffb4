use crate::types::MinMax;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};

/// What a timing arc set models. The discriminant is the role's stable index,
/// used to size and address per-role lookup arrays.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimingRole {
    Wire = 0,
    Combinational = 1,
    TristateEnable = 2,
    TristateDisable = 3,
    RegClkToQ = 4,
    RegSetClr = 5,
    LatchEnToQ = 6,
    LatchDToQ = 7,
    SdfIopath = 8,
    Setup = 9,
    Hold = 10,
    Recovery = 11,
    Removal = 12,
    Width = 13,
    Period = 14,
    Skew = 15,
    Nochange = 16,
    OutputSetup = 17,
    OutputHold = 18,
    GatedClockSetup = 19,
    GatedClockHold = 20,
    LatchSetup = 21,
    LatchHold = 22,
    DataCheckSetup = 23,
    DataCheckHold = 24,
    NonSeqSetup = 25,
    NonSeqHold = 26,
    ClockTreePathMin = 27,
    ClockTreePathMax = 28,
}

impl TimingRole {
    pub const COUNT: usize = 29;
    pub const ALL: [TimingRole; Self::COUNT] = [
        TimingRole::Wire,
        TimingRole::Combinational,
        TimingRole::TristateEnable,
        TimingRole::TristateDisable,
        TimingRole::RegClkToQ,
        TimingRole::RegSetClr,
        TimingRole::LatchEnToQ,
        TimingRole::LatchDToQ,
        TimingRole::SdfIopath,
        TimingRole::Setup,
        TimingRole::Hold,
        TimingRole::Recovery,
        TimingRole::Removal,
        TimingRole::Width,
        TimingRole::Period,
        TimingRole::Skew,
        TimingRole::Nochange,
        TimingRole::OutputSetup,
        TimingRole::OutputHold,
        TimingRole::GatedClockSetup,
        TimingRole::GatedClockHold,
        TimingRole::LatchSetup,
        TimingRole::LatchHold,
        TimingRole::DataCheckSetup,
        TimingRole::DataCheckHold,
        TimingRole::NonSeqSetup,
        TimingRole::NonSeqHold,
        TimingRole::ClockTreePathMin,
        TimingRole::ClockTreePathMax,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            TimingRole::Wire => "wire",
            TimingRole::Combinational => "combinational",
            TimingRole::TristateEnable => "tristate enable",
            TimingRole::TristateDisable => "tristate disable",
            TimingRole::RegClkToQ => "Reg Clk to Q",
            TimingRole::RegSetClr => "Reg Set/Clr",
            TimingRole::LatchEnToQ => "Latch En to Q",
            TimingRole::LatchDToQ => "Latch D to Q",
            TimingRole::SdfIopath => "sdf IOPATH",
            TimingRole::Setup => "setup",
            TimingRole::Hold => "hold",
            TimingRole::Recovery => "recovery",
            TimingRole::Removal => "removal",
            TimingRole::Width => "width",
            TimingRole::Period => "period",
            TimingRole::Skew => "skew",
            TimingRole::Nochange => "nochange",
            TimingRole::OutputSetup => "output setup",
            TimingRole::OutputHold => "output hold",
            TimingRole::GatedClockSetup => "clock gating setup",
            TimingRole::GatedClockHold => "clock gating hold",
            TimingRole::LatchSetup => "latch setup",
            TimingRole::LatchHold => "latch hold",
            TimingRole::DataCheckSetup => "data check setup",
            TimingRole::DataCheckHold => "data check hold",
            TimingRole::NonSeqSetup => "non-sequential setup",
            TimingRole::NonSeqHold => "non-sequential hold",
            TimingRole::ClockTreePathMin => "min clock tree path",
            TimingRole::ClockTreePathMax => "max clock tree path",
        }
    }

    /// Propagation roles that SDF annotates with IOPATH.
    pub fn is_sdf_iopath(self) -> bool {
        matches!(
            self,
            TimingRole::Combinational
                | TimingRole::TristateEnable
                | TimingRole::TristateDisable
                | TimingRole::RegClkToQ
                | TimingRole::RegSetClr
                | TimingRole::LatchEnToQ
                | TimingRole::LatchDToQ
                | TimingRole::SdfIopath
                | TimingRole::Nochange
        )
    }

    pub fn is_timing_check(self) -> bool {
        matches!(
            self,
            TimingRole::Setup
                | TimingRole::Hold
                | TimingRole::Recovery
                | TimingRole::Removal
                | TimingRole::Width
                | TimingRole::Period
                | TimingRole::Skew
                | TimingRole::OutputSetup
                | TimingRole::OutputHold
                | TimingRole::GatedClockSetup
                | TimingRole::GatedClockHold
                | TimingRole::LatchSetup
                | TimingRole::LatchHold
                | TimingRole::DataCheckSetup
                | TimingRole::DataCheckHold
                | TimingRole::NonSeqSetup
                | TimingRole::NonSeqHold
        )
    }

    pub fn is_non_seq_timing_check(self) -> bool {
        matches!(self, TimingRole::NonSeqSetup | TimingRole::NonSeqHold)
    }

    /// Corner a check constrains: setup-like checks the max (late) path, hold-like the min.
    pub fn path_min_max(self) -> Option<MinMax> {
        match self {
            TimingRole::Setup
            | TimingRole::Recovery
            | TimingRole::OutputSetup
            | TimingRole::GatedClockSetup
            | TimingRole::LatchSetup
            | TimingRole::DataCheckSetup
            | TimingRole::NonSeqSetup
            | TimingRole::ClockTreePathMax => Some(MinMax::Max),
            TimingRole::Hold
            | TimingRole::Removal
            | TimingRole::OutputHold
            | TimingRole::GatedClockHold
            | TimingRole::LatchHold
            | TimingRole::DataCheckHold
            | TimingRole::NonSeqHold
            | TimingRole::ClockTreePathMin => Some(MinMax::Min),
            _ => None,
        }
    }

    /// The role this one is classified as: latch enable behaves like a register
    /// clock, and the check variants fold into setup or hold.
    pub fn generic_role(self) -> TimingRole {
        match self {
            TimingRole::LatchEnToQ => TimingRole::RegClkToQ,
            TimingRole::Recovery
            | TimingRole::OutputSetup
            | TimingRole::GatedClockSetup
            | TimingRole::LatchSetup
            | TimingRole::DataCheckSetup
            | TimingRole::NonSeqSetup => TimingRole::Setup,
            TimingRole::Removal
            | TimingRole::OutputHold
            | TimingRole::GatedClockHold
            | TimingRole::LatchHold
            | TimingRole::DataCheckHold
            | TimingRole::NonSeqHold => TimingRole::Hold,
            role => role,
        }
    }

    pub fn sdf_role(self) -> TimingRole {
        if self.is_sdf_iopath() {
            TimingRole::SdfIopath
        } else {
            self
        }
    }

    pub fn is_wire(self) -> bool {
        self == TimingRole::Wire
    }

    /// Checks between two pins; width and period constrain a single pin.
    pub fn is_timing_check_between(self) -> bool {
        self.is_timing_check() && self != TimingRole::Width && self != TimingRole::Period
    }

    pub fn is_async_timing_check(self) -> bool {
        matches!(self, TimingRole::Recovery | TimingRole::Removal)
    }

    pub fn is_data_check(self) -> bool {
        matches!(self, TimingRole::DataCheckSetup | TimingRole::DataCheckHold)
    }

    pub fn is_latch_d_to_q(self) -> bool {
        self == TimingRole::LatchDToQ
    }

    pub fn is_latch_setup(self) -> bool {
        matches!(self, TimingRole::LatchSetup | TimingRole::LatchHold)
    }

    pub fn less(self, other: TimingRole) -> bool {
        self.index() < other.index()
    }
}

impl Display for TimingRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name lookup over every role. Cheap to build; construct one where it is needed.
#[derive(Debug, Clone)]
pub struct TimingRoleRegistry {
    by_name: FxHashMap<&'static str, TimingRole>,
}

impl TimingRoleRegistry {
    pub fn new() -> Self {
        Self {
            by_name: TimingRole::ALL.into_iter().map(|role| (role.name(), role)).collect(),
        }
    }

    pub fn find(&self, name: &str) -> Option<TimingRole> {
        self.by_name.get(name).copied()
    }

    pub fn roles(&self) -> impl Iterator<Item = TimingRole> {
        TimingRole::ALL.into_iter()
    }
}

impl Default for TimingRoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_stable() {
        for (i, role) in TimingRole::ALL.into_iter().enumerate() {
            assert_eq!(role.index(), i);
            assert_eq!(TimingRole::from_index(i), Some(role));
        }
        assert_eq!(TimingRole::from_index(TimingRole::COUNT), None);
        assert_eq!(TimingRole::ClockTreePathMax.index(), 28);
    }

    #[test]
    fn registry_lookup() {
        let registry = TimingRoleRegistry::new();
        for role in registry.roles() {
            assert_eq!(registry.find(role.name()), Some(role));
        }
        assert_eq!(registry.find("Latch En to Q"), Some(TimingRole::LatchEnToQ));
        assert_eq!(registry.find("bogus"), None);
    }

    #[test]
    fn classification() {
        assert_eq!(TimingRole::LatchEnToQ.generic_role(), TimingRole::RegClkToQ);
        assert_eq!(TimingRole::Recovery.generic_role(), TimingRole::Setup);
        assert_eq!(TimingRole::NonSeqHold.generic_role(), TimingRole::Hold);
        assert_eq!(TimingRole::Width.generic_role(), TimingRole::Width);
        assert_eq!(TimingRole::Combinational.sdf_role(), TimingRole::SdfIopath);
        assert_eq!(TimingRole::Setup.sdf_role(), TimingRole::Setup);

        assert!(TimingRole::Setup.is_timing_check_between());
        assert!(TimingRole::Width.is_timing_check());
        assert!(!TimingRole::Width.is_timing_check_between());
        assert!(!TimingRole::Period.is_timing_check_between());
        assert!(TimingRole::Removal.is_async_timing_check());
        assert!(TimingRole::DataCheckHold.is_data_check());
        assert!(TimingRole::LatchHold.is_latch_setup());
        assert!(TimingRole::NonSeqSetup.is_non_seq_timing_check());
        assert!(TimingRole::LatchDToQ.is_latch_d_to_q());
        assert!(TimingRole::Wire.is_wire());
        assert!(!TimingRole::Wire.is_sdf_iopath());

        assert_eq!(TimingRole::Hold.path_min_max(), Some(MinMax::Min));
        assert_eq!(TimingRole::Recovery.path_min_max(), Some(MinMax::Max));
        assert_eq!(TimingRole::Combinational.path_min_max(), None);
        assert!(TimingRole::Wire.less(TimingRole::Setup));
        assert!(TimingRole::Setup < TimingRole::Hold);
    }
}
