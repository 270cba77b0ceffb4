//! Liberty `timing_type` values and how they classify arcs.

use crate::report::Report;
use crate::scale_factors::ScaleFactorType;
use crate::timing_role::TimingRole;
use crate::types::RiseFall;
use miniserde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const MSG_NO_ROLE: u32 = 1250;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingType {
    #[serde(rename = "combinational")]
    Combinational,
    #[serde(rename = "combinational_rise")]
    CombinationalRise,
    #[serde(rename = "combinational_fall")]
    CombinationalFall,
    #[serde(rename = "three_state_disable")]
    ThreeStateDisable,
    #[serde(rename = "three_state_disable_rise")]
    ThreeStateDisableRise,
    #[serde(rename = "three_state_disable_fall")]
    ThreeStateDisableFall,
    #[serde(rename = "three_state_enable")]
    ThreeStateEnable,
    #[serde(rename = "three_state_enable_rise")]
    ThreeStateEnableRise,
    #[serde(rename = "three_state_enable_fall")]
    ThreeStateEnableFall,
    #[serde(rename = "rising_edge")]
    RisingEdge,
    #[serde(rename = "falling_edge")]
    FallingEdge,
    #[serde(rename = "preset")]
    Preset,
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "hold_rising")]
    HoldRising,
    #[serde(rename = "hold_falling")]
    HoldFalling,
    #[serde(rename = "setup_rising")]
    SetupRising,
    #[serde(rename = "setup_falling")]
    SetupFalling,
    #[serde(rename = "recovery_rising")]
    RecoveryRising,
    #[serde(rename = "recovery_falling")]
    RecoveryFalling,
    #[serde(rename = "removal_rising")]
    RemovalRising,
    #[serde(rename = "removal_falling")]
    RemovalFalling,
    #[serde(rename = "skew_rising")]
    SkewRising,
    #[serde(rename = "skew_falling")]
    SkewFalling,
    #[serde(rename = "min_pulse_width")]
    MinPulseWidth,
    #[serde(rename = "minimum_period")]
    MinimumPeriod,
    #[serde(rename = "max_clock_tree_path")]
    MaxClockTreePath,
    #[serde(rename = "min_clock_tree_path")]
    MinClockTreePath,
    #[serde(rename = "non_seq_setup_rising")]
    NonSeqSetupRising,
    #[serde(rename = "non_seq_setup_falling")]
    NonSeqSetupFalling,
    #[serde(rename = "non_seq_hold_rising")]
    NonSeqHoldRising,
    #[serde(rename = "non_seq_hold_falling")]
    NonSeqHoldFalling,
    #[serde(rename = "nochange_high_high")]
    NochangeHighHigh,
    #[serde(rename = "nochange_high_low")]
    NochangeHighLow,
    #[serde(rename = "nochange_low_high")]
    NochangeLowHigh,
    #[serde(rename = "nochange_low_low")]
    NochangeLowLow,
    #[serde(rename = "retaining_time")]
    RetainingTime,
    #[serde(rename = "unknown")]
    Unknown,
}

impl TimingType {
    pub const ALL: [TimingType; 37] = [
        TimingType::Combinational,
        TimingType::CombinationalRise,
        TimingType::CombinationalFall,
        TimingType::ThreeStateDisable,
        TimingType::ThreeStateDisableRise,
        TimingType::ThreeStateDisableFall,
        TimingType::ThreeStateEnable,
        TimingType::ThreeStateEnableRise,
        TimingType::ThreeStateEnableFall,
        TimingType::RisingEdge,
        TimingType::FallingEdge,
        TimingType::Preset,
        TimingType::Clear,
        TimingType::HoldRising,
        TimingType::HoldFalling,
        TimingType::SetupRising,
        TimingType::SetupFalling,
        TimingType::RecoveryRising,
        TimingType::RecoveryFalling,
        TimingType::RemovalRising,
        TimingType::RemovalFalling,
        TimingType::SkewRising,
        TimingType::SkewFalling,
        TimingType::MinPulseWidth,
        TimingType::MinimumPeriod,
        TimingType::MaxClockTreePath,
        TimingType::MinClockTreePath,
        TimingType::NonSeqSetupRising,
        TimingType::NonSeqSetupFalling,
        TimingType::NonSeqHoldRising,
        TimingType::NonSeqHoldFalling,
        TimingType::NochangeHighHigh,
        TimingType::NochangeHighLow,
        TimingType::NochangeLowHigh,
        TimingType::NochangeLowLow,
        TimingType::RetainingTime,
        TimingType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimingType::Combinational => "combinational",
            TimingType::CombinationalRise => "combinational_rise",
            TimingType::CombinationalFall => "combinational_fall",
            TimingType::ThreeStateDisable => "three_state_disable",
            TimingType::ThreeStateDisableRise => "three_state_disable_rise",
            TimingType::ThreeStateDisableFall => "three_state_disable_fall",
            TimingType::ThreeStateEnable => "three_state_enable",
            TimingType::ThreeStateEnableRise => "three_state_enable_rise",
            TimingType::ThreeStateEnableFall => "three_state_enable_fall",
            TimingType::RisingEdge => "rising_edge",
            TimingType::FallingEdge => "falling_edge",
            TimingType::Preset => "preset",
            TimingType::Clear => "clear",
            TimingType::HoldRising => "hold_rising",
            TimingType::HoldFalling => "hold_falling",
            TimingType::SetupRising => "setup_rising",
            TimingType::SetupFalling => "setup_falling",
            TimingType::RecoveryRising => "recovery_rising",
            TimingType::RecoveryFalling => "recovery_falling",
            TimingType::RemovalRising => "removal_rising",
            TimingType::RemovalFalling => "removal_falling",
            TimingType::SkewRising => "skew_rising",
            TimingType::SkewFalling => "skew_falling",
            TimingType::MinPulseWidth => "min_pulse_width",
            TimingType::MinimumPeriod => "minimum_period",
            TimingType::MaxClockTreePath => "max_clock_tree_path",
            TimingType::MinClockTreePath => "min_clock_tree_path",
            TimingType::NonSeqSetupRising => "non_seq_setup_rising",
            TimingType::NonSeqSetupFalling => "non_seq_setup_falling",
            TimingType::NonSeqHoldRising => "non_seq_hold_rising",
            TimingType::NonSeqHoldFalling => "non_seq_hold_falling",
            TimingType::NochangeHighHigh => "nochange_high_high",
            TimingType::NochangeHighLow => "nochange_high_low",
            TimingType::NochangeLowHigh => "nochange_low_high",
            TimingType::NochangeLowLow => "nochange_low_low",
            TimingType::RetainingTime => "retaining_time",
            TimingType::Unknown => "unknown",
        }
    }

    pub fn from_liberty_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }

    pub fn is_check(self) -> bool {
        use TimingType::*;
        matches!(
            self,
            HoldRising
                | HoldFalling
                | SetupRising
                | SetupFalling
                | RecoveryRising
                | RecoveryFalling
                | RemovalRising
                | RemovalFalling
                | SkewRising
                | SkewFalling
                | MinPulseWidth
                | MinimumPeriod
                | NonSeqSetupRising
                | NonSeqSetupFalling
                | NonSeqHoldRising
                | NonSeqHoldFalling
                | NochangeHighHigh
                | NochangeHighLow
                | NochangeLowHigh
                | NochangeLowLow
        )
    }

    /// k-factor class used to derate tables of arcs with this timing type.
    pub fn scale_factor_type(self) -> ScaleFactorType {
        use TimingType::*;
        match self {
            Combinational | CombinationalRise | CombinationalFall | ThreeStateDisable | ThreeStateDisableRise
            | ThreeStateDisableFall | ThreeStateEnable | ThreeStateEnableRise | ThreeStateEnableFall | RisingEdge
            | FallingEdge | Preset | Clear | RetainingTime | MaxClockTreePath | MinClockTreePath => {
                ScaleFactorType::Cell
            }
            HoldRising | HoldFalling | NonSeqHoldRising | NonSeqHoldFalling => ScaleFactorType::Hold,
            SetupRising | SetupFalling | NonSeqSetupRising | NonSeqSetupFalling => ScaleFactorType::Setup,
            RecoveryRising | RecoveryFalling => ScaleFactorType::Recovery,
            RemovalRising | RemovalFalling => ScaleFactorType::Removal,
            SkewRising | SkewFalling => ScaleFactorType::Skew,
            MinPulseWidth => ScaleFactorType::MinPulseWidth,
            MinimumPeriod => ScaleFactorType::MinPeriod,
            NochangeHighHigh | NochangeHighLow | NochangeLowHigh | NochangeLowLow => ScaleFactorType::Nochange,
            Unknown => ScaleFactorType::Unknown,
        }
    }

    /// Clock (related pin) edge named by edge-sensitive timing types.
    pub fn related_edge(self) -> Option<RiseFall> {
        use TimingType::*;
        match self {
            RisingEdge | HoldRising | SetupRising | RecoveryRising | RemovalRising | SkewRising | NonSeqSetupRising
            | NonSeqHoldRising => Some(RiseFall::Rise),
            FallingEdge | HoldFalling | SetupFalling | RecoveryFalling | RemovalFalling | SkewFalling
            | NonSeqSetupFalling | NonSeqHoldFalling => Some(RiseFall::Fall),
            _ => None,
        }
    }

    /// Role of the arc set built for this timing type. Latches use the latch
    /// flavours of clock-to-output and setup/hold.
    pub fn role(self, is_latch: bool) -> Option<TimingRole> {
        use TimingType::*;
        let role = match self {
            Combinational | CombinationalRise | CombinationalFall => TimingRole::Combinational,
            ThreeStateDisable | ThreeStateDisableRise | ThreeStateDisableFall => TimingRole::TristateDisable,
            ThreeStateEnable | ThreeStateEnableRise | ThreeStateEnableFall => TimingRole::TristateEnable,
            RisingEdge | FallingEdge if is_latch => TimingRole::LatchEnToQ,
            RisingEdge | FallingEdge => TimingRole::RegClkToQ,
            Preset | Clear => TimingRole::RegSetClr,
            SetupRising | SetupFalling if is_latch => TimingRole::LatchSetup,
            SetupRising | SetupFalling => TimingRole::Setup,
            HoldRising | HoldFalling if is_latch => TimingRole::LatchHold,
            HoldRising | HoldFalling => TimingRole::Hold,
            RecoveryRising | RecoveryFalling => TimingRole::Recovery,
            RemovalRising | RemovalFalling => TimingRole::Removal,
            SkewRising | SkewFalling => TimingRole::Skew,
            MinPulseWidth => TimingRole::Width,
            MinimumPeriod => TimingRole::Period,
            NonSeqSetupRising | NonSeqSetupFalling => TimingRole::NonSeqSetup,
            NonSeqHoldRising | NonSeqHoldFalling => TimingRole::NonSeqHold,
            NochangeHighHigh | NochangeHighLow | NochangeLowHigh | NochangeLowLow => TimingRole::Nochange,
            MaxClockTreePath => TimingRole::ClockTreePathMax,
            MinClockTreePath => TimingRole::ClockTreePathMin,
            RetainingTime | Unknown => return None,
        };
        Some(role)
    }

    /// [`Self::role`], reporting timing types that have none.
    pub fn role_reported(self, is_latch: bool, report: &dyn Report) -> Option<TimingRole> {
        let role = self.role(is_latch);
        if role.is_none() {
            report.warn(MSG_NO_ROLE, &format!("timing_type {} has no timing role", self));
        }
        role
    }
}

impl Display for TimingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
