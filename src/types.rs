use compact_str::CompactString;
use miniserde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type PortName = CompactString;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiseFall {
    /// 0 -> 1
    #[serde(rename = "rise")]
    Rise,
    /// 1 -> 0
    #[serde(rename = "fall")]
    Fall,
}

impl RiseFall {
    pub const INDEX_COUNT: usize = 2;
    pub const ALL: [RiseFall; 2] = [RiseFall::Rise, RiseFall::Fall];

    pub fn index(self) -> usize {
        match self {
            RiseFall::Rise => 0,
            RiseFall::Fall => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(RiseFall::Rise),
            1 => Some(RiseFall::Fall),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            RiseFall::Rise => RiseFall::Fall,
            RiseFall::Fall => RiseFall::Rise,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiseFall::Rise => "rise",
            RiseFall::Fall => "fall",
        }
    }

    pub fn as_transition(self) -> Transition {
        match self {
            RiseFall::Rise => Transition::Rise,
            RiseFall::Fall => Transition::Fall,
        }
    }
}

impl Display for RiseFall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RiseFall::Rise => write!(f, "↗"),
            RiseFall::Fall => write!(f, "↘"),
        }
    }
}

/// Edge of a timing arc end point.
/// Besides plain rise/fall this covers the tristate and unknown transitions
/// SDF distinguishes (`01`, `10`, `0z`, `z1`, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transition {
    Rise,
    Fall,
    Tr0Z,
    TrZ1,
    Tr1Z,
    TrZ0,
    Tr0X,
    TrX1,
    Tr1X,
    TrX0,
    TrXZ,
    TrZX,
    /// Either rise or fall.
    RiseFall,
}

impl Transition {
    pub const ALL: [Transition; 13] = [
        Transition::Rise,
        Transition::Fall,
        Transition::Tr0Z,
        Transition::TrZ1,
        Transition::Tr1Z,
        Transition::TrZ0,
        Transition::Tr0X,
        Transition::TrX1,
        Transition::Tr1X,
        Transition::TrX0,
        Transition::TrXZ,
        Transition::TrZX,
        Transition::RiseFall,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The rise/fall sense of the edge, when it has one.
    pub fn as_rise_fall(self) -> Option<RiseFall> {
        match self {
            Transition::Rise | Transition::Tr0Z | Transition::TrZ1 | Transition::Tr0X | Transition::TrX1 => {
                Some(RiseFall::Rise)
            }
            Transition::Fall | Transition::Tr1Z | Transition::TrZ0 | Transition::Tr1X | Transition::TrX0 => {
                Some(RiseFall::Fall)
            }
            Transition::TrXZ | Transition::TrZX | Transition::RiseFall => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Rise => "01",
            Transition::Fall => "10",
            Transition::Tr0Z => "0Z",
            Transition::TrZ1 => "Z1",
            Transition::Tr1Z => "1Z",
            Transition::TrZ0 => "Z0",
            Transition::Tr0X => "0X",
            Transition::TrX1 => "X1",
            Transition::Tr1X => "1X",
            Transition::TrX0 => "X0",
            Transition::TrXZ => "XZ",
            Transition::TrZX => "ZX",
            Transition::RiseFall => "*",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "^" | "rise" => return Some(Transition::Rise),
            "v" | "fall" => return Some(Transition::Fall),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|tr| tr.as_str().eq_ignore_ascii_case(name))
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Rise => write!(f, "↗"),
            Transition::Fall => write!(f, "↘"),
            tr => write!(f, "{}", tr.as_str()),
        }
    }
}

impl From<RiseFall> for Transition {
    fn from(rf: RiseFall) -> Self {
        rf.as_transition()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MinMax {
    #[serde(rename = "min")]
    Min,
    #[serde(rename = "max")]
    Max,
}

/// Early paths are searched with the min corner, late paths with the max corner.
pub type EarlyLate = MinMax;

impl MinMax {
    pub const INDEX_COUNT: usize = 2;
    pub const ALL: [MinMax; 2] = [MinMax::Min, MinMax::Max];
    pub const EARLY: EarlyLate = MinMax::Min;
    pub const LATE: EarlyLate = MinMax::Max;

    pub fn index(self) -> usize {
        match self {
            MinMax::Min => 0,
            MinMax::Max => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            MinMax::Min => MinMax::Max,
            MinMax::Max => MinMax::Min,
        }
    }

    /// Seed value for a min/max search over this corner.
    pub fn init_value(self) -> f32 {
        match self {
            MinMax::Min => crate::fuzzy::INF,
            MinMax::Max => -crate::fuzzy::INF,
        }
    }

    /// True if `v1` is more pessimistic than `v2` for this corner.
    pub fn compare(self, v1: f32, v2: f32) -> bool {
        match self {
            MinMax::Min => v1 < v2,
            MinMax::Max => v1 > v2,
        }
    }

    pub fn min_max(self, v1: f32, v2: f32) -> f32 {
        match self {
            MinMax::Min => v1.min(v2),
            MinMax::Max => v1.max(v2),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MinMax::Min => "min",
            MinMax::Max => "max",
        }
    }

    pub fn as_early_late_str(self) -> &'static str {
        match self {
            MinMax::Min => "early",
            MinMax::Max => "late",
        }
    }
}

impl Display for MinMax {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingSense {
    #[serde(rename = "positive_unate")]
    PositiveUnate,
    #[serde(rename = "negative_unate")]
    NegativeUnate,
    #[serde(rename = "non_unate")]
    NonUnate,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "unknown")]
    Unknown,
}

impl TimingSense {
    pub fn as_str(self) -> &'static str {
        match self {
            TimingSense::PositiveUnate => "positive_unate",
            TimingSense::NegativeUnate => "negative_unate",
            TimingSense::NonUnate => "non_unate",
            TimingSense::None => "none",
            TimingSense::Unknown => "unknown",
        }
    }

    pub fn from_liberty_name(name: &str) -> Option<Self> {
        match name {
            "positive_unate" => Some(TimingSense::PositiveUnate),
            "negative_unate" => Some(TimingSense::NegativeUnate),
            "non_unate" => Some(TimingSense::NonUnate),
            "none" => Some(TimingSense::None),
            "unknown" => Some(TimingSense::Unknown),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TimingSense::PositiveUnate => TimingSense::NegativeUnate,
            TimingSense::NegativeUnate => TimingSense::PositiveUnate,
            sense => sense,
        }
    }
}

impl Display for TimingSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_rise_fall() {
        assert_eq!(Transition::Rise.as_rise_fall(), Some(RiseFall::Rise));
        assert_eq!(Transition::Tr1Z.as_rise_fall(), Some(RiseFall::Fall));
        assert_eq!(Transition::TrZX.as_rise_fall(), None);
        assert_eq!(Transition::find("z1"), Some(Transition::TrZ1));
        assert_eq!(Transition::find("^"), Some(Transition::Rise));
        assert_eq!(Transition::find("bogus"), None);
    }

    #[test]
    fn unateness_from_json() {
        let sense: TimingSense = miniserde::json::from_str("\"negative_unate\"").unwrap();
        assert_eq!(sense, TimingSense::NegativeUnate);
        assert_eq!(sense.opposite(), TimingSense::PositiveUnate);
    }

    #[test]
    fn min_max_init_values() {
        assert!(MinMax::Min.init_value() > 1e29);
        assert!(MinMax::Max.init_value() < -1e29);
        assert!(MinMax::Max.compare(2.0, 1.0));
        assert!(MinMax::Min.compare(1.0, 2.0));
        assert_eq!(MinMax::EARLY.as_early_late_str(), "early");
    }
}
