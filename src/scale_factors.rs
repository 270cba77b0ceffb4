//! Liberty `k_*` derating factors.
//!
//! A library is characterized at a nominal PVT. When analysis runs at a
//! different PVT, each quantity class (cell delay, setup, pin capacitance...)
//! is scaled by `1 + Δ * k` for each of process, voltage and temperature.

use crate::pvt::Pvt;
use crate::types::RiseFall;
use compact_str::CompactString;
use miniserde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleFactorType {
    #[serde(rename = "pin_cap")]
    PinCap,
    #[serde(rename = "wire_cap")]
    WireCap,
    #[serde(rename = "wire_res")]
    WireRes,
    #[serde(rename = "min_period")]
    MinPeriod,
    /// Cell delay and cell slew.
    #[serde(rename = "cell")]
    Cell,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "setup")]
    Setup,
    #[serde(rename = "recovery")]
    Recovery,
    #[serde(rename = "removal")]
    Removal,
    #[serde(rename = "nochange")]
    Nochange,
    #[serde(rename = "skew")]
    Skew,
    #[serde(rename = "leakage_power")]
    LeakagePower,
    #[serde(rename = "internal_power")]
    InternalPower,
    #[serde(rename = "transition")]
    Transition,
    #[serde(rename = "min_pulse_width")]
    MinPulseWidth,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ScaleFactorType {
    pub const COUNT: usize = 16;
    pub const ALL: [ScaleFactorType; Self::COUNT] = [
        ScaleFactorType::PinCap,
        ScaleFactorType::WireCap,
        ScaleFactorType::WireRes,
        ScaleFactorType::MinPeriod,
        ScaleFactorType::Cell,
        ScaleFactorType::Hold,
        ScaleFactorType::Setup,
        ScaleFactorType::Recovery,
        ScaleFactorType::Removal,
        ScaleFactorType::Nochange,
        ScaleFactorType::Skew,
        ScaleFactorType::LeakagePower,
        ScaleFactorType::InternalPower,
        ScaleFactorType::Transition,
        ScaleFactorType::MinPulseWidth,
        ScaleFactorType::Unknown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleFactorType::PinCap => "pin_cap",
            ScaleFactorType::WireCap => "wire_cap",
            ScaleFactorType::WireRes => "wire_res",
            ScaleFactorType::MinPeriod => "min_period",
            ScaleFactorType::Cell => "cell",
            ScaleFactorType::Hold => "hold",
            ScaleFactorType::Setup => "setup",
            ScaleFactorType::Recovery => "recovery",
            ScaleFactorType::Removal => "removal",
            ScaleFactorType::Nochange => "nochange",
            ScaleFactorType::Skew => "skew",
            ScaleFactorType::LeakagePower => "leakage_power",
            ScaleFactorType::InternalPower => "internal_power",
            ScaleFactorType::Transition => "transition",
            ScaleFactorType::MinPulseWidth => "min_pulse_width",
            ScaleFactorType::Unknown => "unknown",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// `k_process_cell_rise`
    pub fn has_rise_fall_suffix(self) -> bool {
        matches!(
            self,
            ScaleFactorType::Cell
                | ScaleFactorType::Hold
                | ScaleFactorType::Setup
                | ScaleFactorType::Recovery
                | ScaleFactorType::Removal
                | ScaleFactorType::Nochange
                | ScaleFactorType::Skew
        )
    }

    /// `k_process_rise_transition`
    pub fn has_rise_fall_prefix(self) -> bool {
        self == ScaleFactorType::Transition
    }

    /// `k_process_min_pulse_width_high`
    pub fn has_low_high_suffix(self) -> bool {
        self == ScaleFactorType::MinPulseWidth
    }

    /// Liberty attribute naming this factor. Rise maps to `high` for pulse widths.
    /// Types without a rise/fall variant give the same name for both edges.
    pub fn liberty_attr_name(self, pvt: ScaleFactorPvt, rf: RiseFall) -> String {
        let pvt = pvt.as_str();
        let name = self.as_str();
        if self.has_rise_fall_suffix() {
            format!("k_{}_{}_{}", pvt, name, rf.as_str())
        } else if self.has_rise_fall_prefix() {
            format!("k_{}_{}_{}", pvt, rf.as_str(), name)
        } else if self.has_low_high_suffix() {
            let high_low = match rf {
                RiseFall::Rise => "high",
                RiseFall::Fall => "low",
            };
            format!("k_{}_{}_{}", pvt, name, high_low)
        } else {
            format!("k_{}_{}", pvt, name)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleFactorPvt {
    #[serde(rename = "process")]
    Process,
    #[serde(rename = "volt")]
    Volt,
    #[serde(rename = "temp")]
    Temp,
}

impl ScaleFactorPvt {
    pub const COUNT: usize = 3;
    pub const ALL: [ScaleFactorPvt; Self::COUNT] = [ScaleFactorPvt::Process, ScaleFactorPvt::Volt, ScaleFactorPvt::Temp];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleFactorPvt::Process => "process",
            ScaleFactorPvt::Volt => "volt",
            ScaleFactorPvt::Temp => "temp",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

#[derive(Debug, Error)]
pub enum ScaleFactorsError {
    #[error("malformed scale factor json")]
    Json(#[from] miniserde::Error),
    #[error("unknown scale factor attribute `{0}`")]
    UnknownAttribute(String),
}

/// One named set of k-factors, indexed by (type, pvt, rise/fall). Unset factors are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactors {
    name: CompactString,
    scales: [[[f32; RiseFall::INDEX_COUNT]; ScaleFactorPvt::COUNT]; ScaleFactorType::COUNT],
}

impl ScaleFactors {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            scales: [[[0.0; RiseFall::INDEX_COUNT]; ScaleFactorPvt::COUNT]; ScaleFactorType::COUNT],
        }
    }

    /// Build from a JSON object mapping Liberty `k_*` attribute names to values,
    /// e.g. `{"k_process_cell_rise": 0.1, "k_temp_setup_fall": -0.002}`.
    pub fn from_json(name: &str, json: &str) -> Result<Self, ScaleFactorsError> {
        let attrs: BTreeMap<String, f32> = miniserde::json::from_str(json)?;
        let mut factors = Self::new(name);
        for (attr, value) in attrs {
            if !factors.set_liberty_attr(&attr, value) {
                return Err(ScaleFactorsError::UnknownAttribute(attr));
            }
        }
        Ok(factors)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_scale(&mut self, ty: ScaleFactorType, pvt: ScaleFactorPvt, rf: RiseFall, value: f32) {
        self.scales[ty.index()][pvt.index()][rf.index()] = value;
    }

    /// Set both edges at once, for types without a rise/fall variant.
    pub fn set_scale_both(&mut self, ty: ScaleFactorType, pvt: ScaleFactorPvt, value: f32) {
        self.scales[ty.index()][pvt.index()] = [value; RiseFall::INDEX_COUNT];
    }

    pub fn scale(&self, ty: ScaleFactorType, pvt: ScaleFactorPvt, rf: RiseFall) -> f32 {
        self.scales[ty.index()][pvt.index()][rf.index()]
    }

    /// Apply a Liberty attribute such as `k_volt_rise_transition`.
    /// Returns false when the name is not a known k-factor.
    pub fn set_liberty_attr(&mut self, attr: &str, value: f32) -> bool {
        if !attr.starts_with("k_") {
            return false;
        }
        let mut matched = false;
        for ty in ScaleFactorType::ALL {
            if ty == ScaleFactorType::Unknown {
                continue;
            }
            for pvt in ScaleFactorPvt::ALL {
                for rf in RiseFall::ALL {
                    if ty.liberty_attr_name(pvt, rf) == attr {
                        self.set_scale(ty, pvt, rf, value);
                        matched = true;
                    }
                }
            }
        }
        matched
    }

    /// Multiplicative correction for analysing at `pvt` a quantity characterized at `nominal`.
    pub fn scale_factor(&self, ty: ScaleFactorType, rf: RiseFall, pvt: &Pvt, nominal: &Pvt) -> f32 {
        let process = 1.0 + (pvt.process - nominal.process) * self.scale(ty, ScaleFactorPvt::Process, rf);
        let temp = 1.0 + (pvt.temperature - nominal.temperature) * self.scale(ty, ScaleFactorPvt::Temp, rf);
        let volt = 1.0 + (pvt.voltage - nominal.voltage) * self.scale(ty, ScaleFactorPvt::Volt, rf);
        process * temp * volt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liberty_attr_names() {
        assert_eq!(
            ScaleFactorType::Cell.liberty_attr_name(ScaleFactorPvt::Process, RiseFall::Rise),
            "k_process_cell_rise"
        );
        assert_eq!(
            ScaleFactorType::Transition.liberty_attr_name(ScaleFactorPvt::Volt, RiseFall::Fall),
            "k_volt_fall_transition"
        );
        assert_eq!(
            ScaleFactorType::MinPulseWidth.liberty_attr_name(ScaleFactorPvt::Temp, RiseFall::Fall),
            "k_temp_min_pulse_width_low"
        );
        assert_eq!(
            ScaleFactorType::PinCap.liberty_attr_name(ScaleFactorPvt::Temp, RiseFall::Fall),
            "k_temp_pin_cap"
        );
    }

    #[test]
    fn set_liberty_attrs() {
        let mut factors = ScaleFactors::new("k");
        assert!(factors.set_liberty_attr("k_temp_setup_fall", 0.5));
        assert!(factors.set_liberty_attr("k_process_wire_res", 0.25));
        assert!(!factors.set_liberty_attr("k_temp_bogus", 1.0));
        assert!(!factors.set_liberty_attr("temp_setup_fall", 1.0));
        assert_eq!(factors.scale(ScaleFactorType::Setup, ScaleFactorPvt::Temp, RiseFall::Fall), 0.5);
        assert_eq!(factors.scale(ScaleFactorType::Setup, ScaleFactorPvt::Temp, RiseFall::Rise), 0.0);
        assert_eq!(factors.scale(ScaleFactorType::WireRes, ScaleFactorPvt::Process, RiseFall::Rise), 0.25);
        assert_eq!(factors.scale(ScaleFactorType::WireRes, ScaleFactorPvt::Process, RiseFall::Fall), 0.25);
    }

    #[test]
    fn k_factor_math() {
        let mut factors = ScaleFactors::new("k");
        factors.set_scale(ScaleFactorType::Cell, ScaleFactorPvt::Temp, RiseFall::Rise, 0.01);
        factors.set_scale(ScaleFactorType::Cell, ScaleFactorPvt::Volt, RiseFall::Rise, -0.5);
        let nominal = Pvt::new(1.0, 1.0, 25.0);
        let pvt = Pvt::new(1.0, 0.9, 125.0);
        let factor = factors.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, &pvt, &nominal);
        assert!((factor - 2.0 * 1.05).abs() < 1e-5);
        assert_eq!(factors.scale_factor(ScaleFactorType::Cell, RiseFall::Fall, &pvt, &nominal), 1.0);
        assert_eq!(factors.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, &nominal, &nominal), 1.0);
    }

    #[test]
    fn from_json() {
        let factors =
            ScaleFactors::from_json("lib", r#"{"k_process_cell_rise": 0.1, "k_volt_rise_transition": -0.2}"#).unwrap();
        assert_eq!(factors.name(), "lib");
        assert_eq!(factors.scale(ScaleFactorType::Cell, ScaleFactorPvt::Process, RiseFall::Rise), 0.1);
        assert_eq!(factors.scale(ScaleFactorType::Transition, ScaleFactorPvt::Volt, RiseFall::Rise), -0.2);

        assert!(matches!(
            ScaleFactors::from_json("lib", r#"{"k_nope": 1.0}"#),
            Err(ScaleFactorsError::UnknownAttribute(_))
        ));
        assert!(matches!(ScaleFactors::from_json("lib", "[1, 2"), Err(ScaleFactorsError::Json(_))));
    }
}
