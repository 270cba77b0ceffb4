//! The seams between timing arcs and the models that compute their values.

use crate::delay::{ArcDelay, Slew};
use crate::library::LibertyCell;
use crate::pvt::Pvt;
use std::fmt::Debug;

pub trait TimingModel: Send + Sync + Debug {
    fn as_gate(&self) -> Option<&dyn GateTimingModel> {
        None
    }

    fn as_check(&self) -> Option<&dyn CheckTimingModel> {
        None
    }

    /// Mark the model's tables as characterized at the analysis PVT, disabling k-factor scaling.
    /// One-shot: a later `false` does not re-enable scaling.
    fn set_is_scaled(&mut self, is_scaled: bool);
}

/// Propagation delay and output transition through a cell.
pub trait GateTimingModel: TimingModel {
    fn gate_delay(&self, pvt: Option<&Pvt>, in_slew: f32, load_cap: f32, pocv_enabled: bool) -> (ArcDelay, Slew);

    fn report_gate_delay(
        &self,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
        pocv_enabled: bool,
        digits: usize,
    ) -> String;

    /// Equivalent driver resistance, for simplified wire delay calculation.
    fn drive_resistance(&self, pvt: Option<&Pvt>) -> f32;
}

/// Setup/hold style margin between two pins. Which check it is comes from the arc's role.
pub trait CheckTimingModel: TimingModel {
    fn check_delay(
        &self,
        pvt: Option<&Pvt>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
    ) -> ArcDelay;

    fn report_check_delay(
        &self,
        pvt: Option<&Pvt>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
        digits: usize,
    ) -> String;
}

/// `P = .. V = .. T = ..` line for the lookup PVT, or the library default when `pvt` is `None`.
pub(crate) fn report_pvt(cell: &LibertyCell, pvt: Option<&Pvt>, digits: usize) -> String {
    let library = cell.library();
    let pvt = pvt.or_else(|| library.default_operating_conditions().map(|op_cond| &op_cond.pvt));
    match pvt {
        Some(pvt) => format!(
            "P = {:.*} V = {:.*} T = {:.*}\n",
            digits, pvt.process, digits, pvt.voltage, digits, pvt.temperature
        ),
        None => String::new(),
    }
}
