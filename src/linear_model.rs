//! Liberty `cmos_linear` delay model: intrinsic delay plus drive resistance times load.

use crate::delay::{ArcDelay, Slew};
use crate::library::LibertyCell;
use crate::pvt::Pvt;
use crate::timing_model::{CheckTimingModel, GateTimingModel, TimingModel};
use std::sync::Arc;

#[derive(Debug)]
pub struct GateLinearModel {
    cell: Arc<LibertyCell>,
    intrinsic: f32,
    resistance: f32,
}

impl GateLinearModel {
    pub fn new(cell: Arc<LibertyCell>, intrinsic: f32, resistance: f32) -> Self {
        Self {
            cell,
            intrinsic,
            resistance,
        }
    }

    pub fn intrinsic(&self) -> f32 {
        self.intrinsic
    }

    pub fn resistance(&self) -> f32 {
        self.resistance
    }
}

impl TimingModel for GateLinearModel {
    fn as_gate(&self) -> Option<&dyn GateTimingModel> {
        Some(self)
    }

    fn set_is_scaled(&mut self, _: bool) {}
}

impl GateTimingModel for GateLinearModel {
    /// The linear model has no slew dependence and produces a zero slew.
    fn gate_delay(&self, _: Option<&Pvt>, _: f32, load_cap: f32, _: bool) -> (ArcDelay, Slew) {
        (ArcDelay::new(self.intrinsic + self.resistance * load_cap), Slew::ZERO)
    }

    fn report_gate_delay(&self, _: Option<&Pvt>, _: f32, load_cap: f32, _: bool, digits: usize) -> String {
        let units = self.cell.library().units();
        let delay = self.intrinsic + self.resistance * load_cap;
        format!(
            "Delay = {} + {} * {} = {}\n",
            units.time.as_string_digits(self.intrinsic, digits),
            units.resistance.as_string_digits(self.resistance, digits),
            units.capacitance.as_string_digits(load_cap, digits),
            units.time.as_string_digits(delay, digits)
        )
    }

    fn drive_resistance(&self, _: Option<&Pvt>) -> f32 {
        self.resistance
    }
}

/// Constant timing check margin.
#[derive(Debug)]
pub struct CheckLinearModel {
    cell: Arc<LibertyCell>,
    intrinsic: f32,
}

impl CheckLinearModel {
    pub fn new(cell: Arc<LibertyCell>, intrinsic: f32) -> Self {
        Self { cell, intrinsic }
    }

    pub fn intrinsic(&self) -> f32 {
        self.intrinsic
    }
}

impl TimingModel for CheckLinearModel {
    fn as_check(&self) -> Option<&dyn CheckTimingModel> {
        Some(self)
    }

    fn set_is_scaled(&mut self, _: bool) {}
}

impl CheckTimingModel for CheckLinearModel {
    fn check_delay(&self, _: Option<&Pvt>, _: f32, _: f32, _: f32, _: bool) -> ArcDelay {
        ArcDelay::new(self.intrinsic)
    }

    fn report_check_delay(&self, _: Option<&Pvt>, _: f32, _: f32, _: f32, _: bool, digits: usize) -> String {
        let units = self.cell.library().units();
        format!("Check = {}\n", units.time.as_string_digits(self.intrinsic, digits))
    }
}
