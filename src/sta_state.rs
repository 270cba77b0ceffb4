use crate::report::{LogReport, Report};
use crate::units::Units;
use std::sync::Arc;

/// Analysis context consumed by delay arithmetic and reporting.
///
/// Constructed once by the host and passed by reference; nothing in the
/// crate reads process-wide state.
#[derive(Clone)]
pub struct StaState {
    pocv_enabled: bool,
    sigma_factor: f32,
    units: Arc<Units>,
    report: Arc<dyn Report>,
}

impl StaState {
    pub fn new(units: Units, report: Arc<dyn Report>) -> Self {
        Self {
            pocv_enabled: false,
            sigma_factor: 1.0,
            units: Arc::new(units),
            report,
        }
    }

    /// Enable parametric OCV; delays project to `mean ± sigma * sigma_factor`.
    pub fn with_pocv(mut self, sigma_factor: f32) -> Self {
        self.pocv_enabled = true;
        self.sigma_factor = sigma_factor;
        self
    }

    pub fn pocv_enabled(&self) -> bool {
        self.pocv_enabled
    }

    pub fn set_pocv_enabled(&mut self, enabled: bool) {
        self.pocv_enabled = enabled;
    }

    pub fn sigma_factor(&self) -> f32 {
        self.sigma_factor
    }

    pub fn set_sigma_factor(&mut self, factor: f32) {
        self.sigma_factor = factor;
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn report(&self) -> &dyn Report {
        &*self.report
    }
}

impl Default for StaState {
    fn default() -> Self {
        Self::new(Units::default(), Arc::new(LogReport))
    }
}

impl std::fmt::Debug for StaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaState")
            .field("pocv_enabled", &self.pocv_enabled)
            .field("sigma_factor", &self.sigma_factor)
            .field("units", &self.units)
            .finish()
    }
}
