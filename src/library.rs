//! The slice of a Liberty library that delay calculation reads.
//!
//! These are populated by the host's Liberty reader; this crate only consults
//! them for units, nominal PVT and k-factor scaling.

use crate::pvt::{OperatingConditions, Pvt};
use crate::scale_factors::{ScaleFactorType, ScaleFactors};
use crate::types::RiseFall;
use crate::units::Units;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LibertyLibrary {
    name: CompactString,
    units: Units,
    nominal: Pvt,
    operating_conditions: FxHashMap<CompactString, OperatingConditions>,
    default_operating_conditions: Option<CompactString>,
    scale_factors: Option<Arc<ScaleFactors>>,
}

impl LibertyLibrary {
    pub fn new(name: &str, units: Units, nominal: Pvt) -> Self {
        Self {
            name: name.into(),
            units,
            nominal,
            operating_conditions: FxHashMap::default(),
            default_operating_conditions: None,
            scale_factors: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn nominal_pvt(&self) -> &Pvt {
        &self.nominal
    }

    pub fn add_operating_conditions(&mut self, op_cond: OperatingConditions) {
        self.operating_conditions.insert(op_cond.name.clone(), op_cond);
    }

    pub fn find_operating_conditions(&self, name: &str) -> Option<&OperatingConditions> {
        self.operating_conditions.get(name)
    }

    /// Select the conditions used when a lookup is given no explicit PVT.
    /// Returns false if no operating conditions of that name were added.
    pub fn set_default_operating_conditions(&mut self, name: &str) -> bool {
        if !self.operating_conditions.contains_key(name) {
            return false;
        }
        self.default_operating_conditions = Some(name.into());
        true
    }

    pub fn default_operating_conditions(&self) -> Option<&OperatingConditions> {
        self.default_operating_conditions
            .as_ref()
            .and_then(|name| self.operating_conditions.get(name))
    }

    pub fn set_scale_factors(&mut self, scale_factors: Arc<ScaleFactors>) {
        self.scale_factors = Some(scale_factors);
    }

    pub fn scale_factors(&self) -> Option<&Arc<ScaleFactors>> {
        self.scale_factors.as_ref()
    }

    /// k-factor correction at `pvt` (default operating conditions when `None`).
    /// `cell` factors take precedence over the library's own.
    pub fn scale_factor(&self, ty: ScaleFactorType, rf: RiseFall, cell: Option<&LibertyCell>, pvt: Option<&Pvt>) -> f32 {
        let pvt = pvt.or_else(|| self.default_operating_conditions().map(|op_cond| &op_cond.pvt));
        let scale_factors = cell
            .and_then(LibertyCell::scale_factors)
            .or(self.scale_factors.as_ref());
        match (pvt, scale_factors) {
            (Some(pvt), Some(scale_factors)) => scale_factors.scale_factor(ty, rf, pvt, &self.nominal),
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LibertyCell {
    name: CompactString,
    library: Arc<LibertyLibrary>,
    scale_factors: Option<Arc<ScaleFactors>>,
}

impl LibertyCell {
    pub fn new(name: &str, library: Arc<LibertyLibrary>) -> Self {
        Self {
            name: name.into(),
            library,
            scale_factors: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn library(&self) -> &LibertyLibrary {
        &self.library
    }

    pub fn set_scale_factors(&mut self, scale_factors: Arc<ScaleFactors>) {
        self.scale_factors = Some(scale_factors);
    }

    pub fn scale_factors(&self) -> Option<&Arc<ScaleFactors>> {
        self.scale_factors.as_ref()
    }

    pub fn scale_factor(&self, ty: ScaleFactorType, rf: RiseFall, pvt: Option<&Pvt>) -> f32 {
        self.library.scale_factor(ty, rf, Some(self), pvt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale_factors::ScaleFactorPvt;

    fn library(with_factors: bool) -> LibertyLibrary {
        let mut lib = LibertyLibrary::new("lib", Units::default(), Pvt::new(1.0, 1.8, 25.0));
        lib.add_operating_conditions(OperatingConditions::new("slow", Pvt::new(1.0, 1.8, 125.0)));
        assert!(lib.set_default_operating_conditions("slow"));
        assert!(!lib.set_default_operating_conditions("fast"));
        if with_factors {
            let mut factors = ScaleFactors::new("lib_k");
            factors.set_scale(ScaleFactorType::Cell, ScaleFactorPvt::Temp, RiseFall::Rise, 0.001);
            lib.set_scale_factors(Arc::new(factors));
        }
        lib
    }

    #[test]
    fn default_operating_conditions_apply() {
        let lib = library(true);
        let factor = lib.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, None, None);
        assert!((factor - 1.1).abs() < 1e-5);
        let nominal = *lib.nominal_pvt();
        assert_eq!(lib.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, None, Some(&nominal)), 1.0);
    }

    #[test]
    fn no_factors_means_unscaled() {
        let lib = library(false);
        assert_eq!(lib.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, None, None), 1.0);
    }

    #[test]
    fn cell_factors_take_precedence() {
        let lib = Arc::new(library(true));
        let mut cell = LibertyCell::new("BUF", lib.clone());
        let mut factors = ScaleFactors::new("cell_k");
        factors.set_scale(ScaleFactorType::Cell, ScaleFactorPvt::Temp, RiseFall::Rise, 0.002);
        cell.set_scale_factors(Arc::new(factors));
        let factor = cell.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, None);
        assert!((factor - 1.2).abs() < 1e-5);
        assert_eq!(cell.library().name(), "lib");
    }
}
