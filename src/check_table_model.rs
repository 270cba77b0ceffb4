use crate::delay::{make_delay, ArcDelay, Delay, Variance};
use crate::library::LibertyCell;
use crate::pvt::Pvt;
use crate::table::Table;
use crate::table_axis::{TableAxis, TableAxisVariable};
use crate::table_model::TableModel;
use crate::timing_model::{CheckTimingModel, TimingModel};
use crate::types::MinMax;
use std::sync::Arc;

/// Timing check margin from tables indexed by the related (clock) and constrained (data) pin slews.
#[derive(Debug)]
pub struct CheckTableModel {
    cell: Arc<LibertyCell>,
    model: Option<TableModel>,
    sigma_models: [Option<TableModel>; 2],
}

impl CheckTableModel {
    pub fn new(cell: Arc<LibertyCell>, model: Option<TableModel>, sigma_models: [Option<TableModel>; 2]) -> Self {
        Self {
            cell,
            model,
            sigma_models,
        }
    }

    pub fn cell(&self) -> &LibertyCell {
        &self.cell
    }

    pub fn model(&self) -> Option<&TableModel> {
        self.model.as_ref()
    }

    pub fn sigma_model(&self, early_late: MinMax) -> Option<&TableModel> {
        self.sigma_models[early_late.index()].as_ref()
    }

    /// Margin in any delay representation. Zero without a table.
    pub fn find_check_delay<V: Variance>(
        &self,
        pvt: Option<&Pvt>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
    ) -> Delay<V> {
        if self.model.is_none() {
            return Delay::ZERO;
        }
        let lookup = |model: Option<&TableModel>| self.find_value(pvt, model, from_slew, to_slew, related_out_cap);
        let mean = lookup(self.model.as_ref());
        let (sigma_early, sigma_late) = if pocv_enabled {
            (
                lookup(self.sigma_model(MinMax::EARLY)),
                lookup(self.sigma_model(MinMax::LATE)),
            )
        } else {
            (0.0, 0.0)
        };
        make_delay(mean, sigma_early, sigma_late)
    }

    fn find_value(
        &self,
        pvt: Option<&Pvt>,
        model: Option<&TableModel>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
    ) -> f32 {
        let Some(model) = model else {
            return 0.0;
        };
        let [v1, v2, v3] = axis_values(model, from_slew, to_slew, related_out_cap);
        model.find_value(&self.cell, pvt, v1, v2, v3)
    }

    pub fn check_axes(table: &Table) -> bool {
        table.axes().all(|axis| Self::check_axis(axis))
    }

    pub fn check_axis(axis: &TableAxis) -> bool {
        matches!(
            axis.variable(),
            TableAxisVariable::ConstrainedPinTransition
                | TableAxisVariable::RelatedPinTransition
                | TableAxisVariable::RelatedOutTotalOutputNetCapacitance
        )
    }
}

fn axis_values(model: &TableModel, from_slew: f32, to_slew: f32, related_out_cap: f32) -> [f32; 3] {
    let value = |axis: Option<&Arc<TableAxis>>| match axis {
        Some(axis) => match axis.variable() {
            TableAxisVariable::RelatedPinTransition => from_slew,
            TableAxisVariable::ConstrainedPinTransition => to_slew,
            TableAxisVariable::RelatedOutTotalOutputNetCapacitance => related_out_cap,
            var => panic!("unsupported check table axis {}", var),
        },
        None => 0.0,
    };
    [value(model.axis1()), value(model.axis2()), value(model.axis3())]
}

impl TimingModel for CheckTableModel {
    fn as_check(&self) -> Option<&dyn CheckTimingModel> {
        Some(self)
    }

    fn set_is_scaled(&mut self, is_scaled: bool) {
        for model in std::iter::once(&mut self.model).chain(self.sigma_models.iter_mut()).flatten() {
            model.set_is_scaled(is_scaled);
        }
    }
}

impl CheckTimingModel for CheckTableModel {
    fn check_delay(
        &self,
        pvt: Option<&Pvt>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
    ) -> ArcDelay {
        self.find_check_delay(pvt, from_slew, to_slew, related_out_cap, pocv_enabled)
    }

    fn report_check_delay(
        &self,
        pvt: Option<&Pvt>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
        digits: usize,
    ) -> String {
        let time_unit = &self.cell.library().units().time;
        let report = |name: &str, model: Option<&TableModel>| match model {
            Some(model) => {
                let values = axis_values(model, from_slew, to_slew, related_out_cap);
                model.report_value(name, &self.cell, pvt, values, time_unit, digits)
            }
            None => String::new(),
        };
        let mut result = report("Check", self.model.as_ref());
        if pocv_enabled {
            result.push_str(&report("Check sigma early", self.sigma_model(MinMax::EARLY)));
            result.push_str(&report("Check sigma late", self.sigma_model(MinMax::LATE)));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::Normal1;
    use crate::library::LibertyLibrary;
    use crate::scale_factors::ScaleFactorType;
    use crate::types::RiseFall;
    use crate::units::Units;

    fn cell() -> Arc<LibertyCell> {
        let lib = LibertyLibrary::new("lib", Units::unscaled(), Pvt::default());
        Arc::new(LibertyCell::new("DFF", Arc::new(lib)))
    }

    fn setup_model(value: impl Fn(f32, f32) -> f32) -> TableModel {
        // Liberty setup tables are commonly indexed constrained-first.
        let data = Arc::new(TableAxis::new(TableAxisVariable::ConstrainedPinTransition, vec![0.1, 0.4]).unwrap());
        let clock = Arc::new(TableAxis::new(TableAxisVariable::RelatedPinTransition, vec![0.1, 0.2]).unwrap());
        let values = data
            .values()
            .iter()
            .map(|&d| clock.values().iter().map(|&c| value(c, d)).collect())
            .collect();
        let table = Table::new2(values, data, clock).unwrap();
        TableModel::new(Arc::new(table), None, ScaleFactorType::Setup, RiseFall::Rise)
    }

    #[test]
    fn axes_routed_by_variable() {
        let model = CheckTableModel::new(cell(), Some(setup_model(|clk, data| clk - 2.0 * data)), [None, None]);
        let margin = model.check_delay(None, 0.15, 0.25, 0.0, false);
        assert!((margin.mean() - (0.15 - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn missing_model_is_zero() {
        let model = CheckTableModel::new(cell(), None, [None, None]);
        assert_eq!(model.check_delay(None, 0.1, 0.1, 0.0, true).mean(), 0.0);
        assert_eq!(model.report_check_delay(None, 0.1, 0.1, 0.0, true, 3), "");
    }

    #[test]
    fn sigma_models() {
        let model = CheckTableModel::new(
            cell(),
            Some(setup_model(|_, _| 0.2)),
            [Some(setup_model(|_, _| 0.01)), Some(setup_model(|_, _| 0.02))],
        );
        let margin: Delay<Normal1> = model.find_check_delay(None, 0.1, 0.1, 0.0, true);
        assert!((margin.sigma(MinMax::LATE) - 0.02).abs() < 1e-6);
        let text = model.report_check_delay(None, 0.1, 0.1, 0.0, true, 2);
        assert!(text.contains("Check = 0.20\n"));
        assert!(text.contains("Check sigma early = 0.01\n"));
        assert!(text.contains("Check sigma late = 0.02\n"));
    }

    #[test]
    fn axis_checks() {
        assert!(CheckTableModel::check_axes(setup_model(|_, _| 0.0).table()));
        let slew = Arc::new(TableAxis::new(TableAxisVariable::InputNetTransition, vec![0.1]).unwrap());
        assert!(!CheckTableModel::check_axes(&Table::new1(vec![0.0], slew).unwrap()));
    }
}
