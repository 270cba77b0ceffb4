use crate::delay::{make_delay, ArcDelay, Delay, DelayVariance, Slew, Variance};
use crate::library::LibertyCell;
use crate::output_waveforms::OutputWaveforms;
use crate::pvt::Pvt;
use crate::receiver_model::ReceiverModel;
use crate::table::Table;
use crate::table_axis::{TableAxis, TableAxisVariable};
use crate::table_model::TableModel;
use crate::timing_model::{report_pvt, GateTimingModel, TimingModel};
use crate::types::MinMax;
use std::sync::Arc;

/// Gate delay and output slew from NLDM tables indexed by input slew and output load.
#[derive(Debug)]
pub struct GateTableModel {
    cell: Arc<LibertyCell>,
    delay_model: Option<TableModel>,
    /// Indexed by `EarlyLate::index`.
    delay_sigma_models: [Option<TableModel>; 2],
    slew_model: Option<TableModel>,
    slew_sigma_models: [Option<TableModel>; 2],
    receiver_model: Option<Arc<ReceiverModel>>,
    output_waveforms: Option<Box<OutputWaveforms>>,
}

impl GateTableModel {
    pub fn new(
        cell: Arc<LibertyCell>,
        delay_model: Option<TableModel>,
        delay_sigma_models: [Option<TableModel>; 2],
        slew_model: Option<TableModel>,
        slew_sigma_models: [Option<TableModel>; 2],
        receiver_model: Option<Arc<ReceiverModel>>,
        output_waveforms: Option<OutputWaveforms>,
    ) -> Self {
        Self {
            cell,
            delay_model,
            delay_sigma_models,
            slew_model,
            slew_sigma_models,
            receiver_model,
            output_waveforms: output_waveforms.map(Box::new),
        }
    }

    /// Delay and slew tables only.
    pub fn basic(cell: Arc<LibertyCell>, delay_model: TableModel, slew_model: TableModel) -> Self {
        Self::new(
            cell,
            Some(delay_model),
            [None, None],
            Some(slew_model),
            [None, None],
            None,
            None,
        )
    }

    pub fn cell(&self) -> &LibertyCell {
        &self.cell
    }

    pub fn delay_model(&self) -> Option<&TableModel> {
        self.delay_model.as_ref()
    }

    pub fn delay_sigma_model(&self, early_late: MinMax) -> Option<&TableModel> {
        self.delay_sigma_models[early_late.index()].as_ref()
    }

    pub fn slew_model(&self) -> Option<&TableModel> {
        self.slew_model.as_ref()
    }

    pub fn slew_sigma_model(&self, early_late: MinMax) -> Option<&TableModel> {
        self.slew_sigma_models[early_late.index()].as_ref()
    }

    pub fn receiver_model(&self) -> Option<&Arc<ReceiverModel>> {
        self.receiver_model.as_ref()
    }

    pub fn output_waveforms(&self) -> Option<&OutputWaveforms> {
        self.output_waveforms.as_deref()
    }

    /// Delay and slew for a driver with three-variable tables that also depend
    /// on the load of a related output pin.
    pub fn gate_delay_related(
        &self,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
    ) -> (ArcDelay, Slew) {
        self.find_delay_slew::<DelayVariance>(pvt, in_slew, load_cap, related_out_cap, pocv_enabled)
    }

    /// Delay and slew in any delay representation. Delay and slew tables are
    /// read at the same coordinates; sigma tables only when `pocv_enabled`.
    pub fn find_delay_slew<V: Variance>(
        &self,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
    ) -> (Delay<V>, Delay<V>) {
        let load_cap = self.clip_load(load_cap);
        let lookup = |model: Option<&TableModel>| self.find_value(pvt, model, in_slew, load_cap, related_out_cap);

        let delay = lookup(self.delay_model.as_ref());
        let (delay_sigma_early, delay_sigma_late) = if pocv_enabled {
            (
                lookup(self.delay_sigma_model(MinMax::EARLY)),
                lookup(self.delay_sigma_model(MinMax::LATE)),
            )
        } else {
            (0.0, 0.0)
        };

        let slew = lookup(self.slew_model.as_ref());
        let (slew_sigma_early, slew_sigma_late) = if pocv_enabled {
            (
                lookup(self.slew_sigma_model(MinMax::EARLY)),
                lookup(self.slew_sigma_model(MinMax::LATE)),
            )
        } else {
            (0.0, 0.0)
        };
        // Extrapolated slews can go negative.
        let slew = slew.max(0.0);

        (
            make_delay(delay, delay_sigma_early, delay_sigma_late),
            make_delay(slew, slew_sigma_early, slew_sigma_late),
        )
    }

    /// Loads beyond the characterized range are evaluated at the largest characterized load.
    fn clip_load(&self, load_cap: f32) -> f32 {
        match self.max_characterized_cap() {
            Some(max_cap) if load_cap > max_cap => max_cap,
            _ => load_cap,
        }
    }

    fn max_characterized_cap(&self) -> Option<f32> {
        let model = self.slew_model.as_ref().or(self.delay_model.as_ref())?;
        model
            .table()
            .axes()
            .find(|axis| axis.variable() == TableAxisVariable::TotalOutputNetCapacitance)
            .map(|axis| axis.max())
    }

    /// Output slew at the largest characterized load, and that load.
    /// Tables without a load axis give `(0, 1)`.
    pub fn max_cap_slew(&self, in_slew: f32, pvt: Option<&Pvt>) -> (f32, f32) {
        let Some(cap) = self.max_characterized_cap() else {
            return (0.0, 1.0);
        };
        let slew = self.find_value(pvt, self.slew_model.as_ref(), in_slew, cap, 0.0);
        (slew.max(0.0), cap)
    }

    fn find_value(
        &self,
        pvt: Option<&Pvt>,
        model: Option<&TableModel>,
        in_slew: f32,
        load_cap: f32,
        related_out_cap: f32,
    ) -> f32 {
        let Some(model) = model else {
            return 0.0;
        };
        let [v1, v2, v3] = axis_values(model, in_slew, load_cap, related_out_cap);
        model.find_value(&self.cell, pvt, v1, v2, v3)
    }

    pub fn report_gate_delay_related(
        &self,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
        related_out_cap: f32,
        pocv_enabled: bool,
        digits: usize,
    ) -> String {
        let mut result = report_pvt(&self.cell, pvt, digits);
        let load_cap = self.clip_load(load_cap);
        let lookup = |name: &str, model: Option<&TableModel>| {
            self.report_table_lookup(name, pvt, model, in_slew, load_cap, related_out_cap, digits)
        };
        result.push_str(&lookup("Delay", self.delay_model.as_ref()));
        if pocv_enabled {
            result.push_str(&lookup("Delay sigma(early)", self.delay_sigma_model(MinMax::EARLY)));
            result.push_str(&lookup("Delay sigma(late)", self.delay_sigma_model(MinMax::LATE)));
        }
        result.push('\n');
        result.push_str(&lookup("Slew", self.slew_model.as_ref()));
        if pocv_enabled {
            result.push_str(&lookup("Slew sigma(early)", self.slew_sigma_model(MinMax::EARLY)));
            result.push_str(&lookup("Slew sigma(late)", self.slew_sigma_model(MinMax::LATE)));
        }
        let slew = self.find_value(pvt, self.slew_model.as_ref(), in_slew, load_cap, related_out_cap);
        if slew < 0.0 {
            result.push_str("Negative slew clipped to 0.0\n");
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn report_table_lookup(
        &self,
        result_name: &str,
        pvt: Option<&Pvt>,
        model: Option<&TableModel>,
        in_slew: f32,
        load_cap: f32,
        related_out_cap: f32,
        digits: usize,
    ) -> String {
        let Some(model) = model else {
            return String::new();
        };
        let values = axis_values(model, in_slew, load_cap, related_out_cap);
        let time_unit = &self.cell.library().units().time;
        model.report_value(result_name, &self.cell, pvt, values, time_unit, digits)
    }

    /// True if every axis of `table` is one the gate model knows how to index.
    pub fn check_axes(table: &Table) -> bool {
        table.axes().all(|axis| Self::check_axis(axis))
    }

    pub fn check_axis(axis: &TableAxis) -> bool {
        matches!(
            axis.variable(),
            TableAxisVariable::TotalOutputNetCapacitance
                | TableAxisVariable::InputTransitionTime
                | TableAxisVariable::InputNetTransition
                | TableAxisVariable::RelatedOutTotalOutputNetCapacitance
        )
    }
}

fn axis_values(model: &TableModel, in_slew: f32, load_cap: f32, related_out_cap: f32) -> [f32; 3] {
    let value = |axis: Option<&Arc<TableAxis>>| match axis {
        Some(axis) => axis_value(axis, in_slew, load_cap, related_out_cap),
        None => 0.0,
    };
    [value(model.axis1()), value(model.axis2()), value(model.axis3())]
}

fn axis_value(axis: &TableAxis, in_slew: f32, load_cap: f32, related_out_cap: f32) -> f32 {
    match axis.variable() {
        TableAxisVariable::InputTransitionTime | TableAxisVariable::InputNetTransition => in_slew,
        TableAxisVariable::TotalOutputNetCapacitance => load_cap,
        TableAxisVariable::RelatedOutTotalOutputNetCapacitance => related_out_cap,
        var => panic!("unsupported gate table axis {}", var),
    }
}

impl TimingModel for GateTableModel {
    fn as_gate(&self) -> Option<&dyn GateTimingModel> {
        Some(self)
    }

    fn set_is_scaled(&mut self, is_scaled: bool) {
        let models = [&mut self.delay_model, &mut self.slew_model]
            .into_iter()
            .chain(self.delay_sigma_models.iter_mut())
            .chain(self.slew_sigma_models.iter_mut());
        for model in models.flatten() {
            model.set_is_scaled(is_scaled);
        }
    }
}

impl GateTimingModel for GateTableModel {
    fn gate_delay(&self, pvt: Option<&Pvt>, in_slew: f32, load_cap: f32, pocv_enabled: bool) -> (ArcDelay, Slew) {
        self.gate_delay_related(pvt, in_slew, load_cap, 0.0, pocv_enabled)
    }

    fn report_gate_delay(
        &self,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
        pocv_enabled: bool,
        digits: usize,
    ) -> String {
        self.report_gate_delay_related(pvt, in_slew, load_cap, 0.0, pocv_enabled, digits)
    }

    fn drive_resistance(&self, pvt: Option<&Pvt>) -> f32 {
        let (slew, cap) = self.max_cap_slew(0.0, pvt);
        slew / cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::{Deterministic, Normal2};
    use crate::library::LibertyLibrary;
    use crate::scale_factors::ScaleFactorType;
    use crate::types::RiseFall;
    use crate::units::Units;

    fn cell() -> Arc<LibertyCell> {
        let lib = LibertyLibrary::new("lib", Units::unscaled(), Pvt::default());
        Arc::new(LibertyCell::new("BUF", Arc::new(lib)))
    }

    fn axis(variable: TableAxisVariable, values: &[f32]) -> Arc<TableAxis> {
        Arc::new(TableAxis::new(variable, values.to_vec()).unwrap())
    }

    fn model2(f: impl Fn(f32, f32) -> f32) -> TableModel {
        let slews = axis(TableAxisVariable::InputNetTransition, &[0.1, 0.5, 1.0]);
        let caps = axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0, 5.0, 10.0]);
        let values = slews
            .values()
            .iter()
            .map(|&s| caps.values().iter().map(|&c| f(s, c)).collect())
            .collect();
        let table = Table::new2(values, slews, caps).unwrap();
        TableModel::new(Arc::new(table), None, ScaleFactorType::Cell, RiseFall::Rise)
    }

    fn delay(s: f32, c: f32) -> f32 {
        0.05 + 0.2 * s + 0.01 * c
    }

    fn slew(s: f32, c: f32) -> f32 {
        -0.1 + 0.1 * s + 0.02 * c
    }

    #[test]
    fn lookup_at_shared_coordinates() {
        let model = GateTableModel::basic(cell(), model2(delay), model2(slew));
        let (d, s) = model.find_delay_slew::<Deterministic>(None, 0.3, 3.0, 0.0, false);
        assert!((d.mean() - delay(0.3, 3.0)).abs() < 1e-6);
        assert!((s.mean() - slew(0.3, 3.0)).abs() < 1e-6);
    }

    #[test]
    fn negative_slew_clipped() {
        let model = GateTableModel::basic(cell(), model2(delay), model2(slew));
        let (_, s) = model.gate_delay(None, 0.1, 1.0, false);
        assert_eq!(s.mean(), 0.0);
        let text = model.report_gate_delay(None, 0.1, 1.0, false, 3);
        assert!(text.ends_with("Negative slew clipped to 0.0\n"));
    }

    #[test]
    fn load_beyond_table_is_clipped() {
        let model = GateTableModel::basic(cell(), model2(delay), model2(slew));
        let (at_max, _) = model.gate_delay(None, 0.5, 10.0, false);
        let (beyond, _) = model.gate_delay(None, 0.5, 40.0, false);
        assert_eq!(at_max, beyond);
    }

    #[test]
    fn sigma_tables_only_with_pocv() {
        let early = model2(|_, _| 0.03);
        let late = model2(|_, _| 0.04);
        let model = GateTableModel::new(
            cell(),
            Some(model2(delay)),
            [Some(early), Some(late)],
            Some(model2(slew)),
            [None, None],
            None,
            None,
        );
        let (d, _) = model.find_delay_slew::<Normal2>(None, 0.5, 5.0, 0.0, true);
        assert!((d.sigma(MinMax::EARLY) - 0.03).abs() < 1e-6);
        assert!((d.sigma(MinMax::LATE) - 0.04).abs() < 1e-6);
        let (d, s) = model.find_delay_slew::<Normal2>(None, 0.5, 5.0, 0.0, false);
        assert_eq!(d.sigma2(MinMax::LATE), 0.0);
        assert_eq!(s.sigma2(MinMax::EARLY), 0.0);

        let text = model.report_gate_delay(None, 0.5, 5.0, true, 3);
        assert!(text.contains("Delay sigma(early) = 0.030\n"));
        assert!(text.contains("Delay sigma(late) = 0.040\n"));
        assert!(!text.contains("Slew sigma"));
    }

    #[test]
    fn drive_resistance_from_max_cap() {
        let model = GateTableModel::basic(cell(), model2(delay), model2(slew));
        let (max_slew, cap) = model.max_cap_slew(0.0, None);
        assert_eq!(cap, 10.0);
        assert!((max_slew - slew(0.0, 10.0)).abs() < 1e-6);
        assert!((model.drive_resistance(None) - max_slew / 10.0).abs() < 1e-6);

        let flat = TableModel::new(Arc::new(Table::scalar(0.2)), None, ScaleFactorType::Cell, RiseFall::Rise);
        let scalar = GateTableModel::basic(cell(), flat.clone(), flat);
        assert_eq!(scalar.max_cap_slew(0.3, None), (0.0, 1.0));
    }

    #[test]
    fn axis_checks() {
        let ok = model2(delay);
        assert!(GateTableModel::check_axes(ok.table()));
        let time = axis(TableAxisVariable::Time, &[0.0, 1.0]);
        let bad = Table::new1(vec![0.0, 1.0], time).unwrap();
        assert!(!GateTableModel::check_axes(&bad));
        assert!(GateTableModel::check_axes(&Table::scalar(1.0)));
    }

    #[test]
    fn report_layout() {
        let model = GateTableModel::basic(cell(), model2(delay), model2(slew));
        let text = model.report_gate_delay(None, 0.3, 3.0, false, 3);
        assert!(text.starts_with("Table is indexed by\n  input_net_transition = 0.300\n"));
        assert!(text.contains("\nDelay = "));
        assert!(text.contains("\n\nTable is indexed by"));
        assert!(text.contains("\nSlew = "));
        assert!(!text.contains("PVT scale factor"));
    }

    #[test]
    fn scaled_flag_reaches_every_table() {
        let mut model = GateTableModel::basic(cell(), model2(delay), model2(slew));
        model.set_is_scaled(true);
        assert!(model.delay_model().unwrap().is_scaled());
        assert!(model.slew_model().unwrap().is_scaled());
        assert!(model.as_gate().is_some());
        assert!(model.as_check().is_none());
    }
}
