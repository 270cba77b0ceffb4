use crate::library::LibertyCell;
use crate::table::Table;
use crate::table_axis::{TableAxis, TableAxisVariable};
use crate::table_model::TableModel;
use crate::types::RiseFall;
use std::sync::Arc;

/// Liberty CCS receiver capacitance: piecewise input pin capacitance per
/// waveform segment and input edge.
#[derive(Debug, Default)]
pub struct ReceiverModel {
    /// Indexed by `segment * 2 + rf.index()`.
    capacitance_models: Vec<Option<TableModel>>,
}

impl ReceiverModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_capacitance_model(&mut self, model: TableModel, segment: usize, rf: RiseFall) {
        let index = segment * RiseFall::INDEX_COUNT + rf.index();
        if self.capacitance_models.len() <= index {
            self.capacitance_models.resize_with(index + 1, || None);
        }
        self.capacitance_models[index] = Some(model);
    }

    pub fn capacitance_model(&self, segment: usize, rf: RiseFall) -> Option<&TableModel> {
        self.capacitance_models
            .get(segment * RiseFall::INDEX_COUNT + rf.index())
            .and_then(Option::as_ref)
    }

    pub fn segment_count(&self) -> usize {
        self.capacitance_models.len().div_ceil(RiseFall::INDEX_COUNT)
    }

    /// Receiver capacitance for `segment` at the given driver slew and load. 0 if not characterized.
    pub fn capacitance(&self, cell: &LibertyCell, segment: usize, rf: RiseFall, in_slew: f32, load_cap: f32) -> f32 {
        let Some(model) = self.capacitance_model(segment, rf) else {
            return 0.0;
        };
        let value = |axis: Option<&Arc<TableAxis>>| match axis.map(|a| a.variable()) {
            Some(TableAxisVariable::InputNetTransition) => in_slew,
            Some(TableAxisVariable::TotalOutputNetCapacitance) => load_cap,
            _ => 0.0,
        };
        model.find_value(cell, None, value(model.axis1()), value(model.axis2()), 0.0)
    }

    /// Receiver capacitance tables are indexed by slew, optionally with load in either order.
    pub fn check_axes(table: &Table) -> bool {
        let variables: Vec<TableAxisVariable> = table.axes().map(|axis| axis.variable()).collect();
        matches!(
            variables.as_slice(),
            [TableAxisVariable::InputNetTransition]
                | [TableAxisVariable::InputNetTransition, TableAxisVariable::TotalOutputNetCapacitance]
                | [TableAxisVariable::TotalOutputNetCapacitance, TableAxisVariable::InputNetTransition]
        )
    }
}
