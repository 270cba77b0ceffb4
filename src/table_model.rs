use crate::library::LibertyCell;
use crate::pvt::Pvt;
use crate::scale_factors::ScaleFactorType;
use crate::table::{Table, TableTemplate};
use crate::table_axis::TableAxis;
use crate::types::RiseFall;
use crate::units::Unit;
use std::sync::Arc;

/// A [`Table`] bound to the k-factor class that derates its values.
#[derive(Debug, Clone)]
pub struct TableModel {
    table: Arc<Table>,
    template: Option<Arc<TableTemplate>>,
    scale_factor_type: ScaleFactorType,
    rf: RiseFall,
    /// Values were characterized at the analysis PVT already.
    is_scaled: bool,
}

impl TableModel {
    pub fn new(
        table: Arc<Table>,
        template: Option<Arc<TableTemplate>>,
        scale_factor_type: ScaleFactorType,
        rf: RiseFall,
    ) -> Self {
        Self {
            table,
            template,
            scale_factor_type,
            rf,
            is_scaled: false,
        }
    }

    pub fn order(&self) -> usize {
        self.table.order()
    }

    pub fn axis1(&self) -> Option<&Arc<TableAxis>> {
        self.table.axis1()
    }

    pub fn axis2(&self) -> Option<&Arc<TableAxis>> {
        self.table.axis2()
    }

    pub fn axis3(&self) -> Option<&Arc<TableAxis>> {
        self.table.axis3()
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn table_template(&self) -> Option<&Arc<TableTemplate>> {
        self.template.as_ref()
    }

    pub fn scale_factor_type(&self) -> ScaleFactorType {
        self.scale_factor_type
    }

    pub fn rf(&self) -> RiseFall {
        self.rf
    }

    pub fn rf_index(&self) -> usize {
        self.rf.index()
    }

    pub fn is_scaled(&self) -> bool {
        self.is_scaled
    }

    /// Latches: once marked scaled the table is never k-factor scaled again,
    /// and `false` is ignored.
    pub fn set_is_scaled(&mut self, is_scaled: bool) {
        self.is_scaled |= is_scaled;
    }

    pub fn value(&self, index1: usize, index2: usize, index3: usize) -> f32 {
        self.table.value(index1, index2, index3)
    }

    pub fn scale_factor(&self, cell: &LibertyCell, pvt: Option<&Pvt>) -> f32 {
        if self.is_scaled {
            1.0
        } else {
            cell.scale_factor(self.scale_factor_type, self.rf, pvt)
        }
    }

    pub fn find_value(&self, cell: &LibertyCell, pvt: Option<&Pvt>, value1: f32, value2: f32, value3: f32) -> f32 {
        self.table.find_value(value1, value2, value3) * self.scale_factor(cell, pvt)
    }

    pub fn report_value(
        &self,
        result_name: &str,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
        values: [f32; 3],
        table_unit: &Unit,
        digits: usize,
    ) -> String {
        let units = cell.library().units();
        let mut result = self.table.report_value("Table value", units, table_unit, values, digits);
        result.push_str(&self.report_pvt_scale_factor(cell, pvt, digits));
        let value = self.find_value(cell, pvt, values[0], values[1], values[2]);
        result.push_str(&format!(
            "{} = {}\n",
            result_name,
            table_unit.as_string_digits(value, digits)
        ));
        result
    }

    /// Empty when neither `pvt` nor default operating conditions are known.
    pub fn report_pvt_scale_factor(&self, cell: &LibertyCell, pvt: Option<&Pvt>, digits: usize) -> String {
        let library = cell.library();
        let has_pvt = pvt.is_some() || library.default_operating_conditions().is_some();
        if !has_pvt {
            return String::new();
        }
        format!("PVT scale factor = {:.*}\n", digits, self.scale_factor(cell, pvt))
    }
}
