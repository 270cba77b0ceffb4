//! Characterization tables of order 0 to 3 and their interpolation.

use crate::sta_state::StaState;
use crate::table_axis::{TableAxis, TableAxisVariable};
use crate::units::{Unit, Units};
use compact_str::CompactString;
use itertools::Itertools;
use std::fmt::Write;
use std::sync::Arc;
use thiserror::Error;

const MSG_ORDER3_REPORT: u32 = 1170;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("{0} axis has no values")]
    EmptyAxis(TableAxisVariable),
    #[error("{variable} axis value {index} is not greater than the previous value")]
    NonMonotonicAxis { variable: TableAxisVariable, index: usize },
    #[error("table dimension {dimension} has {actual} values, axis has {expected}")]
    ExtentMismatch {
        dimension: usize,
        expected: usize,
        actual: usize,
    },
    #[error("waveform {0} is not a table over time")]
    WaveformAxis(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum TableValues {
    Scalar(f32),
    Vector(Vec<f32>),
    /// Order 2: one row per `axis1` value. Order 3: one row per `(axis1, axis2)` pair.
    Matrix(Vec<Vec<f32>>),
}

/// Interpolation bracket along one axis.
#[derive(Debug, Copy, Clone)]
struct Bracket {
    lower: usize,
    upper: usize,
    /// Position of the value between `lower` (0) and `upper` (1); outside `[0, 1]` extrapolates.
    frac: f32,
}

impl Bracket {
    const NONE: Bracket = Bracket {
        lower: 0,
        upper: 0,
        frac: 0.0,
    };

    fn new(axis: Option<&Arc<TableAxis>>, value: f32) -> Self {
        let Some(axis) = axis else {
            return Self::NONE;
        };
        if axis.size() == 1 {
            return Self::NONE;
        }
        let lower = axis.find_axis_index(value);
        let x_lower = axis.axis_value(lower);
        let x_upper = axis.axis_value(lower + 1);
        Bracket {
            lower,
            upper: lower + 1,
            frac: (value - x_lower) / (x_upper - x_lower),
        }
    }

    fn corners(self) -> [(usize, f32); 2] {
        [(self.lower, 1.0 - self.frac), (self.upper, self.frac)]
    }
}

fn clip(axis: Option<&Arc<TableAxis>>, value: f32) -> f32 {
    match axis {
        Some(axis) => value.clamp(axis.min(), axis.max()),
        None => value,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    values: TableValues,
    axis1: Option<Arc<TableAxis>>,
    axis2: Option<Arc<TableAxis>>,
    axis3: Option<Arc<TableAxis>>,
}

impl Table {
    pub fn scalar(value: f32) -> Self {
        Self {
            values: TableValues::Scalar(value),
            axis1: None,
            axis2: None,
            axis3: None,
        }
    }

    pub fn new1(values: Vec<f32>, axis1: Arc<TableAxis>) -> Result<Self, TableError> {
        check_extent(1, axis1.size(), values.len())?;
        Ok(Self {
            values: TableValues::Vector(values),
            axis1: Some(axis1),
            axis2: None,
            axis3: None,
        })
    }

    pub fn new2(values: Vec<Vec<f32>>, axis1: Arc<TableAxis>, axis2: Arc<TableAxis>) -> Result<Self, TableError> {
        check_extent(1, axis1.size(), values.len())?;
        for row in &values {
            check_extent(2, axis2.size(), row.len())?;
        }
        Ok(Self {
            values: TableValues::Matrix(values),
            axis1: Some(axis1),
            axis2: Some(axis2),
            axis3: None,
        })
    }

    /// `values` has one row of `axis3` samples per `(index1, index2)`, at row `index1 * size2 + index2`.
    pub fn new3(
        values: Vec<Vec<f32>>,
        axis1: Arc<TableAxis>,
        axis2: Arc<TableAxis>,
        axis3: Arc<TableAxis>,
    ) -> Result<Self, TableError> {
        // Rows cover the first two dimensions together.
        check_extent(1, axis1.size() * axis2.size(), values.len())?;
        for row in &values {
            check_extent(3, axis3.size(), row.len())?;
        }
        Ok(Self {
            values: TableValues::Matrix(values),
            axis1: Some(axis1),
            axis2: Some(axis2),
            axis3: Some(axis3),
        })
    }

    pub fn order(&self) -> usize {
        match (&self.axis1, &self.axis2, &self.axis3) {
            (None, _, _) => 0,
            (Some(_), None, _) => 1,
            (Some(_), Some(_), None) => 2,
            (Some(_), Some(_), Some(_)) => 3,
        }
    }

    pub fn axis1(&self) -> Option<&Arc<TableAxis>> {
        self.axis1.as_ref()
    }

    pub fn axis2(&self) -> Option<&Arc<TableAxis>> {
        self.axis2.as_ref()
    }

    pub fn axis3(&self) -> Option<&Arc<TableAxis>> {
        self.axis3.as_ref()
    }

    pub fn axes(&self) -> impl Iterator<Item = &Arc<TableAxis>> {
        self.axis1.iter().chain(self.axis2.iter()).chain(self.axis3.iter())
    }

    /// Sample at grid position. Indices beyond the table order are ignored.
    pub fn value(&self, index1: usize, index2: usize, index3: usize) -> f32 {
        match &self.values {
            TableValues::Scalar(value) => *value,
            TableValues::Vector(values) => values[index1],
            TableValues::Matrix(rows) => match &self.axis2 {
                Some(axis2) if self.axis3.is_some() => rows[index1 * axis2.size() + index2][index3],
                _ => rows[index1][index2],
            },
        }
    }

    /// Piecewise (bi/tri)linear interpolation. Coordinates outside an axis
    /// extend the nearest edge segment; single-sample axes are constant.
    pub fn find_value(&self, value1: f32, value2: f32, value3: f32) -> f32 {
        if let TableValues::Scalar(value) = self.values {
            return value;
        }
        let b1 = Bracket::new(self.axis1.as_ref(), value1);
        let b2 = Bracket::new(self.axis2.as_ref(), value2);
        let b3 = Bracket::new(self.axis3.as_ref(), value3);
        let mut result = 0.0;
        for (i, w1) in b1.corners() {
            if w1 == 0.0 {
                continue;
            }
            for (j, w2) in b2.corners() {
                if w2 == 0.0 {
                    continue;
                }
                for (k, w3) in b3.corners() {
                    if w3 == 0.0 {
                        continue;
                    }
                    result += w1 * w2 * w3 * self.value(i, j, k);
                }
            }
        }
        result
    }

    /// Like [`Self::find_value`] with each coordinate clamped to its axis range first.
    pub fn find_value_clip(&self, value1: f32, value2: f32, value3: f32) -> f32 {
        self.find_value(
            clip(self.axis1.as_ref(), value1),
            clip(self.axis2.as_ref(), value2),
            clip(self.axis3.as_ref(), value3),
        )
    }

    /// Human readable trace of a lookup: the query point, the bracketing
    /// samples and the interpolated result.
    pub fn report_value(
        &self,
        result_name: &str,
        units: &Units,
        table_unit: &Unit,
        values: [f32; 3],
        digits: usize,
    ) -> String {
        let mut result = String::new();
        if self.order() == 0 {
            let _ = writeln!(
                result,
                "{} constant = {}",
                result_name,
                table_unit.as_string_digits(self.find_value(0.0, 0.0, 0.0), digits)
            );
            return result;
        }

        result.push_str("Table is indexed by\n");
        for (axis, value) in self.axes().zip(values) {
            let _ = writeln!(
                result,
                "  {} = {}",
                axis.variable(),
                axis.unit(units).as_string_digits(value, digits)
            );
        }

        let b1 = Bracket::new(self.axis1.as_ref(), values[0]);
        let b2 = Bracket::new(self.axis2.as_ref(), values[1]);
        let b3 = Bracket::new(self.axis3.as_ref(), values[2]);
        match (&self.axis1, &self.axis2, &self.axis3) {
            (Some(axis1), None, _) => {
                if axis1.size() != 1 {
                    let unit1 = axis1.unit(units);
                    let _ = writeln!(
                        result,
                        "  {}    {}",
                        unit1.as_string_digits(axis1.axis_value(b1.lower), digits),
                        unit1.as_string_digits(axis1.axis_value(b1.upper), digits)
                    );
                    result.push_str("    --------------------\n");
                    let _ = writeln!(
                        result,
                        "| {}    {}",
                        table_unit.as_string_digits(self.value(b1.lower, 0, 0), digits),
                        table_unit.as_string_digits(self.value(b1.upper, 0, 0), digits)
                    );
                }
            }
            (Some(axis1), Some(axis2), None) => {
                self.report_block(&mut result, units, table_unit, axis1, axis2, b1, b2, 0, digits);
            }
            (Some(axis1), Some(axis2), Some(axis3)) => {
                let unit3 = axis3.unit(units);
                let mut slices = vec![b3.lower];
                if b3.upper != b3.lower {
                    slices.push(b3.upper);
                }
                for k in slices {
                    let _ = writeln!(
                        result,
                        "  {} = {}",
                        axis3.variable(),
                        unit3.as_string_digits(axis3.axis_value(k), digits)
                    );
                    self.report_block(&mut result, units, table_unit, axis1, axis2, b1, b2, k, digits);
                }
            }
            _ => {}
        }
        let _ = writeln!(
            result,
            "{} = {}",
            result_name,
            table_unit.as_string_digits(self.find_value(values[0], values[1], values[2]), digits)
        );
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn report_block(
        &self,
        result: &mut String,
        units: &Units,
        table_unit: &Unit,
        axis1: &TableAxis,
        axis2: &TableAxis,
        b1: Bracket,
        b2: Bracket,
        index3: usize,
        digits: usize,
    ) {
        let unit1 = axis1.unit(units);
        let unit2 = axis2.unit(units);
        let columns: Vec<usize> = if b2.upper != b2.lower {
            vec![b2.lower, b2.upper]
        } else {
            vec![b2.lower]
        };
        let rows: Vec<usize> = if b1.upper != b1.lower {
            vec![b1.lower, b1.upper]
        } else {
            vec![b1.lower]
        };
        let _ = writeln!(
            result,
            "         {}",
            columns
                .iter()
                .map(|&j| unit2.as_string_digits(axis2.axis_value(j), digits))
                .join("    ")
        );
        result.push_str("    --------------------\n");
        for &i in &rows {
            let _ = writeln!(
                result,
                "{} | {}",
                unit1.as_string_digits(axis1.axis_value(i), digits),
                columns
                    .iter()
                    .map(|&j| table_unit.as_string_digits(self.value(i, j, index3), digits))
                    .join("    ")
            );
        }
    }

    /// Liberty `index_N`/`values` text for the table. Order 3 tables are not
    /// rendered; the problem is sent to `report` and the result is empty.
    pub fn report(&self, table_unit: &Unit, digits: usize, sta: &StaState) -> String {
        let units = sta.units();
        let format_values =
            |values: &[f32]| format!("\"{}\"", values.iter().map(|&v| table_unit.as_string_digits(v, digits)).join(", "));
        let mut result = String::new();
        match &self.values {
            TableValues::Scalar(value) => {
                let _ = writeln!(result, "values(\"{}\");", table_unit.as_string_digits(*value, digits));
            }
            TableValues::Vector(values) => {
                self.report_indices(&mut result, units, digits);
                let _ = writeln!(result, "values({});", format_values(values.as_slice()));
            }
            TableValues::Matrix(_) if self.order() == 3 => {
                sta.report().error(MSG_ORDER3_REPORT, "cannot report order 3 table in liberty format");
                return String::new();
            }
            TableValues::Matrix(rows) => {
                self.report_indices(&mut result, units, digits);
                let _ = writeln!(
                    result,
                    "values({});",
                    rows.iter().map(|row| format_values(row.as_slice())).join(", \\\n       ")
                );
            }
        }
        result
    }

    fn report_indices(&self, result: &mut String, units: &Units, digits: usize) {
        for (n, axis) in self.axes().enumerate() {
            let unit = axis.unit(units);
            let _ = writeln!(
                result,
                "index_{}(\"{}\");",
                n + 1,
                axis.values().iter().map(|&v| unit.as_string_digits(v, digits)).join(", ")
            );
        }
    }
}

fn check_extent(dimension: usize, expected: usize, actual: usize) -> Result<(), TableError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TableError::ExtentMismatch {
            dimension,
            expected,
            actual,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TableTemplateType {
    Delay,
    Power,
    OutputCurrent,
    Ocv,
}

impl TableTemplateType {
    pub fn as_str(self) -> &'static str {
        match self {
            TableTemplateType::Delay => "delay",
            TableTemplateType::Power => "power",
            TableTemplateType::OutputCurrent => "output_current",
            TableTemplateType::Ocv => "ocv",
        }
    }
}

/// A named axis set (`lu_table_template`, `power_lut_template`, ...) shared by tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTemplate {
    name: CompactString,
    ty: TableTemplateType,
    axis1: Option<Arc<TableAxis>>,
    axis2: Option<Arc<TableAxis>>,
    axis3: Option<Arc<TableAxis>>,
}

impl TableTemplate {
    pub fn new(name: &str, ty: TableTemplateType) -> Self {
        Self {
            name: name.into(),
            ty,
            axis1: None,
            axis2: None,
            axis3: None,
        }
    }

    pub fn with_axes(
        mut self,
        axis1: Option<Arc<TableAxis>>,
        axis2: Option<Arc<TableAxis>>,
        axis3: Option<Arc<TableAxis>>,
    ) -> Self {
        self.axis1 = axis1;
        self.axis2 = axis2;
        self.axis3 = axis3;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_type(&self) -> TableTemplateType {
        self.ty
    }

    pub fn axis1(&self) -> Option<&Arc<TableAxis>> {
        self.axis1.as_ref()
    }

    pub fn axis2(&self) -> Option<&Arc<TableAxis>> {
        self.axis2.as_ref()
    }

    pub fn axis3(&self) -> Option<&Arc<TableAxis>> {
        self.axis3.as_ref()
    }

    pub fn axes(&self) -> impl Iterator<Item = &Arc<TableAxis>> {
        self.axis1.iter().chain(self.axis2.iter()).chain(self.axis3.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::recording::RecordingReport;

    fn axis(variable: TableAxisVariable, values: &[f32]) -> Arc<TableAxis> {
        Arc::new(TableAxis::new(variable, values.to_vec()).unwrap())
    }

    fn slew_axis() -> Arc<TableAxis> {
        axis(TableAxisVariable::InputNetTransition, &[0.1, 0.5, 1.0])
    }

    fn cap_axis() -> Arc<TableAxis> {
        axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0, 5.0, 10.0])
    }

    fn plane(s: f32, c: f32) -> f32 {
        0.2 + 0.5 * s + 0.03 * c
    }

    fn plane_table() -> Table {
        let slews = slew_axis();
        let caps = cap_axis();
        let values = slews
            .values()
            .iter()
            .map(|&s| caps.values().iter().map(|&c| plane(s, c)).collect())
            .collect();
        Table::new2(values, slews, caps).unwrap()
    }

    #[test]
    fn extent_mismatch() {
        assert_eq!(
            Table::new1(vec![1.0, 2.0], slew_axis()),
            Err(TableError::ExtentMismatch {
                dimension: 1,
                expected: 3,
                actual: 2
            })
        );
        let bad_row = vec![vec![0.0; 3], vec![0.0; 2], vec![0.0; 3]];
        assert!(matches!(
            Table::new2(bad_row, slew_axis(), cap_axis()),
            Err(TableError::ExtentMismatch { dimension: 2, .. })
        ));
        let time = axis(TableAxisVariable::Time, &[0.0, 1.0]);
        assert!(Table::new3(vec![vec![0.0; 2]; 8], slew_axis(), cap_axis(), time.clone()).is_err());
        assert!(Table::new3(vec![vec![0.0; 2]; 9], slew_axis(), cap_axis(), time).is_ok());
    }

    #[test]
    fn scalar_ignores_coordinates() {
        let table = Table::scalar(4.5);
        assert_eq!(table.order(), 0);
        assert_eq!(table.find_value(1.0, 2.0, 3.0), 4.5);
        assert_eq!(table.value(7, 7, 7), 4.5);
    }

    #[test]
    fn exact_at_grid_points() {
        let mut rng = fastrand::Rng::with_seed(3);
        let slews = slew_axis();
        let caps = cap_axis();
        let values: Vec<Vec<f32>> = (0..3).map(|_| (0..3).map(|_| rng.f32() * 10.0).collect()).collect();
        let table = Table::new2(values, slews.clone(), caps.clone()).unwrap();
        for (i, &s) in slews.values().iter().enumerate() {
            for (j, &c) in caps.values().iter().enumerate() {
                assert_eq!(table.find_value(s, c, 0.0), table.value(i, j, 0));
            }
        }
    }

    #[test]
    fn bilinear_on_plane() {
        let table = plane_table();
        assert!((table.find_value(0.3, 3.0, 0.0) - plane(0.3, 3.0)).abs() < 1e-6);
        assert!((table.find_value(0.75, 7.5, 0.0) - plane(0.75, 7.5)).abs() < 1e-6);
        // Extrapolation of a plane stays on the plane.
        assert!((table.find_value(2.0, 20.0, 0.0) - plane(2.0, 20.0)).abs() < 1e-5);
        assert!((table.find_value(0.0, 0.0, 0.0) - plane(0.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn extrapolation_extends_last_segment() {
        let table = Table::new1(vec![1.0, 2.0, 4.0], slew_axis()).unwrap();
        let slope = (4.0 - 2.0) / (1.0 - 0.5);
        assert!((table.find_value(1.5, 0.0, 0.0) - (4.0 + 0.5 * slope)).abs() < 1e-5);
        let first_slope = (2.0 - 1.0) / (0.5 - 0.1);
        assert!((table.find_value(0.0, 0.0, 0.0) - (1.0 - 0.1 * first_slope)).abs() < 1e-5);
        assert_eq!(table.find_value_clip(1.5, 0.0, 0.0), 4.0);
        assert_eq!(table.find_value_clip(-1.0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn monotonic_interpolation() {
        let table = Table::new1(vec![1.0, 2.0, 4.0], slew_axis()).unwrap();
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..500 {
            let a = 0.1 + rng.f32() * 0.9;
            let b = 0.1 + rng.f32() * 0.9;
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            assert!(table.find_value(lo, 0.0, 0.0) <= table.find_value(hi, 0.0, 0.0));
        }
    }

    #[test]
    fn single_sample_axes_collapse() {
        let one_slew = axis(TableAxisVariable::InputNetTransition, &[0.2]);
        let table = Table::new2(vec![vec![1.0, 2.0, 3.0]], one_slew, cap_axis()).unwrap();
        assert_eq!(table.find_value(5.0, 1.0, 0.0), 1.0);
        assert!((table.find_value(99.0, 3.0, 0.0) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn trilinear_on_affine_function() {
        let f = |a: f32, b: f32, c: f32| 1.0 + a - 2.0 * b + 0.5 * c;
        let a1 = slew_axis();
        let a2 = cap_axis();
        let a3 = axis(TableAxisVariable::RelatedOutTotalOutputNetCapacitance, &[0.0, 2.0]);
        let mut rows = Vec::new();
        for &x in a1.values() {
            for &y in a2.values() {
                rows.push(a3.values().iter().map(|&z| f(x, y, z)).collect());
            }
        }
        let table = Table::new3(rows, a1, a2, a3).unwrap();
        assert_eq!(table.order(), 3);
        assert_eq!(table.value(1, 2, 1), f(0.5, 10.0, 2.0));
        assert!((table.find_value(0.3, 7.0, 1.5) - f(0.3, 7.0, 1.5)).abs() < 1e-5);
    }

    #[test]
    fn liberty_report() {
        let report = Arc::new(RecordingReport::default());
        let sta = StaState::new(Units::unscaled(), report.clone());
        let time_unit = &sta.units().time;
        let table = Table::new2(vec![vec![1.0, 2.0], vec![3.0, 4.0]], slew_axis_2(), cap_axis_2()).unwrap();
        assert_eq!(
            table.report(time_unit, 2, &sta),
            "index_1(\"0.10, 0.50\");\nindex_2(\"1.00, 5.00\");\nvalues(\"1.00, 2.00\", \\\n       \"3.00, 4.00\");\n"
        );
        assert_eq!(Table::scalar(1.0).report(time_unit, 1, &sta), "values(\"1.0\");\n");
        assert!(report.errors.lock().unwrap().is_empty());

        let rows = vec![vec![0.0; 2]; 4];
        let time = axis(TableAxisVariable::Time, &[0.0, 1.0]);
        let table3 = Table::new3(rows, slew_axis_2(), cap_axis_2(), time).unwrap();
        assert_eq!(table3.report(time_unit, 2, &sta), "");
        assert_eq!(report.errors.lock().unwrap()[0].0, MSG_ORDER3_REPORT);
    }

    fn slew_axis_2() -> Arc<TableAxis> {
        axis(TableAxisVariable::InputNetTransition, &[0.1, 0.5])
    }

    fn cap_axis_2() -> Arc<TableAxis> {
        axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0, 5.0])
    }

    #[test]
    fn lookup_trace() {
        let units = Units::unscaled();
        let table = Table::new1(vec![1.0, 2.0, 4.0], slew_axis()).unwrap();
        let text = table.report_value("Delay", &units, &units.time, [0.75, 0.0, 0.0], 2);
        assert_eq!(
            text,
            "Table is indexed by\n  input_net_transition = 0.75\n  0.50    1.00\n    --------------------\n| 2.00    4.00\nDelay = 3.00\n"
        );
        let text = plane_table().report_value("Slew", &units, &units.time, [0.3, 3.0, 0.0], 3);
        assert!(text.contains("  total_output_net_capacitance = 3.000\n"));
        assert!(text.contains("0.100 | "));
        assert!(text.ends_with(&format!("Slew = {:.3}\n", plane(0.3, 3.0))));
        assert_eq!(Table::scalar(2.0).report_value("Delay", &units, &units.time, [0.0; 3], 1), "Delay constant = 2.0\n");
    }
}
