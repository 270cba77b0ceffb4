use crate::fuzzy::fuzzy_equal;
use crate::table::TableError;
use crate::units::{Unit, Units};
use miniserde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Quantity sampled along a table axis, named as in Liberty `variable_N`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableAxisVariable {
    #[serde(rename = "total_output_net_capacitance")]
    TotalOutputNetCapacitance,
    #[serde(rename = "equal_or_opposite_output_net_capacitance")]
    EqualOrOppositeOutputNetCapacitance,
    #[serde(rename = "input_net_transition")]
    InputNetTransition,
    #[serde(rename = "input_transition_time")]
    InputTransitionTime,
    #[serde(rename = "related_pin_transition")]
    RelatedPinTransition,
    #[serde(rename = "constrained_pin_transition")]
    ConstrainedPinTransition,
    #[serde(rename = "output_pin_transition")]
    OutputPinTransition,
    #[serde(rename = "connect_delay")]
    ConnectDelay,
    #[serde(rename = "related_out_total_output_net_capacitance")]
    RelatedOutTotalOutputNetCapacitance,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "iv_output_voltage")]
    IvOutputVoltage,
    #[serde(rename = "input_noise_width")]
    InputNoiseWidth,
    #[serde(rename = "input_noise_height")]
    InputNoiseHeight,
    #[serde(rename = "input_voltage")]
    InputVoltage,
    #[serde(rename = "output_voltage")]
    OutputVoltage,
    #[serde(rename = "path_depth")]
    PathDepth,
    #[serde(rename = "path_distance")]
    PathDistance,
    #[serde(rename = "normalized_voltage")]
    NormalizedVoltage,
    #[serde(rename = "unknown")]
    Unknown,
}

impl TableAxisVariable {
    pub const ALL: [TableAxisVariable; 19] = [
        TableAxisVariable::TotalOutputNetCapacitance,
        TableAxisVariable::EqualOrOppositeOutputNetCapacitance,
        TableAxisVariable::InputNetTransition,
        TableAxisVariable::InputTransitionTime,
        TableAxisVariable::RelatedPinTransition,
        TableAxisVariable::ConstrainedPinTransition,
        TableAxisVariable::OutputPinTransition,
        TableAxisVariable::ConnectDelay,
        TableAxisVariable::RelatedOutTotalOutputNetCapacitance,
        TableAxisVariable::Time,
        TableAxisVariable::IvOutputVoltage,
        TableAxisVariable::InputNoiseWidth,
        TableAxisVariable::InputNoiseHeight,
        TableAxisVariable::InputVoltage,
        TableAxisVariable::OutputVoltage,
        TableAxisVariable::PathDepth,
        TableAxisVariable::PathDistance,
        TableAxisVariable::NormalizedVoltage,
        TableAxisVariable::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TableAxisVariable::TotalOutputNetCapacitance => "total_output_net_capacitance",
            TableAxisVariable::EqualOrOppositeOutputNetCapacitance => "equal_or_opposite_output_net_capacitance",
            TableAxisVariable::InputNetTransition => "input_net_transition",
            TableAxisVariable::InputTransitionTime => "input_transition_time",
            TableAxisVariable::RelatedPinTransition => "related_pin_transition",
            TableAxisVariable::ConstrainedPinTransition => "constrained_pin_transition",
            TableAxisVariable::OutputPinTransition => "output_pin_transition",
            TableAxisVariable::ConnectDelay => "connect_delay",
            TableAxisVariable::RelatedOutTotalOutputNetCapacitance => "related_out_total_output_net_capacitance",
            TableAxisVariable::Time => "time",
            TableAxisVariable::IvOutputVoltage => "iv_output_voltage",
            TableAxisVariable::InputNoiseWidth => "input_noise_width",
            TableAxisVariable::InputNoiseHeight => "input_noise_height",
            TableAxisVariable::InputVoltage => "input_voltage",
            TableAxisVariable::OutputVoltage => "output_voltage",
            TableAxisVariable::PathDepth => "path_depth",
            TableAxisVariable::PathDistance => "path_distance",
            TableAxisVariable::NormalizedVoltage => "normalized_voltage",
            TableAxisVariable::Unknown => "unknown",
        }
    }

    pub fn from_liberty_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|var| var.as_str() == name)
    }

    pub fn is_transition(self) -> bool {
        matches!(
            self,
            TableAxisVariable::InputNetTransition
                | TableAxisVariable::InputTransitionTime
                | TableAxisVariable::RelatedPinTransition
                | TableAxisVariable::ConstrainedPinTransition
                | TableAxisVariable::OutputPinTransition
        )
    }

    /// Display unit of values along an axis of this variable.
    pub fn unit(self, units: &Units) -> &Unit {
        match self {
            TableAxisVariable::TotalOutputNetCapacitance
            | TableAxisVariable::EqualOrOppositeOutputNetCapacitance
            | TableAxisVariable::RelatedOutTotalOutputNetCapacitance => &units.capacitance,
            TableAxisVariable::InputNetTransition
            | TableAxisVariable::InputTransitionTime
            | TableAxisVariable::RelatedPinTransition
            | TableAxisVariable::ConstrainedPinTransition
            | TableAxisVariable::OutputPinTransition
            | TableAxisVariable::ConnectDelay
            | TableAxisVariable::Time
            | TableAxisVariable::InputNoiseWidth => &units.time,
            TableAxisVariable::IvOutputVoltage
            | TableAxisVariable::InputNoiseHeight
            | TableAxisVariable::InputVoltage
            | TableAxisVariable::OutputVoltage => &units.voltage,
            TableAxisVariable::PathDistance => &units.distance,
            TableAxisVariable::PathDepth | TableAxisVariable::NormalizedVoltage | TableAxisVariable::Unknown => {
                &units.scalar
            }
        }
    }
}

impl Display for TableAxisVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sample points along one table dimension. Values are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAxis {
    variable: TableAxisVariable,
    values: Vec<f32>,
}

impl TableAxis {
    pub fn new(variable: TableAxisVariable, values: Vec<f32>) -> Result<Self, TableError> {
        if values.is_empty() {
            return Err(TableError::EmptyAxis(variable));
        }
        if let Some(index) = values.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(TableError::NonMonotonicAxis {
                variable,
                index: index + 1,
            });
        }
        Ok(Self { variable, values })
    }

    pub fn variable(&self) -> TableAxisVariable {
        self.variable
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn axis_value(&self, index: usize) -> f32 {
        self.values[index]
    }

    pub fn min(&self) -> f32 {
        self.values[0]
    }

    pub fn max(&self) -> f32 {
        self.values[self.values.len() - 1]
    }

    pub fn in_bounds(&self, value: f32) -> bool {
        self.values.len() > 1 && value >= self.min() && value <= self.max()
    }

    /// Lower index `i` of the segment `[values[i], values[i + 1]]` to interpolate
    /// `value` in. Values outside the axis get the first or last segment.
    pub fn find_axis_index(&self, value: f32) -> usize {
        let size = self.values.len();
        if size <= 1 || value <= self.values[0] {
            return 0;
        }
        if value >= self.values[size - 1] {
            return size - 2;
        }
        self.values
            .windows(2)
            .position(|w| value < w[1])
            .unwrap_or(size - 2)
    }

    /// [`Self::find_axis_index`] plus whether `value` lies outside the axis.
    pub fn find_axis_index_extrapolated(&self, value: f32) -> (usize, bool) {
        let extrapolated = value < self.min() || value > self.max();
        (self.find_axis_index(value), extrapolated)
    }

    /// Index of the sample equal to `value`, if any.
    pub fn find_axis_exact(&self, value: f32) -> Option<usize> {
        self.values.iter().position(|&v| fuzzy_equal(v, value))
    }

    pub fn find_axis_closest_index(&self, value: f32) -> usize {
        let index = self.find_axis_index(value);
        match self.values.get(index + 1) {
            Some(&upper) if (upper - value).abs() < (value - self.values[index]).abs() => index + 1,
            _ => index,
        }
    }

    pub fn unit<'a>(&self, units: &'a Units) -> &'a Unit {
        self.variable.unit(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(values: &[f32]) -> TableAxis {
        TableAxis::new(TableAxisVariable::InputNetTransition, values.to_vec()).unwrap()
    }

    #[test]
    fn rejects_bad_axes() {
        assert!(matches!(
            TableAxis::new(TableAxisVariable::Time, vec![]),
            Err(TableError::EmptyAxis(TableAxisVariable::Time))
        ));
        assert!(matches!(
            TableAxis::new(TableAxisVariable::Time, vec![0.0, 1.0, 1.0]),
            Err(TableError::NonMonotonicAxis { index: 2, .. })
        ));
    }

    #[test]
    fn axis_index_brackets() {
        let axis = axis(&[0.1, 0.5, 1.0, 2.0]);
        assert_eq!(axis.find_axis_index(0.0), 0);
        assert_eq!(axis.find_axis_index(0.1), 0);
        assert_eq!(axis.find_axis_index(0.3), 0);
        assert_eq!(axis.find_axis_index(0.5), 1);
        assert_eq!(axis.find_axis_index(1.5), 2);
        assert_eq!(axis.find_axis_index(2.0), 2);
        assert_eq!(axis.find_axis_index(9.0), 2);
        assert_eq!(axis.find_axis_index_extrapolated(9.0), (2, true));
        assert_eq!(axis.find_axis_index_extrapolated(0.7), (1, false));
    }

    #[test]
    fn single_point_axis() {
        let axis = axis(&[0.5]);
        assert_eq!(axis.find_axis_index(0.1), 0);
        assert_eq!(axis.find_axis_index(7.0), 0);
        assert!(!axis.in_bounds(0.5));
        assert_eq!(axis.find_axis_closest_index(3.0), 0);
    }

    #[test]
    fn exact_and_closest() {
        let axis = axis(&[0.1, 0.5, 1.0]);
        assert_eq!(axis.find_axis_exact(0.5), Some(1));
        assert_eq!(axis.find_axis_exact(0.6), None);
        assert_eq!(axis.find_axis_closest_index(0.6), 1);
        assert_eq!(axis.find_axis_closest_index(0.9), 2);
        assert_eq!(axis.find_axis_closest_index(-1.0), 0);
        assert_eq!(axis.find_axis_closest_index(5.0), 2);
        assert!(axis.in_bounds(0.1));
        assert!(!axis.in_bounds(1.1));
    }

    #[test]
    fn liberty_names() {
        for var in TableAxisVariable::ALL {
            assert_eq!(TableAxisVariable::from_liberty_name(var.as_str()), Some(var));
        }
        let var: TableAxisVariable = miniserde::json::from_str("\"related_pin_transition\"").unwrap();
        assert_eq!(var, TableAxisVariable::RelatedPinTransition);
        let units = Units::default();
        assert_eq!(TableAxisVariable::TotalOutputNetCapacitance.unit(&units).suffix(), "pF");
    }
}
