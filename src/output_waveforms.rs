//! CCS driver model: output current waveforms over a (slew, load) grid.
//!
//! Current waveforms are integrated into voltage waveforms once the supply
//! voltage is known. Voltages here measure transition progress: they start at
//! 0 and move towards `vdd` for both rising and falling outputs.

use crate::fuzzy::INF;
use crate::table::{Table, TableError, TableTemplate};
use crate::table_axis::{TableAxis, TableAxisVariable};
use crate::types::RiseFall;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::sync::{Arc, OnceLock};

/// Uniform voltage samples per waveform in the voltage to time tables.
const VOLTAGE_STEPS: usize = 100;

#[derive(Debug)]
struct VoltageWaveform {
    time_voltage: Table,
    voltage_time: Table,
    voltage_current: Table,
}

#[derive(Debug)]
struct VoltageWaveforms {
    vdd: f32,
    waveforms: Vec<VoltageWaveform>,
}

#[derive(Debug)]
pub struct OutputWaveforms {
    slew_axis: Arc<TableAxis>,
    cap_axis: Arc<TableAxis>,
    rf: RiseFall,
    /// Current vs time, at `slew_index * cap_count + cap_index`.
    current_waveforms: Vec<Table>,
    /// Time of the input threshold crossing, by input slew.
    reference_times: Option<Table>,
    voltages: OnceLock<VoltageWaveforms>,
}

impl OutputWaveforms {
    pub fn new(
        slew_axis: Arc<TableAxis>,
        cap_axis: Arc<TableAxis>,
        rf: RiseFall,
        current_waveforms: Vec<Table>,
        reference_times: Option<Table>,
    ) -> Result<Self, TableError> {
        let expected = slew_axis.size() * cap_axis.size();
        if current_waveforms.len() != expected {
            return Err(TableError::ExtentMismatch {
                dimension: 1,
                expected,
                actual: current_waveforms.len(),
            });
        }
        for (index, waveform) in current_waveforms.iter().enumerate() {
            let over_time = waveform.order() == 1
                && waveform.axis1().map(|axis| axis.variable()) == Some(TableAxisVariable::Time);
            if !over_time {
                return Err(TableError::WaveformAxis(index));
            }
        }
        Ok(Self {
            slew_axis,
            cap_axis,
            rf,
            current_waveforms,
            reference_times,
            voltages: OnceLock::new(),
        })
    }

    /// Supported `output_current` template shapes.
    pub fn check_axes(template: &TableTemplate) -> bool {
        let variables: Vec<TableAxisVariable> = template.axes().map(|axis| axis.variable()).collect();
        matches!(
            variables.as_slice(),
            [TableAxisVariable::InputNetTransition, TableAxisVariable::Time]
                | [TableAxisVariable::TotalOutputNetCapacitance, TableAxisVariable::Time]
                | [
                    TableAxisVariable::InputNetTransition,
                    TableAxisVariable::TotalOutputNetCapacitance,
                    TableAxisVariable::Time
                ]
        )
    }

    pub fn slew_axis(&self) -> &Arc<TableAxis> {
        &self.slew_axis
    }

    pub fn cap_axis(&self) -> &Arc<TableAxis> {
        &self.cap_axis
    }

    pub fn rf(&self) -> RiseFall {
        self.rf
    }

    /// Supply voltage the voltage waveforms were built with, once built.
    pub fn vdd(&self) -> Option<f32> {
        self.voltages.get().map(|voltages| voltages.vdd)
    }

    /// Integrate every current waveform into voltage waveforms. Only the first
    /// call does any work; later calls, from any thread, keep its `vdd`.
    pub fn ensure_voltage_waveforms(&self, vdd: f32) {
        assert!(vdd > 0.0, "vdd must be positive, got {}", vdd);
        let voltages = self.voltages.get_or_init(|| {
            log::debug!(
                "integrating {} {} current waveforms at vdd {}",
                self.current_waveforms.len(),
                self.rf.as_str(),
                vdd
            );
            let cap_count = self.cap_axis.size();
            let waveforms = self
                .current_waveforms
                .iter()
                .enumerate()
                .map(|(index, currents)| {
                    let cap = self.cap_axis.axis_value(index % cap_count);
                    integrate(currents, cap, self.rf, vdd)
                })
                .collect();
            VoltageWaveforms { vdd, waveforms }
        });
        if voltages.vdd != vdd {
            log::debug!("voltage waveforms already built at vdd {}, ignoring {}", voltages.vdd, vdd);
        }
    }

    fn voltage_waveforms(&self) -> &[VoltageWaveform] {
        &self
            .voltages
            .get()
            .expect("ensure_voltage_waveforms must be called before voltage queries")
            .waveforms
    }

    fn wave_index(&self, slew_index: usize, cap_index: usize) -> usize {
        slew_index * self.cap_axis.size() + cap_index
    }

    /// Bilinear blend over the four waveforms surrounding `(slew, cap)`.
    fn blend(&self, slew: f32, cap: f32, value: impl Fn(usize) -> f32) -> f32 {
        let mut result = 0.0;
        for (slew_index, slew_weight) in axis_weights(&self.slew_axis, slew) {
            if slew_weight == 0.0 {
                continue;
            }
            for (cap_index, cap_weight) in axis_weights(&self.cap_axis, cap) {
                if cap_weight == 0.0 {
                    continue;
                }
                result += slew_weight * cap_weight * value(self.wave_index(slew_index, cap_index));
            }
        }
        result
    }

    fn nearest_index(&self, slew: f32, cap: f32) -> usize {
        self.wave_index(
            self.slew_axis.find_axis_closest_index(slew),
            self.cap_axis.find_axis_closest_index(cap),
        )
    }

    pub fn time_current(&self, slew: f32, cap: f32, time: f32) -> f32 {
        self.blend(slew, cap, |index| {
            self.current_waveforms[index].find_value_clip(time, 0.0, 0.0)
        })
    }

    pub fn time_voltage(&self, slew: f32, cap: f32, time: f32) -> f32 {
        let waveforms = self.voltage_waveforms();
        self.blend(slew, cap, |index| {
            waveforms[index].time_voltage.find_value_clip(time, 0.0, 0.0)
        })
    }

    /// Time at which the output reaches `volt`.
    pub fn voltage_time(&self, slew: f32, cap: f32, volt: f32) -> f32 {
        let waveforms = self.voltage_waveforms();
        self.blend(slew, cap, |index| {
            waveforms[index].voltage_time.find_value(volt, 0.0, 0.0)
        })
    }

    pub fn voltage_current(&self, slew: f32, cap: f32, volt: f32) -> f32 {
        let waveforms = self.voltage_waveforms();
        self.blend(slew, cap, |index| {
            waveforms[index].voltage_current.find_value_clip(volt, 0.0, 0.0)
        })
    }

    /// Input threshold crossing time for `slew`; 0 without reference times.
    pub fn reference_time(&self, slew: f32) -> f32 {
        self.reference_times
            .as_ref()
            .map_or(0.0, |times| times.find_value(slew, 0.0, 0.0))
    }

    pub fn begin_time(&self, slew: f32, cap: f32) -> f32 {
        self.blend(slew, cap, |index| waveform_axis(&self.current_waveforms[index]).min())
    }

    pub fn end_time(&self, slew: f32, cap: f32) -> f32 {
        self.blend(slew, cap, |index| waveform_axis(&self.current_waveforms[index]).max())
    }

    /// The characterized current waveform closest to `(slew, cap)`, unblended.
    pub fn current_waveform_raw(&self, slew: f32, cap: f32) -> &Table {
        &self.current_waveforms[self.nearest_index(slew, cap)]
    }

    pub fn voltage_waveform_raw(&self, slew: f32, cap: f32) -> &Table {
        &self.voltage_waveforms()[self.nearest_index(slew, cap)].time_voltage
    }

    pub fn voltage_time_raw(&self, slew: f32, cap: f32) -> &Table {
        &self.voltage_waveforms()[self.nearest_index(slew, cap)].voltage_time
    }

    pub fn voltage_current_raw(&self, slew: f32, cap: f32) -> &Table {
        &self.voltage_waveforms()[self.nearest_index(slew, cap)].voltage_current
    }

    /// Blended voltage waveform at `(slew, cap)`, sampled uniformly between its begin and end times.
    pub fn voltage_waveform(&self, slew: f32, cap: f32) -> Table {
        let begin = self.begin_time(slew, cap);
        let end = self.end_time(slew, cap);
        let times: Vec<f32> = if end > begin {
            (0..=VOLTAGE_STEPS)
                .map(|step| begin + (end - begin) * step as f32 / VOLTAGE_STEPS as f32)
                .dedup()
                .collect()
        } else {
            vec![begin]
        };
        let volts = times.iter().map(|&time| self.time_voltage(slew, cap, time)).collect();
        let axis = TableAxis::new(TableAxisVariable::Time, times).expect("sample times increase");
        Table::new1(volts, Arc::new(axis)).expect("one voltage per sample time")
    }

    /// Equivalent driver resistance from the last segment of the voltage to
    /// current waveform at the smallest slew and largest load.
    pub fn final_resistance(&self) -> f32 {
        let waveforms = self.voltage_waveforms();
        let vdd = self.vdd().unwrap_or(0.0);
        let index = self.wave_index(0, self.cap_axis.size() - 1);
        let voltage_current = &waveforms[index].voltage_current;
        let voltages = waveform_axis(voltage_current).values();
        if voltages.len() < 2 {
            return INF;
        }
        let last = voltages.len() - 2;
        let current = voltage_current.value(last, 0, 0).abs();
        if current == 0.0 {
            return INF;
        }
        (vdd - voltages[last]) / current
    }
}

fn waveform_axis(table: &Table) -> &TableAxis {
    table.axis1().expect("waveforms are order 1")
}

/// Grid blending weights. Values outside the axis are clamped; single
/// sample axes give all weight to that sample.
fn axis_weights(axis: &TableAxis, value: f32) -> [(usize, f32); 2] {
    if axis.size() == 1 {
        return [(0, 1.0), (0, 0.0)];
    }
    let value = value.clamp(axis.min(), axis.max());
    let lower = axis.find_axis_index(value);
    let x_lower = axis.axis_value(lower);
    let x_upper = axis.axis_value(lower + 1);
    let frac = (value - x_lower) / (x_upper - x_lower);
    [(lower, 1.0 - frac), (lower + 1, frac)]
}

/// `i = C dv/dt`, integrated with the trapezoid rule.
fn integrate(currents: &Table, cap: f32, rf: RiseFall, vdd: f32) -> VoltageWaveform {
    let times = waveform_axis(currents).values();
    let amps: Vec<f32> = (0..times.len()).map(|i| currents.value(i, 0, 0)).collect();
    let sign = match rf {
        RiseFall::Rise => 1.0,
        RiseFall::Fall => -1.0,
    };
    let mut volts = Vec::with_capacity(times.len());
    volts.push(0.0);
    let mut voltage = 0.0;
    for ((t0, i0), (t1, i1)) in times.iter().zip(&amps).tuple_windows() {
        voltage += sign * (i0 + i1) / 2.0 * (t1 - t0) / cap;
        volts.push(voltage);
    }

    let time_voltage = Table::new1(volts.clone(), Arc::clone(currents.axis1().expect("waveforms are order 1")))
        .expect("one voltage per time sample");

    let v_max = volts
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .map_or(0.0, |v| v.0);
    let mut sample_volts = Vec::with_capacity(VOLTAGE_STEPS + 1);
    let mut sample_times = Vec::with_capacity(VOLTAGE_STEPS + 1);
    for step in 0..=VOLTAGE_STEPS {
        let volt = vdd * step as f32 / VOLTAGE_STEPS as f32;
        if step > 0 && volt > v_max {
            break;
        }
        sample_volts.push(volt);
        sample_times.push(crossing_time(times, &volts, volt));
    }
    let voltage_axis = TableAxis::new(TableAxisVariable::OutputVoltage, sample_volts).expect("voltage steps increase");
    let voltage_time = Table::new1(sample_times, Arc::new(voltage_axis)).expect("one time per voltage step");

    // Keep the rising part only; flat stretches (zero current) would repeat a voltage.
    let mut points: Vec<(f32, f32)> = Vec::with_capacity(volts.len());
    for (&volt, &amp) in volts.iter().zip(&amps) {
        if points.last().map_or(true, |&(last, _)| volt > last) {
            points.push((volt, amp));
        }
    }
    let (curve_volts, curve_amps): (Vec<f32>, Vec<f32>) = points.into_iter().unzip();
    let curve_axis = TableAxis::new(TableAxisVariable::OutputVoltage, curve_volts).expect("voltages increase");
    let voltage_current = Table::new1(curve_amps, Arc::new(curve_axis)).expect("one current per voltage");

    VoltageWaveform {
        time_voltage,
        voltage_time,
        voltage_current,
    }
}

/// First time the waveform reaches `volt`, interpolated between samples.
fn crossing_time(times: &[f32], volts: &[f32], volt: f32) -> f32 {
    match volts.iter().position(|&v| v >= volt) {
        Some(0) => times[0],
        Some(i) => {
            let (v0, v1) = (volts[i - 1], volts[i]);
            let (t0, t1) = (times[i - 1], times[i]);
            t0 + (volt - v0) / (v1 - v0) * (t1 - t0)
        }
        None => times[times.len() - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableTemplateType;

    fn axis(variable: TableAxisVariable, values: &[f32]) -> Arc<TableAxis> {
        Arc::new(TableAxis::new(variable, values.to_vec()).unwrap())
    }

    fn waveform(times: &[f32], currents: &[f32]) -> Table {
        Table::new1(currents.to_vec(), axis(TableAxisVariable::Time, times)).unwrap()
    }

    fn constant_current(amps: f32) -> Table {
        let times: Vec<f32> = (0..=10).map(|t| t as f32).collect();
        waveform(&times, &vec![amps; times.len()])
    }

    #[test]
    fn shape_validation() {
        let slews = axis(TableAxisVariable::InputNetTransition, &[0.1, 0.2]);
        let caps = axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0]);
        assert!(matches!(
            OutputWaveforms::new(slews.clone(), caps.clone(), RiseFall::Rise, vec![constant_current(1.0)], None),
            Err(TableError::ExtentMismatch { expected: 2, actual: 1, .. })
        ));
        let not_time = Table::new1(vec![1.0], axis(TableAxisVariable::InputVoltage, &[0.0])).unwrap();
        assert!(matches!(
            OutputWaveforms::new(slews, caps, RiseFall::Rise, vec![constant_current(1.0), not_time], None),
            Err(TableError::WaveformAxis(1))
        ));
    }

    #[test]
    fn template_axes() {
        let template = TableTemplate::new("ccs", TableTemplateType::OutputCurrent).with_axes(
            Some(axis(TableAxisVariable::InputNetTransition, &[0.1])),
            Some(axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0])),
            Some(axis(TableAxisVariable::Time, &[0.0, 1.0])),
        );
        assert!(OutputWaveforms::check_axes(&template));
        let template = TableTemplate::new("bad", TableTemplateType::OutputCurrent).with_axes(
            Some(axis(TableAxisVariable::Time, &[0.0, 1.0])),
            Some(axis(TableAxisVariable::InputNetTransition, &[0.1])),
            None,
        );
        assert!(!OutputWaveforms::check_axes(&template));
    }

    fn single_waveform(rf: RiseFall, amps: f32) -> OutputWaveforms {
        OutputWaveforms::new(
            axis(TableAxisVariable::InputNetTransition, &[0.1]),
            axis(TableAxisVariable::TotalOutputNetCapacitance, &[2.0]),
            rf,
            vec![constant_current(amps)],
            None,
        )
        .unwrap()
    }

    #[test]
    fn integration() {
        let waves = single_waveform(RiseFall::Rise, 1.0);
        assert_eq!(waves.vdd(), None);
        waves.ensure_voltage_waveforms(1.0);
        assert_eq!(waves.vdd(), Some(1.0));
        // v = i t / C
        assert!((waves.time_voltage(0.1, 2.0, 1.0) - 0.5).abs() < 1e-6);
        assert!((waves.voltage_time(0.1, 2.0, 0.5) - 1.0).abs() < 1e-5);
        assert!((waves.voltage_time(0.1, 2.0, 1.0) - 2.0).abs() < 1e-5);
        // Voltage holds its final value past the end of the waveform.
        assert!((waves.time_voltage(0.1, 2.0, 50.0) - 5.0).abs() < 1e-5);
        assert_eq!(waves.voltage_time_raw(0.1, 2.0).axis1().unwrap().size(), VOLTAGE_STEPS + 1);
    }

    #[test]
    fn falling_output_uses_sinking_current() {
        let waves = single_waveform(RiseFall::Fall, -1.0);
        waves.ensure_voltage_waveforms(1.0);
        assert!((waves.time_voltage(0.1, 2.0, 1.0) - 0.5).abs() < 1e-6);
        assert!((waves.voltage_current(0.1, 2.0, 0.5) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn ensure_is_call_once() {
        let waves = single_waveform(RiseFall::Rise, 1.0);
        waves.ensure_voltage_waveforms(1.0);
        waves.ensure_voltage_waveforms(3.0);
        assert_eq!(waves.vdd(), Some(1.0));
    }

    #[test]
    #[should_panic(expected = "ensure_voltage_waveforms")]
    fn voltage_query_before_ensure_panics() {
        single_waveform(RiseFall::Rise, 1.0).voltage_time(0.1, 2.0, 0.5);
    }

    #[test]
    fn unreached_voltage_stops_sampling() {
        // 0.125 * 10 / 2 = 0.625 V at the end, vdd never reached.
        let waves = single_waveform(RiseFall::Rise, 0.125);
        waves.ensure_voltage_waveforms(1.0);
        let samples = waves.voltage_time_raw(0.1, 2.0).axis1().unwrap();
        assert_eq!(samples.size(), 63);
        assert!((samples.max() - 0.62).abs() < 1e-6);
    }

    #[test]
    fn times_and_raw_access() {
        let slews = axis(TableAxisVariable::InputNetTransition, &[0.1, 0.3]);
        let caps = axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0]);
        let early = waveform(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]);
        let late = waveform(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.0]);
        let ref_times = Table::new1(vec![0.5, 1.5], slews.clone()).unwrap();
        let waves = OutputWaveforms::new(slews, caps, RiseFall::Rise, vec![early, late], Some(ref_times)).unwrap();
        assert!((waves.begin_time(0.2, 1.0) - 0.5).abs() < 1e-6);
        assert!((waves.end_time(0.2, 1.0) - 2.5).abs() < 1e-6);
        assert!((waves.reference_time(0.2) - 1.0).abs() < 1e-6);
        assert!((waves.time_current(0.2, 1.0, 1.5) - 0.5).abs() < 1e-6);
        assert_eq!(waves.current_waveform_raw(0.29, 1.0).axis1().unwrap().min(), 1.0);

        waves.ensure_voltage_waveforms(1.0);
        let blended = waves.voltage_waveform(0.2, 1.0);
        assert_eq!(blended.axis1().unwrap().min(), 0.5);
        assert_eq!(blended.axis1().unwrap().max(), 2.5);
        let raw = waves.voltage_waveform_raw(0.1, 1.0);
        assert_eq!(raw.value(2, 0, 0), 1.0);
    }

    #[test]
    fn final_resistance() {
        let slews = axis(TableAxisVariable::InputNetTransition, &[0.1]);
        let caps = axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0, 2.0]);
        let small = waveform(&[0.0, 1.0, 2.0, 3.0], &[1.0, 1.0, 0.5, 0.0]);
        let large = waveform(&[0.0, 1.0, 2.0, 3.0], &[1.0, 0.8, 0.4, 0.2]);
        let waves = OutputWaveforms::new(slews, caps, RiseFall::Rise, vec![small, large], None).unwrap();
        waves.ensure_voltage_waveforms(1.5);
        // Large load: v = [0, 0.45, 0.75, 0.90]; second to last sample at 0.75 V, 0.4 A.
        assert!((waves.final_resistance() - (1.5 - 0.75) / 0.4).abs() < 1e-4);
    }
}
