//! Timing arcs between two cell ports and the sets that group them.

use crate::delay::ArcDelay;
use crate::pvt::{OperatingConditions, Pvt};
use crate::timing_model::{CheckTimingModel, GateTimingModel, TimingModel};
use crate::timing_role::TimingRole;
use crate::timing_type::TimingType;
use crate::types::{PortName, RiseFall, TimingSense, Transition};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

/// Every rise/fall combination between two ports.
const MAX_ARCS: usize = 4;

/// Liberty `timing` group attributes shared by all arcs of a set.
#[derive(Debug, Clone)]
pub struct TimingArcAttrs {
    pub cond: Option<CompactString>,
    pub sdf_cond: Option<CompactString>,
    pub sdf_cond_start: Option<CompactString>,
    pub sdf_cond_end: Option<CompactString>,
    pub mode_name: Option<CompactString>,
    pub mode_value: Option<CompactString>,
    pub timing_type: TimingType,
    pub timing_sense: TimingSense,
    pub ocv_arc_depth: f32,
}

impl Default for TimingArcAttrs {
    fn default() -> Self {
        Self {
            cond: None,
            sdf_cond: None,
            sdf_cond_start: None,
            sdf_cond_end: None,
            mode_name: None,
            mode_value: None,
            timing_type: TimingType::Combinational,
            timing_sense: TimingSense::Unknown,
            ocv_arc_depth: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct TimingArc {
    from: Transition,
    to: Transition,
    role: TimingRole,
    /// Rewritten when a delete moves the arc, even while it is shared.
    index: AtomicUsize,
    model: Option<Arc<dyn TimingModel>>,
    /// Models characterized at other operating conditions, by condition name.
    scaled_models: FxHashMap<CompactString, Arc<dyn TimingModel>>,
    /// Per analysis point overrides.
    corner_arcs: Vec<Option<Arc<TimingArc>>>,
}

impl TimingArc {
    fn new(from: Transition, to: Transition, role: TimingRole, index: usize, model: Option<Arc<dyn TimingModel>>) -> Self {
        Self {
            from,
            to,
            role,
            index: AtomicUsize::new(index),
            model,
            scaled_models: FxHashMap::default(),
            corner_arcs: Vec::new(),
        }
    }

    pub fn from_edge(&self) -> Transition {
        self.from
    }

    pub fn to_edge(&self) -> Transition {
        self.to
    }

    pub fn role(&self) -> TimingRole {
        self.role
    }

    /// Position in the owning set's [`TimingArcSet::arcs`].
    pub fn index(&self) -> usize {
        self.index.load(AtomicOrdering::Relaxed)
    }

    pub fn model(&self) -> Option<&Arc<dyn TimingModel>> {
        self.model.as_ref()
    }

    /// The model characterized at `op_cond` if one was registered, the default model otherwise.
    pub fn model_for(&self, op_cond: Option<&OperatingConditions>) -> Option<&Arc<dyn TimingModel>> {
        op_cond
            .and_then(|op_cond| self.scaled_models.get(&op_cond.name))
            .or(self.model.as_ref())
    }

    pub fn add_scaled_model(&mut self, op_cond: &OperatingConditions, model: Arc<dyn TimingModel>) {
        self.scaled_models.insert(op_cond.name.clone(), model);
    }

    pub fn gate_model(&self) -> Option<&dyn GateTimingModel> {
        self.model.as_deref().and_then(|model| model.as_gate())
    }

    pub fn check_model(&self) -> Option<&dyn CheckTimingModel> {
        self.model.as_deref().and_then(|model| model.as_check())
    }

    pub fn corner_arc(&self, ap_index: usize) -> &TimingArc {
        self.corner_arcs
            .get(ap_index)
            .and_then(|arc| arc.as_deref())
            .unwrap_or(self)
    }

    /// Use `arc` for analysis point `ap_index`, typically an arc of the same
    /// set loaded from another corner's library.
    pub fn set_corner_arc(&mut self, arc: Arc<TimingArc>, ap_index: usize) {
        if self.corner_arcs.len() <= ap_index {
            self.corner_arcs.resize(ap_index + 1, None);
        }
        self.corner_arcs[ap_index] = Some(arc);
    }

    pub fn sense(&self) -> TimingSense {
        match (self.from, self.to) {
            (Transition::Rise, Transition::Rise) | (Transition::Fall, Transition::Fall) => TimingSense::PositiveUnate,
            (Transition::Rise, Transition::Fall) | (Transition::Fall, Transition::Rise) => TimingSense::NegativeUnate,
            _ => TimingSense::NonUnate,
        }
    }

    /// 0 for arcs without a gate model.
    pub fn drive_resistance(&self, pvt: Option<&Pvt>) -> f32 {
        self.gate_model().map_or(0.0, |model| model.drive_resistance(pvt))
    }

    /// Delay with zero input slew into zero load.
    pub fn intrinsic_delay(&self, pvt: Option<&Pvt>) -> ArcDelay {
        self.gate_model()
            .map_or(ArcDelay::ZERO, |model| model.gate_delay(pvt, 0.0, 0.0, false).0)
    }
}

/// All arcs between one pair of ports for one role. Holds at most four arcs,
/// one per rise/fall combination. Arcs are shared, so an arc keeps its address
/// for as long as it lives; only its index changes.
#[derive(Debug)]
pub struct TimingArcSet {
    from: Option<PortName>,
    to: Option<PortName>,
    related_out: Option<PortName>,
    role: TimingRole,
    attrs: TimingArcAttrs,
    is_cond_default: bool,
    is_disabled_constraint: bool,
    arcs: Vec<Arc<TimingArc>>,
    /// First and second arc leaving each from edge, by index into `arcs`.
    from_arc1: [Option<usize>; 2],
    from_arc2: [Option<usize>; 2],
    to_arc: [Option<usize>; 2],
}

impl TimingArcSet {
    pub fn new(
        from: Option<PortName>,
        to: Option<PortName>,
        related_out: Option<PortName>,
        role: TimingRole,
        attrs: TimingArcAttrs,
    ) -> Self {
        Self {
            from,
            to,
            related_out,
            role,
            attrs,
            is_cond_default: false,
            is_disabled_constraint: false,
            arcs: Vec::with_capacity(MAX_ARCS),
            from_arc1: [None; 2],
            from_arc2: [None; 2],
            to_arc: [None; 2],
        }
    }

    /// A fresh wire arc set: rise to rise at index 0, fall to fall at index 1.
    pub fn new_wire() -> Self {
        let attrs = TimingArcAttrs {
            timing_sense: TimingSense::PositiveUnate,
            ..TimingArcAttrs::default()
        };
        let mut set = Self::new(None, None, None, TimingRole::Wire, attrs);
        for rf in RiseFall::ALL {
            set.add_timing_arc(rf.as_transition(), rf.as_transition(), None);
        }
        set
    }

    /// The shared wire arc set.
    pub fn wire() -> &'static TimingArcSet {
        static WIRE: OnceLock<TimingArcSet> = OnceLock::new();
        WIRE.get_or_init(Self::new_wire)
    }

    pub fn wire_arc_index(rf: RiseFall) -> usize {
        rf.index()
    }

    /// Appends an arc and returns its index.
    ///
    /// # Panics
    /// If the set already holds four arcs.
    pub fn add_timing_arc(&mut self, from: Transition, to: Transition, model: Option<Arc<dyn TimingModel>>) -> usize {
        assert!(
            self.arcs.len() < MAX_ARCS,
            "timing arc set {} already has {} arcs",
            self.names(),
            MAX_ARCS
        );
        let index = self.arcs.len();
        self.arcs.push(Arc::new(TimingArc::new(from, to, self.role, index, model)));
        self.index_arc(index);
        index
    }

    /// Removes the arc at `index`. The last arc takes its slot, so indices stay contiguous.
    ///
    /// # Panics
    /// If `index` is not an arc of this set.
    pub fn delete_timing_arc(&mut self, index: usize) -> Arc<TimingArc> {
        assert!(
            index < self.arcs.len(),
            "arc index {} outside timing arc set {}",
            index,
            self.names()
        );
        let removed = self.arcs.swap_remove(index);
        if let Some(moved) = self.arcs.get(index) {
            moved.index.store(index, AtomicOrdering::Relaxed);
        }
        self.from_arc1 = [None; 2];
        self.from_arc2 = [None; 2];
        self.to_arc = [None; 2];
        for i in 0..self.arcs.len() {
            self.index_arc(i);
        }
        removed
    }

    fn index_arc(&mut self, index: usize) {
        let arc = &self.arcs[index];
        if let Some(rf) = arc.from.as_rise_fall() {
            let i = rf.index();
            if self.from_arc1[i].is_none() {
                self.from_arc1[i] = Some(index);
            } else if self.from_arc2[i].is_none() {
                self.from_arc2[i] = Some(index);
            }
        }
        if let Some(rf) = arc.to.as_rise_fall() {
            self.to_arc[rf.index()] = Some(index);
        }
    }

    fn names(&self) -> String {
        format!(
            "{} -> {}",
            self.from.as_deref().unwrap_or(""),
            self.to.as_deref().unwrap_or("")
        )
    }

    pub fn arcs(&self) -> &[Arc<TimingArc>] {
        &self.arcs
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn find_timing_arc(&self, index: usize) -> Option<&Arc<TimingArc>> {
        self.arcs.get(index)
    }

    /// Mutable access for registering scaled models and corner arcs. `None`
    /// once the arc has been handed out to other owners.
    pub fn find_timing_arc_mut(&mut self, index: usize) -> Option<&mut TimingArc> {
        self.arcs.get_mut(index).and_then(Arc::get_mut)
    }

    /// Up to two arcs leaving the `from_rf` edge; non-unate sets have two.
    pub fn arcs_from(&self, from_rf: RiseFall) -> (Option<&TimingArc>, Option<&TimingArc>) {
        let i = from_rf.index();
        (
            self.from_arc1[i].map(|index| &*self.arcs[index]),
            self.from_arc2[i].map(|index| &*self.arcs[index]),
        )
    }

    pub fn arc_to(&self, to_rf: RiseFall) -> Option<&TimingArc> {
        self.to_arc[to_rf.index()].map(|index| &*self.arcs[index])
    }

    pub fn sense(&self) -> TimingSense {
        match self.arcs.as_slice() {
            [arc] => arc.sense(),
            [arc1, arc2] if arc1.sense() == arc2.sense() => arc1.sense(),
            _ => TimingSense::NonUnate,
        }
    }

    /// The from edge when every arc leaves on the same edge, as for edge triggered
    /// clock to output arcs.
    pub fn is_rising_falling_edge(&self) -> Option<RiseFall> {
        match self.arcs.as_slice() {
            [arc] => arc.from.as_rise_fall(),
            [arc1, arc2] if arc1.from.as_rise_fall() == arc2.from.as_rise_fall() => arc1.from.as_rise_fall(),
            _ => None,
        }
    }

    pub fn is_wire(&self) -> bool {
        self.role.is_wire()
    }

    pub fn from(&self) -> Option<&PortName> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&PortName> {
        self.to.as_ref()
    }

    pub fn related_out(&self) -> Option<&PortName> {
        self.related_out.as_ref()
    }

    pub fn role(&self) -> TimingRole {
        self.role
    }

    pub fn attrs(&self) -> &TimingArcAttrs {
        &self.attrs
    }

    pub fn cond(&self) -> Option<&str> {
        self.attrs.cond.as_deref()
    }

    pub fn sdf_cond(&self) -> Option<&str> {
        self.attrs.sdf_cond.as_deref()
    }

    pub fn sdf_cond_start(&self) -> Option<&str> {
        self.attrs.sdf_cond_start.as_deref()
    }

    pub fn sdf_cond_end(&self) -> Option<&str> {
        self.attrs.sdf_cond_end.as_deref()
    }

    pub fn mode_name(&self) -> Option<&str> {
        self.attrs.mode_name.as_deref()
    }

    pub fn mode_value(&self) -> Option<&str> {
        self.attrs.mode_value.as_deref()
    }

    pub fn ocv_arc_depth(&self) -> f32 {
        self.attrs.ocv_arc_depth
    }

    pub fn is_cond_default(&self) -> bool {
        self.is_cond_default
    }

    pub fn set_is_cond_default(&mut self, is_default: bool) {
        self.is_cond_default = is_default;
    }

    /// Checks disabled by `set_disable_timing` style constraints.
    pub fn is_disabled_constraint(&self) -> bool {
        self.is_disabled_constraint
    }

    pub fn set_is_disabled_constraint(&mut self, disabled: bool) {
        self.is_disabled_constraint = disabled;
    }

    #[allow(clippy::type_complexity)]
    fn key(
        &self,
    ) -> (
        Option<&PortName>,
        Option<&PortName>,
        TimingRole,
        Option<&str>,
        [Option<&str>; 3],
        [Option<&str>; 2],
        impl Iterator<Item = (Transition, Transition)> + '_,
    ) {
        (
            self.from.as_ref(),
            self.to.as_ref(),
            self.role,
            self.cond(),
            [self.sdf_cond(), self.sdf_cond_start(), self.sdf_cond_end()],
            [self.mode_name(), self.mode_value()],
            self.arcs.iter().map(|arc| (arc.from, arc.to)),
        )
    }

    /// Total order over ports, role, conditions, mode and the arc edges.
    pub fn compare(&self, other: &TimingArcSet) -> Ordering {
        let (f1, t1, r1, c1, s1, m1, a1) = self.key();
        let (f2, t2, r2, c2, s2, m2, a2) = other.key();
        (f1, t1, r1, c1, s1, m1)
            .cmp(&(f2, t2, r2, c2, s2, m2))
            .then_with(|| a1.cmp(a2))
    }

    /// Same ports, role, conditions, mode and arc edges. Models are not compared.
    pub fn equiv(&self, other: &TimingArcSet) -> bool {
        self.compare(other) == Ordering::Equal
    }

    pub fn less(&self, other: &TimingArcSet) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// `A ↗ -> Z ↘`, or `wire ↗ -> ↗` for wire arcs.
    pub fn arc_string(&self, arc: &TimingArc) -> String {
        if self.is_wire() {
            format!("wire {} -> {}", arc.from, arc.to)
        } else {
            format!(
                "{} {} -> {} {}",
                self.from.as_deref().unwrap_or(""),
                arc.from,
                self.to.as_deref().unwrap_or(""),
                arc.to
            )
        }
    }
}
