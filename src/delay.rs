//! Time quantities carried across timing arcs.
//!
//! A [`Delay`] is a mean plus a variance policy. The policy is a type
//! parameter so the deterministic build pays for exactly one `f32`, while
//! statistical (POCV) builds carry either one variance shared by both
//! corners ([`Normal1`]) or independent early/late variances ([`Normal2`]).
//! Which one [`ArcDelay`]/[`Slew`] resolve to is chosen with Cargo features.
//!
//! Variances are combined as sigma², never as sigma. A negative sigma² is
//! legal: it is what remains after removing correlated variance during
//! common path pessimism removal.

use crate::fuzzy::{
    fuzzy_equal, fuzzy_greater, fuzzy_greater_equal, fuzzy_inf, fuzzy_less, fuzzy_less_equal, fuzzy_zero,
};
use crate::sta_state::StaState;
use crate::types::{EarlyLate, MinMax};
use crate::units::Unit;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

pub trait Variance: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// False for the deterministic policy, which ignores all sigma inputs.
    const STATISTICAL: bool;
    const ZERO: Self;

    fn from_sigma2(sigma2_early: f32, sigma2_late: f32) -> Self;

    fn sigma2(&self, early_late: EarlyLate) -> f32;

    fn plus(self, other: Self) -> Self;

    fn minus(self, other: Self) -> Self;

    fn fuzzy_equal(&self, other: &Self) -> bool;

    fn fuzzy_zero(&self) -> bool;

    /// Bracketed sigma annotation appended after the mean, empty when deterministic.
    fn annotation(&self, unit: &Unit, digits: usize) -> String;
}

/// Signed square root: a negative variance yields a negative sigma.
fn signed_sqrt(sigma2: f32) -> f32 {
    if sigma2 < 0.0 {
        -(-sigma2).sqrt()
    } else {
        sigma2.sqrt()
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Deterministic;

impl Variance for Deterministic {
    const STATISTICAL: bool = false;
    const ZERO: Self = Deterministic;

    fn from_sigma2(_: f32, _: f32) -> Self {
        Deterministic
    }

    fn sigma2(&self, _: EarlyLate) -> f32 {
        0.0
    }

    fn plus(self, _: Self) -> Self {
        Deterministic
    }

    fn minus(self, _: Self) -> Self {
        Deterministic
    }

    fn fuzzy_equal(&self, _: &Self) -> bool {
        true
    }

    fn fuzzy_zero(&self) -> bool {
        true
    }

    fn annotation(&self, _: &Unit, _: usize) -> String {
        String::new()
    }
}

/// One variance shared by the early and late corners.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Normal1 {
    sigma2: f32,
}

impl Variance for Normal1 {
    const STATISTICAL: bool = true;
    const ZERO: Self = Normal1 { sigma2: 0.0 };

    /// Keeps the larger of the two variances.
    fn from_sigma2(sigma2_early: f32, sigma2_late: f32) -> Self {
        Normal1 {
            sigma2: sigma2_early.max(sigma2_late),
        }
    }

    fn sigma2(&self, _: EarlyLate) -> f32 {
        self.sigma2
    }

    fn plus(self, other: Self) -> Self {
        Normal1 {
            sigma2: self.sigma2 + other.sigma2,
        }
    }

    fn minus(self, other: Self) -> Self {
        Normal1 {
            sigma2: self.sigma2 - other.sigma2,
        }
    }

    fn fuzzy_equal(&self, other: &Self) -> bool {
        fuzzy_equal(self.sigma2, other.sigma2)
    }

    fn fuzzy_zero(&self) -> bool {
        fuzzy_zero(self.sigma2)
    }

    fn annotation(&self, unit: &Unit, digits: usize) -> String {
        format!("[{}]", unit.as_string_digits(signed_sqrt(self.sigma2), digits))
    }
}

/// Independent early and late variances.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Normal2 {
    sigma2_early: f32,
    sigma2_late: f32,
}

impl Variance for Normal2 {
    const STATISTICAL: bool = true;
    const ZERO: Self = Normal2 {
        sigma2_early: 0.0,
        sigma2_late: 0.0,
    };

    fn from_sigma2(sigma2_early: f32, sigma2_late: f32) -> Self {
        Normal2 {
            sigma2_early,
            sigma2_late,
        }
    }

    fn sigma2(&self, early_late: EarlyLate) -> f32 {
        match early_late {
            MinMax::Min => self.sigma2_early,
            MinMax::Max => self.sigma2_late,
        }
    }

    fn plus(self, other: Self) -> Self {
        Normal2 {
            sigma2_early: self.sigma2_early + other.sigma2_early,
            sigma2_late: self.sigma2_late + other.sigma2_late,
        }
    }

    fn minus(self, other: Self) -> Self {
        Normal2 {
            sigma2_early: self.sigma2_early - other.sigma2_early,
            sigma2_late: self.sigma2_late - other.sigma2_late,
        }
    }

    fn fuzzy_equal(&self, other: &Self) -> bool {
        fuzzy_equal(self.sigma2_early, other.sigma2_early) && fuzzy_equal(self.sigma2_late, other.sigma2_late)
    }

    fn fuzzy_zero(&self) -> bool {
        fuzzy_zero(self.sigma2_early) && fuzzy_zero(self.sigma2_late)
    }

    fn annotation(&self, unit: &Unit, digits: usize) -> String {
        format!(
            "[{}:{}]",
            unit.as_string_digits(signed_sqrt(self.sigma2_early), digits),
            unit.as_string_digits(signed_sqrt(self.sigma2_late), digits)
        )
    }
}

#[cfg(feature = "ssta-normal2")]
pub type DelayVariance = Normal2;
#[cfg(all(feature = "ssta-normal1", not(feature = "ssta-normal2")))]
pub type DelayVariance = Normal1;
#[cfg(not(any(feature = "ssta-normal1", feature = "ssta-normal2")))]
pub type DelayVariance = Deterministic;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Delay<V: Variance = DelayVariance> {
    mean: f32,
    variance: V,
}

pub type ArcDelay = Delay;
pub type Slew = Delay;

impl<V: Variance> Delay<V> {
    pub const ZERO: Self = Self::new(0.0);

    pub const fn new(mean: f32) -> Self {
        Self {
            mean,
            variance: V::ZERO,
        }
    }

    pub fn with_sigma2(mean: f32, sigma2_early: f32, sigma2_late: f32) -> Self {
        Self {
            mean,
            variance: V::from_sigma2(sigma2_early, sigma2_late),
        }
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn variance(&self) -> V {
        self.variance
    }

    pub fn sigma2(&self, early_late: EarlyLate) -> f32 {
        self.variance.sigma2(early_late)
    }

    /// Standard deviation; negative when the variance is negative.
    pub fn sigma(&self, early_late: EarlyLate) -> f32 {
        signed_sqrt(self.variance.sigma2(early_late))
    }

    /// Seed for a min (`+INF`) or max (`-INF`) search.
    pub fn init_value(min_max: MinMax) -> Self {
        Self::new(min_max.init_value())
    }
}

impl<V: Variance> From<f32> for Delay<V> {
    fn from(mean: f32) -> Self {
        Self::new(mean)
    }
}

impl<V: Variance> Add for Delay<V> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            mean: self.mean + rhs.mean,
            variance: self.variance.plus(rhs.variance),
        }
    }
}

impl<V: Variance> Add<f32> for Delay<V> {
    type Output = Self;

    fn add(self, rhs: f32) -> Self {
        Self {
            mean: self.mean + rhs,
            variance: self.variance,
        }
    }
}

impl<V: Variance> Sub for Delay<V> {
    type Output = Self;

    /// Removes `rhs` variance as well as its mean.
    fn sub(self, rhs: Self) -> Self {
        Self {
            mean: self.mean - rhs.mean,
            variance: self.variance.minus(rhs.variance),
        }
    }
}

impl<V: Variance> Sub<f32> for Delay<V> {
    type Output = Self;

    fn sub(self, rhs: f32) -> Self {
        Self {
            mean: self.mean - rhs,
            variance: self.variance,
        }
    }
}

impl<V: Variance> Neg for Delay<V> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            mean: -self.mean,
            variance: self.variance,
        }
    }
}

impl<V: Variance> AddAssign for Delay<V> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<V: Variance> AddAssign<f32> for Delay<V> {
    fn add_assign(&mut self, rhs: f32) {
        self.mean += rhs;
    }
}

impl<V: Variance> SubAssign for Delay<V> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<V: Variance> SubAssign<f32> for Delay<V> {
    fn sub_assign(&mut self, rhs: f32) {
        self.mean -= rhs;
    }
}

/// Orders by mean. Delays with equal means but different variances are unordered.
impl<V: Variance> PartialOrd for Delay<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match self.mean.partial_cmp(&other.mean) {
            Some(Ordering::Equal) => None,
            ord => ord,
        }
    }
}

/// Build a delay from a mean and early/late standard deviations.
///
/// What survives depends on `V`: `Normal2` keeps both, `Normal1` keeps only
/// the larger of the two and `Deterministic` drops both.
pub fn make_delay<V: Variance>(mean: f32, sigma_early: f32, sigma_late: f32) -> Delay<V> {
    Delay::with_sigma2(mean, sigma_early * sigma_early, sigma_late * sigma_late)
}

/// Build a delay from a mean and early/late variances. Same reduction as
/// [`make_delay`].
pub fn make_delay2<V: Variance>(mean: f32, sigma2_early: f32, sigma2_late: f32) -> Delay<V> {
    Delay::with_sigma2(mean, sigma2_early, sigma2_late)
}

pub fn delay_init_value<V: Variance>(min_max: MinMax) -> Delay<V> {
    Delay::init_value(min_max)
}

pub fn delay_is_init_value<V: Variance>(delay: &Delay<V>, min_max: MinMax) -> bool {
    fuzzy_equal(delay.mean, min_max.init_value()) && delay.variance.fuzzy_zero()
}

pub fn delay_zero<V: Variance>(delay: &Delay<V>) -> bool {
    fuzzy_zero(delay.mean) && delay.variance.fuzzy_zero()
}

pub fn delay_inf<V: Variance>(delay: &Delay<V>) -> bool {
    fuzzy_inf(delay.mean)
}

pub fn delay_equal<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>) -> bool {
    fuzzy_equal(delay1.mean, delay2.mean) && delay1.variance.fuzzy_equal(&delay2.variance)
}

pub fn delay_as_float<V: Variance>(delay: &Delay<V>) -> f32 {
    delay.mean
}

/// Project onto a single corner value: `mean - sigma * k` early, `mean + sigma * k` late.
pub fn delay_as_float_el<V: Variance>(delay: &Delay<V>, early_late: EarlyLate, sta: &StaState) -> f32 {
    if V::STATISTICAL && sta.pocv_enabled() {
        let sigma = delay.sigma(early_late) * sta.sigma_factor();
        match early_late {
            MinMax::Min => delay.mean - sigma,
            MinMax::Max => delay.mean + sigma,
        }
    } else {
        delay.mean
    }
}

pub fn delay_sigma2<V: Variance>(delay: &Delay<V>, early_late: EarlyLate) -> f32 {
    delay.sigma2(early_late)
}

/// `mean`, `mean[sigma]` or `mean[sigma_early:sigma_late]` in the time unit.
pub fn delay_as_string<V: Variance>(delay: &Delay<V>, sta: &StaState, digits: usize) -> String {
    let unit = &sta.units().time;
    let mut result = unit.as_string_digits(delay.mean, digits);
    result.push_str(&delay.variance.annotation(unit, digits));
    result
}

pub fn delay_as_string_el<V: Variance>(
    delay: &Delay<V>,
    early_late: EarlyLate,
    sta: &StaState,
    digits: usize,
) -> String {
    sta.units()
        .time
        .as_string_digits(delay_as_float_el(delay, early_late, sta), digits)
}

pub fn delay_less<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>, sta: &StaState) -> bool {
    fuzzy_less(
        delay_as_float_el(delay1, MinMax::EARLY, sta),
        delay_as_float_el(delay2, MinMax::EARLY, sta),
    )
}

pub fn delay_less_equal<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>, sta: &StaState) -> bool {
    fuzzy_less_equal(
        delay_as_float_el(delay1, MinMax::EARLY, sta),
        delay_as_float_el(delay2, MinMax::EARLY, sta),
    )
}

pub fn delay_greater<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>, sta: &StaState) -> bool {
    fuzzy_greater(
        delay_as_float_el(delay1, MinMax::LATE, sta),
        delay_as_float_el(delay2, MinMax::LATE, sta),
    )
}

pub fn delay_greater_equal<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>, sta: &StaState) -> bool {
    fuzzy_greater_equal(
        delay_as_float_el(delay1, MinMax::LATE, sta),
        delay_as_float_el(delay2, MinMax::LATE, sta),
    )
}

/// "Tighter is smaller" for the given corner: the min corner swaps the sense.
pub fn delay_less_mm<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>, min_max: MinMax, sta: &StaState) -> bool {
    match min_max {
        MinMax::Max => delay_less(delay1, delay2, sta),
        MinMax::Min => delay_greater(delay1, delay2, sta),
    }
}

pub fn delay_less_equal_mm<V: Variance>(
    delay1: &Delay<V>,
    delay2: &Delay<V>,
    min_max: MinMax,
    sta: &StaState,
) -> bool {
    match min_max {
        MinMax::Max => delay_less_equal(delay1, delay2, sta),
        MinMax::Min => delay_greater_equal(delay1, delay2, sta),
    }
}

pub fn delay_greater_mm<V: Variance>(
    delay1: &Delay<V>,
    delay2: &Delay<V>,
    min_max: MinMax,
    sta: &StaState,
) -> bool {
    match min_max {
        MinMax::Max => delay_greater(delay1, delay2, sta),
        MinMax::Min => delay_less(delay1, delay2, sta),
    }
}

pub fn delay_greater_equal_mm<V: Variance>(
    delay1: &Delay<V>,
    delay2: &Delay<V>,
    min_max: MinMax,
    sta: &StaState,
) -> bool {
    match min_max {
        MinMax::Max => delay_greater_equal(delay1, delay2, sta),
        MinMax::Min => delay_less_equal(delay1, delay2, sta),
    }
}

/// Subtract `delay2` including its variance (common path pessimism removal).
pub fn delay_remove<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>) -> Delay<V> {
    *delay1 - *delay2
}

pub fn delay_ratio<V: Variance>(delay1: &Delay<V>, delay2: &Delay<V>) -> f32 {
    delay1.mean / delay2.mean
}
