pub mod check_table_model;
pub mod delay;
pub mod fuzzy;
pub mod gate_table_model;
pub mod library;
pub mod linear_model;
pub mod output_waveforms;
pub mod pvt;
pub mod receiver_model;
pub mod report;
pub mod scale_factors;
pub mod sta_state;
pub mod table;
pub mod table_axis;
pub mod table_model;
pub mod timing_arc;
pub mod timing_model;
pub mod timing_role;
pub mod timing_type;
pub mod types;
pub mod units;

pub use delay::{ArcDelay, Delay, Slew};
pub use sta_state::StaState;
pub use table::{Table, TableError};
pub use table_axis::{TableAxis, TableAxisVariable};
pub use timing_arc::{TimingArc, TimingArcAttrs, TimingArcSet};
pub use timing_model::{CheckTimingModel, GateTimingModel, TimingModel};
pub use timing_role::TimingRole;
pub use types::{EarlyLate, MinMax, RiseFall, TimingSense, Transition};
