//! Structural statistics for two-parent transaction DAGs.

pub mod tangle;

pub use tangle::stats::{DepthProfile, Stats};
pub use tangle::{Parents, Record, Tangle, TangleError};
