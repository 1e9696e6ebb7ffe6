//! Gas accounting of the instructions spawning a child context.

pub mod schedule;
pub mod stp;

pub use schedule::*;
pub use stp::{all_but_one_64th, StpCall, StpColumns, StpInputs};
