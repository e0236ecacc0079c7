//! Rule evaluators and the placement planner.
//!
//! Every evaluator here is a pure function over `dr_core` types: no catalog
//! loading, no I/O, no host trait objects. `dr_pipeline` reads the catalog
//! and hands these functions the plain values they need (operator
//! deductions, mandatory-pod sets, group maps); it owns the wiring, this
//! crate owns the arithmetic.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod capacity;
pub mod common;
pub mod operator;
pub mod placement;
pub mod planner;
pub mod validate;

pub mod prelude {
    pub use crate::capacity::{evaluate as evaluate_capacity, CapacityInputs};
    pub use crate::operator::{evaluate as evaluate_operator, OperatorInputs};
    pub use crate::placement::{evaluate as evaluate_placement, PlacementInputs};
    pub use crate::planner::plan;
    pub use crate::validate::{summarize, validate_final, validate_pre, ServerConfigIssue};
}
