//! Box 3 method calculators and partner allocation
//!
//! Calculators produce gross results (no credits). The optimizer turns a
//! gross result into an allocated one with per-partner shares.

pub mod actual_return;
pub mod credit;
pub mod optimizer;
mod result;
pub mod statutory;

pub use actual_return::calculate_actual_return;
pub use credit::{general_credit, residual_credit, transfer_fraction};
pub use optimizer::{allocate, evaluate_split, Filing};
pub use result::{round_cents, BracketSlice, CalculationResult, MethodDetails, MethodKind, PartnerShare};
pub use statutory::{calculate_statutory, StatutoryOutcome, StatutorySelection};
