//! Household input snapshot: assets, actual-return inputs and partner profiles

mod data;
mod validate;
pub mod loader;

pub use data::{
    ActualReturnInputs, AssetCategory, AssetPosition, Household, PartnerProfile, WealthSnapshot,
};
pub use loader::{load_household, load_household_from_reader, load_positions, load_positions_from_reader};
pub use validate::{validate_actual_return, validate_household};
