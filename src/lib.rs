//! Box 3 Engine - Dutch wealth-tax (Box 3) calculation and comparison
//!
//! This library provides:
//! - Versioned Box 3 rate tables for 2022-2025 (built-in or CSV)
//! - Statutory calculation: Savings Variant, plus the legacy bracket method for 2022
//! - Actual-return (rebuttal) calculation
//! - Fiscal partner allocation with General Tax Credit optimisation
//! - Statutory vs actual-return comparison with a recommendation
//!
//! All money is [`rust_decimal::Decimal`]; stored amounts are rounded to cents.

pub mod calc;
pub mod engine;
pub mod error;
pub mod household;
pub mod rates;

// Re-export commonly used types
pub use calc::{CalculationResult, MethodKind, PartnerShare};
pub use engine::{ComparisonEngine, ComparisonResult, MethodComparison};
pub use error::{Box3Error, Box3Result, ConfigError, InputError, ValidationError};
pub use household::{ActualReturnInputs, AssetCategory, AssetPosition, Household, PartnerProfile};
pub use rates::{RateTable, TaxYearConfig};
