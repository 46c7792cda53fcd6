//! Actual-return (rebuttal) Box 3 calculation
//!
//! Return = direct returns (interest, dividends, rent)
//!        + indirect returns (value end - value start - deposits + withdrawals)
//!        - debt interest paid
//!
//! Unrealised gains count. No tax-free allowance enters this base, and a
//! negative return yields zero tax without carry-forward.

use rust_decimal::Decimal;

use super::result::{CalculationResult, MethodDetails, MethodKind};
use crate::household::ActualReturnInputs;
use crate::rates::TaxYearConfig;

/// Total actual return; may be negative
pub fn total_actual_return(inputs: &ActualReturnInputs) -> Decimal {
    inputs.direct_returns + inputs.indirect_returns() - inputs.debt_interest_paid
}

/// Gross actual-return result for the year
pub fn calculate_actual_return(inputs: &ActualReturnInputs, config: &TaxYearConfig) -> CalculationResult {
    log::info!("Calculating Box 3 using actual return method for {}", config.year);

    let indirect = inputs.indirect_returns();
    let actual = total_actual_return(inputs);
    let taxable = actual.max(Decimal::ZERO);

    log::debug!(
        "Actual returns: direct {}, indirect {}, debt interest {}, total {}",
        inputs.direct_returns,
        indirect,
        inputs.debt_interest_paid,
        actual
    );

    let result = CalculationResult::gross(
        MethodKind::ActualReturn,
        config.year,
        taxable,
        Decimal::ONE,
        taxable,
        config.box3_rate,
        MethodDetails::ActualReturn {
            direct_returns: inputs.direct_returns,
            indirect_returns: indirect,
            debt_interest_paid: inputs.debt_interest_paid,
            actual_return: actual,
        },
    );

    if actual < Decimal::ZERO {
        result.with_note("Negative actual return: no tax, loss is not carried forward")
    } else {
        result
    }
}
