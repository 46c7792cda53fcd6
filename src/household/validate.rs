//! Entry-boundary validation
//!
//! Runs before any calculation so that no partial result is ever produced.

use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ActualReturnInputs, Household};
use crate::error::ValidationError;

/// Largest accepted amount, individually and summed over all assets
///
/// Keeps every intermediate product well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

fn non_negative(value: Decimal, field: impl FnOnce() -> String) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new(field(), format!("must not be negative, got {value}")));
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::new(field(), format!("exceeds maximum of {MAX_AMOUNT}, got {value}")));
    }
    Ok(())
}

/// Check a household snapshot, reporting the first offending field
pub fn validate_household(household: &Household) -> Result<(), ValidationError> {
    let mut total = Decimal::ZERO;
    for (i, position) in household.assets.iter().enumerate() {
        non_negative(position.amount, || format!("assets[{i}].amount"))?;
        total = total
            .checked_add(position.amount)
            .filter(|sum| *sum <= MAX_AMOUNT)
            .ok_or_else(|| ValidationError::new("assets", format!("total exceeds maximum of {MAX_AMOUNT}")))?;
    }

    let expected = household.partner_count() as usize;
    if household.partners.len() != expected {
        return Err(ValidationError::new(
            "partners",
            format!(
                "expected {expected} profile(s) for has_fiscal_partner = {}, got {}",
                household.has_fiscal_partner,
                household.partners.len()
            ),
        ));
    }

    for (i, partner) in household.partners.iter().enumerate() {
        non_negative(partner.box1_income, || format!("partners[{i}].box1_income"))?;
        if partner.birth_date.year() > i32::from(household.tax_year) {
            return Err(ValidationError::new(
                format!("partners[{i}].birth_date"),
                format!("{} is after tax year {}", partner.birth_date, household.tax_year),
            ));
        }
    }

    if let Some(inputs) = &household.actual_return {
        validate_actual_return(inputs)?;
    }

    Ok(())
}

/// Check actual-return inputs for negative components and unpaired values
pub fn validate_actual_return(inputs: &ActualReturnInputs) -> Result<(), ValidationError> {
    non_negative(inputs.direct_returns, || "actual_return.direct_returns".into())?;
    non_negative(inputs.deposits, || "actual_return.deposits".into())?;
    non_negative(inputs.withdrawals, || "actual_return.withdrawals".into())?;
    non_negative(inputs.debt_interest_paid, || "actual_return.debt_interest_paid".into())?;

    match (inputs.value_start, inputs.value_end) {
        (Some(start), Some(end)) => {
            non_negative(start, || "actual_return.value_start".into())?;
            non_negative(end, || "actual_return.value_end".into())?;
        }
        (None, Some(_)) => {
            return Err(ValidationError::new(
                "actual_return.value_start",
                "value_end given without value_start",
            ));
        }
        (Some(_), None) => {
            return Err(ValidationError::new(
                "actual_return.value_end",
                "value_start given without value_end",
            ));
        }
        (None, None) => {}
    }

    if (inputs.deposits > Decimal::ZERO || inputs.withdrawals > Decimal::ZERO)
        && inputs.value_start.is_none()
    {
        return Err(ValidationError::new(
            "actual_return.value_start",
            "deposits or withdrawals given without portfolio values",
        ));
    }

    Ok(())
}
