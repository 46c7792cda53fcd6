//! General Tax Credit (algemene heffingskorting) and partner transferability

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::household::PartnerProfile;
use crate::rates::{CreditParams, TaxYearConfig};

/// Partners born before this year keep full transferability
pub const TRANSFER_BIRTH_YEAR_CUTOFF: i32 = 1963;

/// Remaining transferable share for later-born partners in 2022
const TRANSFER_FRACTION_2022: Decimal = dec!(0.0667);

/// Income-dependent General Tax Credit
///
/// Piecewise linear: full credit up to the pivot, zero from the cutoff, and
/// `max - rate * (income - pivot)` in between, floored at zero.
pub fn general_credit(income: Decimal, params: &CreditParams) -> Decimal {
    if income <= params.pivot_income {
        params.max_credit
    } else if income >= params.cutoff_income {
        Decimal::ZERO
    } else {
        let credit = params.max_credit - params.phase_out_rate * (income - params.pivot_income);
        credit.max(Decimal::ZERO)
    }
}

/// Share of a partner's surplus credit that may move to the other partner
pub fn transfer_fraction(tax_year: u16, birth_date: NaiveDate) -> Decimal {
    if birth_date.year() < TRANSFER_BIRTH_YEAR_CUTOFF {
        Decimal::ONE
    } else if tax_year <= 2022 {
        TRANSFER_FRACTION_2022
    } else {
        Decimal::ZERO
    }
}

/// Credit still available to absorb Box 3 tax
///
/// The part of the credit already set against the partner's own Box 1 tax
/// (estimated at the first Box 1 bracket rate) is not available. When Box 3
/// income counts towards aggregate income, `box3_income` moves the credit
/// along the phase-out.
pub fn residual_credit(
    profile: &PartnerProfile,
    config: &TaxYearConfig,
    box3_income: Decimal,
) -> Decimal {
    let aggregate_income = if config.box3_income_counts_for_credit {
        profile.box1_income + box3_income
    } else {
        profile.box1_income
    };
    let credit = general_credit(aggregate_income, &config.credit);
    let consumed_by_box1 = (profile.box1_income * config.box1_base_rate).min(credit);
    credit - consumed_by_box1
}
