//! Statutory (fictitious-yield) Box 3 calculation
//!
//! - Savings Variant (spaarvariant): all years
//! - Legacy bracket method: 2022 only; for 2022 both run and the lower tax
//!   is selected

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{round_cents, BracketSlice, CalculationResult, MethodDetails, MethodKind};
use crate::household::WealthSnapshot;
use crate::rates::{LegacyBracket, TaxYearConfig};

/// Which statutory method was selected and what each produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutorySelection {
    pub selected: MethodKind,
    pub savings_variant_tax: Decimal,
    /// Present for 2022 only
    pub legacy_tax: Option<Decimal>,
}

/// Selected statutory result with its selection record
#[derive(Debug, Clone)]
pub struct StatutoryOutcome {
    pub result: CalculationResult,
    pub selection: StatutorySelection,
}

/// Debt above the (partner-scaled) threshold
pub fn deductible_debt(debts: Decimal, config: &TaxYearConfig, partner_count: u8) -> Decimal {
    (debts - config.debt_threshold(partner_count)).max(Decimal::ZERO)
}

/// Savings Variant: fictitious yield per category on the actual asset mix
pub fn savings_variant(
    wealth: &WealthSnapshot,
    config: &TaxYearConfig,
    partner_count: u8,
) -> CalculationResult {
    let deductible = deductible_debt(wealth.debts, config, partner_count);
    let rentability_base = wealth.savings + wealth.other - deductible;

    let return_savings = wealth.savings * config.yields.savings;
    let return_other = wealth.other * config.yields.other;
    let return_debts = deductible * config.yields.debts;
    let fictitious_return = (return_savings + return_other - return_debts).max(Decimal::ZERO);

    let effective_rate = if rentability_base > Decimal::ZERO {
        fictitious_return / rentability_base
    } else {
        Decimal::ZERO
    };

    let allowance = config.allowance(partner_count);
    let taxable_base = (rentability_base - allowance).max(Decimal::ZERO);
    let taxable_income = taxable_base * effective_rate;

    log::debug!(
        "Savings variant {}: rentability base {}, fictitious return {}, effective rate {}",
        config.year,
        rentability_base,
        round_cents(fictitious_return),
        effective_rate
    );

    CalculationResult::gross(
        MethodKind::SavingsVariant,
        config.year,
        taxable_base,
        effective_rate,
        taxable_income,
        config.box3_rate,
        MethodDetails::SavingsVariant {
            savings: wealth.savings,
            other: wealth.other,
            debts: wealth.debts,
            deductible_debt: deductible,
            rentability_base,
            return_savings: round_cents(return_savings),
            return_other: round_cents(return_other),
            return_debts: round_cents(return_debts),
            fictitious_return: round_cents(fictitious_return),
            tax_free_allowance: allowance,
        },
    )
}

/// Deemed income from marginal application of the legacy brackets
///
/// Bracket upper bounds are inclusive: a base exactly on a bound stays in the
/// lower bracket.
pub fn legacy_deemed_income(taxable_base: Decimal, brackets: &[LegacyBracket]) -> (Decimal, Vec<BracketSlice>) {
    let mut remaining = taxable_base;
    let mut floor = Decimal::ZERO;
    let mut deemed_income = Decimal::ZERO;
    let mut slices = Vec::new();

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let in_bracket = match bracket.upper {
            Some(upper) => remaining.min((upper - floor).max(Decimal::ZERO)),
            None => remaining,
        };
        let income = in_bracket * bracket.blended_yield;

        deemed_income += income;
        slices.push(BracketSlice {
            amount: in_bracket,
            blended_yield: bracket.blended_yield,
            deemed_income: round_cents(income),
        });

        remaining -= in_bracket;
        if let Some(upper) = bracket.upper {
            floor = upper;
        }
    }

    (deemed_income, slices)
}

/// Legacy bracket method; `None` when the year has no legacy regime
///
/// Brackets apply to total assets less the legacy allowance. Debts do not
/// enter this method.
pub fn legacy(
    wealth: &WealthSnapshot,
    config: &TaxYearConfig,
    partner_count: u8,
) -> Option<CalculationResult> {
    let regime = config.legacy.as_ref()?;

    let total_assets = wealth.total_assets();
    let allowance = regime.allowance(partner_count);
    let taxable_base = (total_assets - allowance).max(Decimal::ZERO);

    let (deemed_income, brackets) = legacy_deemed_income(taxable_base, &regime.brackets);
    let effective_rate = if taxable_base > Decimal::ZERO {
        deemed_income / taxable_base
    } else {
        Decimal::ZERO
    };

    log::debug!(
        "Legacy {}: taxable base {}, deemed income {} over {} bracket(s)",
        config.year,
        taxable_base,
        round_cents(deemed_income),
        brackets.len()
    );

    Some(CalculationResult::gross(
        MethodKind::Legacy,
        config.year,
        taxable_base,
        effective_rate,
        deemed_income,
        config.box3_rate,
        MethodDetails::Legacy {
            total_assets,
            tax_free_allowance: allowance,
            brackets,
        },
    ))
}

/// Statutory result for the year: Savings Variant, or for 2022 the lower of
/// Savings Variant and Legacy (ties keep the Savings Variant)
pub fn calculate_statutory(
    wealth: &WealthSnapshot,
    config: &TaxYearConfig,
    partner_count: u8,
) -> StatutoryOutcome {
    log::info!(
        "Calculating statutory Box 3 tax for {} (partners: {})",
        config.year,
        partner_count
    );

    let sv = savings_variant(wealth, config, partner_count);
    let savings_variant_tax = sv.tax_before_credit;

    match legacy(wealth, config, partner_count) {
        Some(old) => {
            let legacy_tax = old.tax_before_credit;
            let (result, note) = if legacy_tax < savings_variant_tax {
                log::info!("{}: legacy method is more favorable ({} < {})", config.year, legacy_tax, savings_variant_tax);
                (old, "Legacy method selected (lower tax)")
            } else {
                log::info!("{}: savings variant is more favorable ({} <= {})", config.year, savings_variant_tax, legacy_tax);
                (sv, "Savings variant selected (lower tax)")
            };
            StatutoryOutcome {
                selection: StatutorySelection {
                    selected: result.method,
                    savings_variant_tax,
                    legacy_tax: Some(legacy_tax),
                },
                result: result.with_note(note),
            }
        }
        None => StatutoryOutcome {
            selection: StatutorySelection {
                selected: MethodKind::SavingsVariant,
                savings_variant_tax,
                legacy_tax: None,
            },
            result: sv,
        },
    }
}
