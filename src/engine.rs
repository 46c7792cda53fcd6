//! Comparison engine: statutory vs actual-return for one household
//!
//! Holds the rate table once and evaluates any number of households against
//! it, singly or as a parallel batch.

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calc::{
    allocate, calculate_actual_return, calculate_statutory, CalculationResult, Filing, MethodDetails,
    MethodKind, StatutorySelection,
};
use crate::error::{Box3Result, ValidationError};
use crate::household::{validate_household, Household};
use crate::rates::RateTable;

/// Net tax of the statutory and actual-return methods side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub statutory_tax: Decimal,
    /// Absent when no actual-return inputs were supplied
    pub actual_return_tax: Option<Decimal>,
    pub recommended: MethodKind,
    /// Absolute difference; zero without actual-return inputs
    pub savings: Decimal,
}

impl MethodComparison {
    /// Lowest tax wins; ties keep the statutory method
    fn new(statutory_method: MethodKind, statutory_tax: Decimal, actual_return_tax: Option<Decimal>) -> Self {
        match actual_return_tax {
            Some(actual) => Self {
                statutory_tax,
                actual_return_tax,
                recommended: if actual < statutory_tax {
                    MethodKind::ActualReturn
                } else {
                    statutory_method
                },
                savings: (statutory_tax - actual).abs(),
            },
            None => Self {
                statutory_tax,
                actual_return_tax: None,
                recommended: statutory_method,
                savings: Decimal::ZERO,
            },
        }
    }
}

/// Terminal output of a household comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub tax_year: u16,
    pub has_fiscal_partner: bool,

    /// Selected statutory method before credits and allocation
    pub statutory_gross: CalculationResult,
    /// Selected statutory method after partner allocation
    pub statutory: CalculationResult,
    pub statutory_selection: StatutorySelection,

    pub actual_return_gross: Option<CalculationResult>,
    pub actual_return: Option<CalculationResult>,

    /// Gross taxes compared
    pub raw_comparison: MethodComparison,
    /// Allocated net taxes compared
    pub allocated_comparison: MethodComparison,

    pub recommended_method: MethodKind,
    pub tax_savings: Decimal,
    pub rebuttal_evaluated: bool,
    pub reasoning: String,
    pub notes: Vec<String>,
}

/// Evaluates households against a fixed rate table
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    rates: RateTable,
}

impl ComparisonEngine {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Full comparison for one household
    ///
    /// The year is looked up before the household is validated, so an
    /// unsupported year is reported even for otherwise invalid input.
    pub fn compare(&self, household: &Household) -> Box3Result<ComparisonResult> {
        let config = self.rates.lookup(household.tax_year)?;
        validate_household(household)?;
        let filing = Filing::from_profiles(&household.partners)
            .ok_or_else(|| ValidationError::new("partners", "expected one or two partner profiles"))?;

        log::info!(
            "Comparing Box 3 methods for {} (fiscal partner: {})",
            household.tax_year,
            household.has_fiscal_partner
        );

        let wealth = household.wealth();
        let partner_count = household.partner_count();

        let (statutory, actual_gross) = rayon::join(
            || calculate_statutory(&wealth, config, partner_count),
            || {
                household
                    .actual_return
                    .as_ref()
                    .map(|inputs| calculate_actual_return(inputs, config))
            },
        );

        let statutory_alloc = allocate(&statutory.result, filing, config);
        let actual_alloc = actual_gross.as_ref().map(|gross| allocate(gross, filing, config));

        let statutory_method = statutory.selection.selected;
        let raw_comparison = MethodComparison::new(
            statutory_method,
            statutory.result.net_tax,
            actual_gross.as_ref().map(|r| r.net_tax),
        );
        let allocated_comparison = MethodComparison::new(
            statutory_method,
            statutory_alloc.net_tax,
            actual_alloc.as_ref().map(|r| r.net_tax),
        );

        let rebuttal_evaluated = actual_gross.is_some();
        let mut notes: Vec<String> = [Some(&statutory_alloc), actual_alloc.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|r| r.note.as_ref().map(|note| format!("{}: {note}", r.method.label())))
            .collect();
        if !rebuttal_evaluated {
            notes.push("No actual-return inputs: only the statutory method was evaluated".to_string());
        }
        if raw_comparison.recommended != allocated_comparison.recommended {
            notes.push(format!(
                "Recommendation changes after credits: {} before allocation, {} after",
                raw_comparison.recommended.label(),
                allocated_comparison.recommended.label()
            ));
        }

        let reasoning = reasoning(
            &statutory.result,
            actual_gross.as_ref(),
            &raw_comparison,
            &allocated_comparison,
        );

        log::info!(
            "{}: recommended {} (savings €{})",
            household.tax_year,
            allocated_comparison.recommended.label(),
            allocated_comparison.savings
        );

        Ok(ComparisonResult {
            tax_year: household.tax_year,
            has_fiscal_partner: household.has_fiscal_partner,
            statutory_gross: statutory.result,
            statutory: statutory_alloc,
            statutory_selection: statutory.selection,
            actual_return_gross: actual_gross,
            actual_return: actual_alloc,
            recommended_method: allocated_comparison.recommended,
            tax_savings: allocated_comparison.savings,
            raw_comparison,
            allocated_comparison,
            rebuttal_evaluated,
            reasoning,
            notes,
        })
    }

    /// Compare many households in parallel; results keep input order
    pub fn compare_batch(&self, households: &[Household]) -> Vec<Box3Result<ComparisonResult>> {
        households.par_iter().map(|household| self.compare(household)).collect()
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(RateTable::statutory())
    }
}

fn actual_return_amount(result: &CalculationResult) -> Decimal {
    match &result.details {
        MethodDetails::ActualReturn { actual_return, .. } => *actual_return,
        _ => result.taxable_income,
    }
}

/// Plain-language explanation of the recommendation
fn reasoning(
    statutory: &CalculationResult,
    actual: Option<&CalculationResult>,
    raw: &MethodComparison,
    allocated: &MethodComparison,
) -> String {
    let Some(actual) = actual else {
        return format!(
            "No actual-return figures were provided, so only the statutory {} was evaluated. \
             Net Box 3 tax after partner allocation and credits is €{}.",
            statutory.method.label(),
            allocated.statutory_tax
        );
    };

    let actual_tax = allocated.actual_return_tax.unwrap_or(actual.net_tax);
    let mut text = if allocated.recommended == MethodKind::ActualReturn {
        format!(
            "Your actual return of €{} is below the statutory deemed income of €{} ({}). \
             Filing under the actual-return scheme lowers net Box 3 tax from €{} to €{}, saving €{}.",
            actual_return_amount(actual),
            statutory.taxable_income,
            statutory.method.label(),
            allocated.statutory_tax,
            actual_tax,
            allocated.savings
        )
    } else if allocated.savings.is_zero() {
        format!(
            "Both methods result in the same net Box 3 tax of €{}. On a tie the statutory {} \
             is kept, as it needs no actual-return claim.",
            allocated.statutory_tax,
            statutory.method.label()
        )
    } else {
        format!(
            "The statutory {} results in net Box 3 tax of €{}, which is below the €{} \
             due under the actual-return method. Filing an actual-return claim is not worthwhile.",
            statutory.method.label(),
            allocated.statutory_tax,
            actual_tax
        )
    };

    if raw.recommended != allocated.recommended || raw.savings != allocated.savings {
        text.push_str(&format!(
            " Before credits the difference is €{} in favour of the {}.",
            raw.savings,
            raw.recommended.label()
        ));
    }
    text
}
