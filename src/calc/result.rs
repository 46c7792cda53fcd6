//! Calculation output records

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round a money amount to whole cents, halves away from zero
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Closed set of Box 3 methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Fictitious yield per asset category (spaarvariant), all years
    SavingsVariant,
    /// Pre-2023 bracket mix system, 2022 only
    Legacy,
    /// Rebuttal scheme on realised and unrealised returns
    ActualReturn,
}

impl MethodKind {
    pub fn is_statutory(&self) -> bool {
        !matches!(self, MethodKind::ActualReturn)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MethodKind::SavingsVariant => "savings variant",
            MethodKind::Legacy => "legacy bracket method",
            MethodKind::ActualReturn => "actual return",
        }
    }
}

/// Wealth falling into one legacy bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub amount: Decimal,
    pub blended_yield: Decimal,
    pub deemed_income: Decimal,
}

/// Method-specific breakdown for audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MethodDetails {
    SavingsVariant {
        savings: Decimal,
        other: Decimal,
        debts: Decimal,
        deductible_debt: Decimal,
        rentability_base: Decimal,
        return_savings: Decimal,
        return_other: Decimal,
        return_debts: Decimal,
        fictitious_return: Decimal,
        tax_free_allowance: Decimal,
    },
    Legacy {
        total_assets: Decimal,
        tax_free_allowance: Decimal,
        brackets: Vec<BracketSlice>,
    },
    ActualReturn {
        direct_returns: Decimal,
        indirect_returns: Decimal,
        debt_interest_paid: Decimal,
        actual_return: Decimal,
    },
}

/// One partner's part of an allocated result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerShare {
    /// Index into the household's partner list
    pub partner_index: usize,
    pub allocated_base: Decimal,
    pub box3_income: Decimal,
    pub tax_before_credit: Decimal,
    /// Own credit set against own Box 3 tax
    pub own_credit_used: Decimal,
    /// Surplus credit received from the other partner
    pub credit_received: Decimal,
    /// Surplus credit handed to the other partner
    pub credit_transferred: Decimal,
    pub net_tax: Decimal,
}

impl PartnerShare {
    pub fn credit_applied(&self) -> Decimal {
        self.own_credit_used + self.credit_received
    }
}

/// Result of one method, either gross (no credits) or partner-allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub method: MethodKind,
    pub tax_year: u16,

    /// Base after allowance (statutory) or positive actual return
    pub taxable_base: Decimal,

    /// Income per euro of taxable base; 1 for the actual-return method
    pub effective_rate: Decimal,

    pub taxable_income: Decimal,
    pub box3_rate: Decimal,
    pub tax_before_credit: Decimal,
    pub credit_applied: Decimal,
    pub net_tax: Decimal,

    /// Empty for gross results
    pub partners: Vec<PartnerShare>,

    pub details: MethodDetails,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CalculationResult {
    /// Build a gross result; money fields are rounded to cents here
    pub(crate) fn gross(
        method: MethodKind,
        tax_year: u16,
        taxable_base: Decimal,
        effective_rate: Decimal,
        taxable_income: Decimal,
        box3_rate: Decimal,
        details: MethodDetails,
    ) -> Self {
        let tax = round_cents(taxable_income * box3_rate);
        Self {
            method,
            tax_year,
            taxable_base: round_cents(taxable_base),
            effective_rate,
            taxable_income: round_cents(taxable_income),
            box3_rate,
            tax_before_credit: tax,
            credit_applied: Decimal::ZERO,
            net_tax: tax,
            partners: Vec::new(),
            details,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// True once the optimizer has split the result over partners
    pub fn is_allocated(&self) -> bool {
        !self.partners.is_empty()
    }

    /// Sum of allocated bases over partners
    pub fn allocated_total(&self) -> Decimal {
        self.partners.iter().map(|p| p.allocated_base).sum()
    }
}
