//! Household input records as delivered by the ingestion layer

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Box 3 asset category on the reference date (1 January)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Category I: bank balances, cash, deposits
    Savings,
    /// Category II: shares, bonds, crypto, real estate, loans receivable
    Other,
    /// Category III: Box 3 debts (not the primary-residence mortgage)
    Debt,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Savings => "savings",
            AssetCategory::Other => "other",
            AssetCategory::Debt => "debt",
        }
    }
}

/// A single position, already converted to EUR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPosition {
    pub category: AssetCategory,
    pub amount: Decimal,
}

impl AssetPosition {
    pub fn new(category: AssetCategory, amount: Decimal) -> Self {
        Self { category, amount }
    }

    pub fn savings(amount: Decimal) -> Self {
        Self::new(AssetCategory::Savings, amount)
    }

    pub fn other(amount: Decimal) -> Self {
        Self::new(AssetCategory::Other, amount)
    }

    pub fn debt(amount: Decimal) -> Self {
        Self::new(AssetCategory::Debt, amount)
    }
}

/// Household wealth summed by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthSnapshot {
    pub savings: Decimal,
    pub other: Decimal,
    pub debts: Decimal,
}

impl WealthSnapshot {
    pub fn from_positions<'a, I>(positions: I) -> Self
    where
        I: IntoIterator<Item = &'a AssetPosition>,
    {
        positions.into_iter().fold(Self::default(), |mut snap, p| {
            match p.category {
                AssetCategory::Savings => snap.savings += p.amount,
                AssetCategory::Other => snap.other += p.amount,
                AssetCategory::Debt => snap.debts += p.amount,
            }
            snap
        })
    }

    /// Savings plus other assets, before debts
    pub fn total_assets(&self) -> Decimal {
        self.savings + self.other
    }
}

/// Inputs for the actual-return (rebuttal) calculation
///
/// Portfolio values come as a pair: either both start and end are known, or
/// the indirect return is not evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualReturnInputs {
    /// Interest, dividends and rental income received
    #[serde(default)]
    pub direct_returns: Decimal,

    #[serde(default)]
    pub value_start: Option<Decimal>,

    #[serde(default)]
    pub value_end: Option<Decimal>,

    #[serde(default)]
    pub deposits: Decimal,

    #[serde(default)]
    pub withdrawals: Decimal,

    #[serde(default)]
    pub debt_interest_paid: Decimal,
}

impl ActualReturnInputs {
    /// Value change net of own contributions; zero when no values are known
    pub fn indirect_returns(&self) -> Decimal {
        match (self.value_start, self.value_end) {
            (Some(start), Some(end)) => end - start - self.deposits + self.withdrawals,
            _ => Decimal::ZERO,
        }
    }

    /// Combine several accounts into one household aggregate
    ///
    /// Portfolio values are summed over the accounts that report them.
    pub fn combine<'a, I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = &'a ActualReturnInputs>,
    {
        fn add(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
            match (a, b) {
                (Some(x), Some(y)) => Some(x + y),
                (x, None) => x,
                (None, y) => y,
            }
        }

        accounts.into_iter().fold(Self::default(), |acc, a| Self {
            direct_returns: acc.direct_returns + a.direct_returns,
            value_start: add(acc.value_start, a.value_start),
            value_end: add(acc.value_end, a.value_end),
            deposits: acc.deposits + a.deposits,
            withdrawals: acc.withdrawals + a.withdrawals,
            debt_interest_paid: acc.debt_interest_paid + a.debt_interest_paid,
        })
    }
}

/// One (fiscal) partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub birth_date: NaiveDate,

    /// Box 1 taxable income
    #[serde(default)]
    pub box1_income: Decimal,
}

impl PartnerProfile {
    pub fn new(birth_date: NaiveDate, box1_income: Decimal) -> Self {
        Self {
            birth_date,
            box1_income,
        }
    }
}

/// Complete, already-aggregated input snapshot for one tax year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub tax_year: u16,

    #[serde(default)]
    pub has_fiscal_partner: bool,

    #[serde(default)]
    pub assets: Vec<AssetPosition>,

    /// Absent means only the statutory method is evaluated
    #[serde(default)]
    pub actual_return: Option<ActualReturnInputs>,

    pub partners: Vec<PartnerProfile>,
}

impl Household {
    /// Single filer
    pub fn single(tax_year: u16, partner: PartnerProfile, assets: Vec<AssetPosition>) -> Self {
        Self {
            tax_year,
            has_fiscal_partner: false,
            assets,
            actual_return: None,
            partners: vec![partner],
        }
    }

    /// Fiscal partners; the first profile is the primary filer
    pub fn partners(
        tax_year: u16,
        primary: PartnerProfile,
        partner: PartnerProfile,
        assets: Vec<AssetPosition>,
    ) -> Self {
        Self {
            tax_year,
            has_fiscal_partner: true,
            assets,
            actual_return: None,
            partners: vec![primary, partner],
        }
    }

    pub fn with_actual_return(mut self, inputs: ActualReturnInputs) -> Self {
        self.actual_return = Some(inputs);
        self
    }

    pub fn partner_count(&self) -> u8 {
        if self.has_fiscal_partner {
            2
        } else {
            1
        }
    }

    pub fn wealth(&self) -> WealthSnapshot {
        WealthSnapshot::from_positions(&self.assets)
    }
}
