//! Per-year Box 3 parameters
//!
//! Values follow the Wet rechtsherstel box 3 and Wet overbruggingswetgeving
//! box 3 tables published for each tax year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fictitious-yield percentages per asset category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRates {
    /// Category I: bank and savings balances
    pub savings: Decimal,
    /// Category II: investments and other assets
    pub other: Decimal,
    /// Category III: debts above the threshold
    pub debts: Decimal,
}

/// General Tax Credit (algemene heffingskorting) phase-out parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditParams {
    pub max_credit: Decimal,
    /// Income up to which the full credit applies
    pub pivot_income: Decimal,
    pub phase_out_rate: Decimal,
    /// Income from which the credit is zero
    pub cutoff_income: Decimal,
}

/// One bracket of the 2022 legacy mix system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBracket {
    /// Inclusive upper bound on the taxable base; `None` for the top bracket
    pub upper: Option<Decimal>,
    /// Weighted savings/investment yield for wealth in this bracket
    pub blended_yield: Decimal,
}

/// Pre-2023 bracket regime, only available for 2022
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRegime {
    /// Per-person allowance under the legacy rules; for 2022 this coincides
    /// with the savings variant allowance (50,650)
    pub tax_free_allowance: Decimal,
    pub brackets: Vec<LegacyBracket>,
}

impl LegacyRegime {
    /// The 2022 brackets: 67/33, 21/79 and 0/100 savings/investment mixes
    pub fn brackets_2022() -> Self {
        Self {
            tax_free_allowance: dec!(50650),
            brackets: vec![
                LegacyBracket {
                    upper: Some(dec!(50650)),
                    blended_yield: dec!(0.0182),
                },
                LegacyBracket {
                    upper: Some(dec!(962350)),
                    blended_yield: dec!(0.0437),
                },
                LegacyBracket {
                    upper: None,
                    blended_yield: dec!(0.0553),
                },
            ],
        }
    }

    pub fn allowance(&self, partner_count: u8) -> Decimal {
        self.tax_free_allowance * Decimal::from(partner_count)
    }
}

/// Immutable parameter set for one tax year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub year: u16,

    /// Flat Box 3 tax rate
    pub box3_rate: Decimal,

    /// Per-person heffingsvrij vermogen
    pub tax_free_allowance: Decimal,

    /// Per-person debt threshold (schuldendrempel)
    pub debt_threshold: Decimal,

    pub yields: YieldRates,

    pub credit: CreditParams,

    /// First Box 1 bracket rate, used to estimate how much of a partner's
    /// credit their own Box 1 income already consumes
    pub box1_base_rate: Decimal,

    /// From 2025 Box 3 income counts towards the aggregate income that
    /// drives the credit phase-out
    pub box3_income_counts_for_credit: bool,

    /// Legacy bracket regime (2022 only)
    pub legacy: Option<LegacyRegime>,
}

impl TaxYearConfig {
    pub fn allowance(&self, partner_count: u8) -> Decimal {
        self.tax_free_allowance * Decimal::from(partner_count)
    }

    pub fn debt_threshold(&self, partner_count: u8) -> Decimal {
        self.debt_threshold * Decimal::from(partner_count)
    }

    pub fn y2022() -> Self {
        Self {
            year: 2022,
            box3_rate: dec!(0.31),
            tax_free_allowance: dec!(50650),
            debt_threshold: dec!(3200),
            yields: YieldRates {
                savings: dec!(0.0000),
                other: dec!(0.0553),
                debts: dec!(0.0228),
            },
            credit: CreditParams {
                max_credit: dec!(2888),
                pivot_income: dec!(21317),
                phase_out_rate: dec!(0.06007),
                cutoff_income: dec!(69398),
            },
            box1_base_rate: dec!(0.3707),
            box3_income_counts_for_credit: false,
            legacy: Some(LegacyRegime::brackets_2022()),
        }
    }

    pub fn y2023() -> Self {
        Self {
            year: 2023,
            box3_rate: dec!(0.32),
            tax_free_allowance: dec!(57000),
            debt_threshold: dec!(3400),
            yields: YieldRates {
                savings: dec!(0.0036),
                other: dec!(0.0617),
                debts: dec!(0.0246),
            },
            credit: CreditParams {
                max_credit: dec!(3070),
                pivot_income: dec!(22660),
                phase_out_rate: dec!(0.06095),
                cutoff_income: dec!(73031),
            },
            box1_base_rate: dec!(0.3693),
            box3_income_counts_for_credit: false,
            legacy: None,
        }
    }

    pub fn y2024() -> Self {
        Self {
            year: 2024,
            box3_rate: dec!(0.36),
            tax_free_allowance: dec!(57000),
            debt_threshold: dec!(3700),
            yields: YieldRates {
                savings: dec!(0.0103),
                other: dec!(0.0604),
                debts: dec!(0.0247),
            },
            credit: CreditParams {
                max_credit: dec!(3362),
                pivot_income: dec!(24812),
                phase_out_rate: dec!(0.06630),
                cutoff_income: dec!(75518),
            },
            box1_base_rate: dec!(0.3697),
            box3_income_counts_for_credit: false,
            legacy: None,
        }
    }

    pub fn y2025() -> Self {
        Self {
            year: 2025,
            box3_rate: dec!(0.36),
            tax_free_allowance: dec!(57684),
            debt_threshold: dec!(3800),
            yields: YieldRates {
                savings: dec!(0.0144),
                other: dec!(0.0588),
                debts: dec!(0.0262),
            },
            credit: CreditParams {
                max_credit: dec!(3068),
                pivot_income: dec!(28406),
                phase_out_rate: dec!(0.06337),
                cutoff_income: dec!(76817),
            },
            box1_base_rate: dec!(0.3582),
            box3_income_counts_for_credit: true,
            legacy: None,
        }
    }
}
