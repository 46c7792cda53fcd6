//! Fiscal partner allocation of the Box 3 base
//!
//! Partners may divide the joint base freely. Allocating base to the partner
//! with unused General Tax Credit (typically a non-earning partner) lowers the
//! combined tax one-for-one until that credit is exhausted; beyond that point
//! further allocation is neutral. Net tax is therefore piecewise linear in the
//! allocation and its minimum sits at the knee where the partner's own Box 3
//! tax equals their credit:
//!
//!   x = C_B / (effective_rate * box3_rate)
//!
//! where `C_B` is partner B's General Tax Credit at zero Box 1 income and B is
//! the second (non-filing or secondary) partner. `x` is clamped to the
//! available base. From 2025 Box 3 income also erodes the credit once
//! aggregate income passes the pivot, so the allocation is capped at the
//! pivot as well.
//!
//! The split is then re-evaluated per partner with each partner's actual
//! residual credit, so Box 1 income of B lowers B's credit in the net figures
//! without moving the split itself.

use rust_decimal::{Decimal, RoundingStrategy};

use super::credit::{general_credit, residual_credit, transfer_fraction};
use super::result::{round_cents, CalculationResult, PartnerShare};
use crate::household::PartnerProfile;
use crate::rates::TaxYearConfig;

/// Who files: one person, or two fiscal partners in input order
#[derive(Debug, Clone, Copy)]
pub enum Filing<'a> {
    Single(&'a PartnerProfile),
    Partners([&'a PartnerProfile; 2]),
}

impl<'a> Filing<'a> {
    /// `None` unless exactly one or two profiles are given
    pub fn from_profiles(profiles: &'a [PartnerProfile]) -> Option<Self> {
        match profiles {
            [single] => Some(Filing::Single(single)),
            [first, second] => Some(Filing::Partners([first, second])),
            _ => None,
        }
    }
}

/// Unrounded per-partner figures before transfers
struct Standalone {
    allocated_base: Decimal,
    box3_income: Decimal,
    tax: Decimal,
    own_credit_used: Decimal,
    surplus_credit: Decimal,
}

impl Standalone {
    fn new(profile: &PartnerProfile, allocated_base: Decimal, gross: &CalculationResult, config: &TaxYearConfig) -> Self {
        let box3_income = allocated_base * gross.effective_rate;
        let tax = box3_income * gross.box3_rate;
        let credit = residual_credit(profile, config, box3_income);
        let own_credit_used = tax.min(credit);
        Self {
            allocated_base,
            box3_income,
            tax,
            own_credit_used,
            surplus_credit: credit - own_credit_used,
        }
    }

    fn remaining_tax(&self) -> Decimal {
        self.tax - self.own_credit_used
    }

    fn into_share(self, partner_index: usize, received: Decimal, transferred: Decimal) -> PartnerShare {
        let tax = round_cents(self.tax);
        let own = round_cents(self.own_credit_used);
        let received = round_cents(received);
        PartnerShare {
            partner_index,
            allocated_base: self.allocated_base,
            box3_income: round_cents(self.box3_income),
            tax_before_credit: tax,
            own_credit_used: own,
            credit_received: received,
            credit_transferred: round_cents(transferred),
            net_tax: (tax - own - received).max(Decimal::ZERO),
        }
    }
}

/// Shares for a given split: `alloc_b` to partner `b_index`, the rest of the
/// base to the other partner
///
/// Each partner's own credit is set against their own tax without
/// restriction; only the surplus moves across, scaled by the donor's
/// transferability fraction.
pub fn evaluate_split(
    gross: &CalculationResult,
    partners: [&PartnerProfile; 2],
    config: &TaxYearConfig,
    b_index: usize,
    alloc_b: Decimal,
) -> Vec<PartnerShare> {
    let a_index = 1 - b_index;
    let mut allocations = [Decimal::ZERO; 2];
    allocations[b_index] = alloc_b;
    allocations[a_index] = gross.taxable_base - alloc_b;

    let standalone = [
        Standalone::new(partners[0], allocations[0], gross, config),
        Standalone::new(partners[1], allocations[1], gross, config),
    ];

    // transfer[i] is what partner i hands to the other partner
    let mut transfer = [Decimal::ZERO; 2];
    for donor in 0..2 {
        let recipient = 1 - donor;
        let fraction = transfer_fraction(config.year, partners[donor].birth_date);
        transfer[donor] = (standalone[donor].surplus_credit * fraction).min(standalone[recipient].remaining_tax());
    }

    let [first, second] = standalone;
    vec![
        first.into_share(0, transfer[1], transfer[0]),
        second.into_share(1, transfer[0], transfer[1]),
    ]
}

fn allocated_result(gross: &CalculationResult, partners: Vec<PartnerShare>, note: String) -> CalculationResult {
    let note = match &gross.note {
        Some(existing) => format!("{existing}; {note}"),
        None => note,
    };
    CalculationResult {
        tax_before_credit: partners.iter().map(|p| p.tax_before_credit).sum(),
        credit_applied: partners.iter().map(|p| p.credit_applied()).sum(),
        net_tax: partners.iter().map(|p| p.net_tax).sum(),
        partners,
        note: Some(note),
        ..gross.clone()
    }
}

/// Single filer: the whole base is theirs and their own credit applies
fn allocate_single(gross: &CalculationResult, profile: &PartnerProfile, config: &TaxYearConfig) -> CalculationResult {
    let share = Standalone::new(profile, gross.taxable_base, gross, config).into_share(0, Decimal::ZERO, Decimal::ZERO);
    let note = format!("Single filer: €{} credit applied", share.own_credit_used);
    allocated_result(gross, vec![share], note)
}

/// Index of partner B, the secondary partner who absorbs base first
const PARTNER_B: usize = 1;

/// Closed-form allocation for two partners
fn allocate_partners(
    gross: &CalculationResult,
    partners: [&PartnerProfile; 2],
    config: &TaxYearConfig,
) -> CalculationResult {
    let base = gross.taxable_base;
    let b_index = PARTNER_B;
    let a_index = 1 - b_index;
    let credit_b = general_credit(Decimal::ZERO, &config.credit);

    let per_unit_tax = gross.effective_rate * gross.box3_rate;
    let mut target = if per_unit_tax.is_zero() {
        Decimal::ZERO
    } else {
        credit_b / per_unit_tax
    };

    let mut capped_at_pivot = false;
    if config.box3_income_counts_for_credit && gross.effective_rate > Decimal::ZERO {
        let headroom = (config.credit.pivot_income - partners[b_index].box1_income).max(Decimal::ZERO);
        let pivot_cap = headroom / gross.effective_rate;
        if pivot_cap < target {
            target = pivot_cap;
            capped_at_pivot = true;
        }
    }

    let alloc_b = target
        .max(Decimal::ZERO)
        .min(base)
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let alloc_a = base - alloc_b;

    log::debug!(
        "Partner allocation {}: credit B {}, per-unit tax {}, B gets {}, A gets {}",
        config.year,
        credit_b,
        per_unit_tax,
        alloc_b,
        alloc_a
    );

    let shares = evaluate_split(gross, partners, config, b_index, alloc_b);
    let used = shares[b_index].own_credit_used;

    let note = if per_unit_tax.is_zero() || base.is_zero() {
        "No Box 3 tax to allocate".to_string()
    } else if capped_at_pivot && alloc_b < base {
        format!(
            "Allocated €{alloc_b} to partner {} (capped at credit pivot €{}); remaining €{alloc_a} to partner {}; used €{used} credit",
            b_index + 1,
            config.credit.pivot_income,
            a_index + 1
        )
    } else if alloc_b >= base {
        format!(
            "Allocated 100% (€{alloc_b}) to partner {}: base insufficient to fully use their credit",
            b_index + 1
        )
    } else {
        format!(
            "Allocated €{alloc_b} to partner {} to absorb €{used} credit; remaining €{alloc_a} to partner {}",
            b_index + 1,
            a_index + 1
        )
    };

    log::info!("Optimization complete: {note}");
    allocated_result(gross, shares, note)
}

/// Split a gross result over the filing unit and apply credits
pub fn allocate(gross: &CalculationResult, filing: Filing<'_>, config: &TaxYearConfig) -> CalculationResult {
    match filing {
        Filing::Single(profile) => allocate_single(gross, profile, config),
        Filing::Partners(partners) => allocate_partners(gross, partners, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::actual_return::calculate_actual_return;
    use crate::calc::statutory::savings_variant;
    use crate::household::{ActualReturnInputs, WealthSnapshot};
    use chrono::NaiveDate;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use rust_decimal_macros::dec;

    fn profile(year: i32, income: Decimal) -> PartnerProfile {
        PartnerProfile::new(NaiveDate::from_ymd_opt(year, 1, 1).unwrap(), income)
    }

    fn gross_2024(savings: Decimal, other: Decimal) -> CalculationResult {
        savings_variant(
            &WealthSnapshot {
                savings,
                other,
                debts: Decimal::ZERO,
            },
            &TaxYearConfig::y2024(),
            2,
        )
    }

    #[test]
    fn test_knee_allocation_2024() {
        let config = TaxYearConfig::y2024();
        let gross = gross_2024(dec!(200000), dec!(300000));
        let earner = profile(1968, dec!(54000));
        let home = profile(1970, Decimal::ZERO);

        let result = allocate(&gross, Filing::Partners([&earner, &home]), &config);

        assert_eq!(result.partners[1].allocated_base, dec!(231389.71));
        assert_eq!(result.partners[0].allocated_base, dec!(154610.29));
        assert_eq!(result.allocated_total(), gross.taxable_base);

        assert_eq!(result.partners[1].tax_before_credit, dec!(3362.00));
        assert_eq!(result.partners[1].own_credit_used, dec!(3362.00));
        assert_eq!(result.partners[1].net_tax, Decimal::ZERO);
        assert_eq!(result.partners[0].net_tax, dec!(2246.43));

        assert_eq!(result.tax_before_credit, dec!(5608.43));
        assert_eq!(result.credit_applied, dec!(3362.00));
        assert_eq!(result.net_tax, dec!(2246.43));
    }

    #[test]
    fn test_small_base_goes_entirely_to_non_earner() {
        let config = TaxYearConfig::y2024();
        let gross = gross_2024(Decimal::ZERO, dec!(167725.17));
        let earner = profile(1968, dec!(54000));
        let home = profile(1970, Decimal::ZERO);

        let result = allocate(&gross, Filing::Partners([&earner, &home]), &config);

        assert_eq!(result.partners[1].allocated_base, dec!(53725.17));
        assert_eq!(result.partners[0].allocated_base, Decimal::ZERO);
        assert_eq!(result.net_tax, Decimal::ZERO);
        assert_eq!(result.credit_applied, dec!(1168.20));
    }

    #[test]
    fn test_knee_ignores_box1_income_of_b() {
        let config = TaxYearConfig::y2024();
        let gross = gross_2024(dec!(200000), dec!(300000));
        let earner = profile(1968, dec!(54000));
        let part_timer = profile(1970, dec!(5000));

        let result = allocate(&gross, Filing::Partners([&earner, &part_timer]), &config);

        // Same split as for a non-earning partner
        assert_eq!(result.partners[1].allocated_base, dec!(231389.71));
        assert_eq!(result.partners[0].allocated_base, dec!(154610.29));

        // Box 1 income already uses 1,848.50 of B's credit
        let b = &result.partners[1];
        assert_eq!(b.tax_before_credit, dec!(3362.00));
        assert_eq!(b.own_credit_used, dec!(1513.50));
        assert_eq!(b.net_tax, dec!(1848.50));
        assert_eq!(result.partners[0].net_tax, dec!(2246.43));
        assert_eq!(result.net_tax, dec!(4094.93));
    }

    #[test]
    fn test_second_profile_is_partner_b() {
        let config = TaxYearConfig::y2024();
        let gross = gross_2024(dec!(200000), dec!(300000));
        let earner = profile(1968, dec!(54000));
        let home = profile(1970, Decimal::ZERO);

        let reversed = allocate(&gross, Filing::Partners([&home, &earner]), &config);
        assert_eq!(reversed.partners[1].allocated_base, dec!(231389.71));
        assert_eq!(reversed.partners[0].allocated_base, dec!(154610.29));
    }

    #[test]
    fn test_zero_rate_allocates_nothing_to_b() {
        let config = TaxYearConfig::y2022();
        let gross = savings_variant(
            &WealthSnapshot {
                savings: dec!(300000),
                ..Default::default()
            },
            &config,
            2,
        );
        assert_eq!(gross.effective_rate, Decimal::ZERO);

        let a = profile(1968, dec!(54000));
        let b = profile(1970, Decimal::ZERO);
        let result = allocate(&gross, Filing::Partners([&a, &b]), &config);
        assert_eq!(result.partners[1].allocated_base, Decimal::ZERO);
        assert_eq!(result.partners[0].allocated_base, gross.taxable_base);
        assert_eq!(result.net_tax, Decimal::ZERO);
    }

    #[test]
    fn test_actual_return_allocation() {
        let config = TaxYearConfig::y2024();
        let inputs = ActualReturnInputs {
            direct_returns: dec!(4000),
            value_start: Some(dec!(300000)),
            value_end: Some(dec!(310000)),
            deposits: dec!(5000),
            ..Default::default()
        };
        let gross = calculate_actual_return(&inputs, &config);
        assert_eq!(gross.tax_before_credit, dec!(3240.00));

        let a = profile(1968, dec!(54000));
        let b = profile(1970, Decimal::ZERO);
        let result = allocate(&gross, Filing::Partners([&a, &b]), &config);
        assert_eq!(result.partners[1].allocated_base, dec!(9000));
        assert_eq!(result.net_tax, Decimal::ZERO);
    }

    #[test]
    fn test_single_filer_own_credit() {
        let config = TaxYearConfig::y2024();
        let gross = savings_variant(
            &WealthSnapshot {
                other: dec!(110725.17),
                ..Default::default()
            },
            &config,
            1,
        );
        assert_eq!(gross.tax_before_credit, dec!(1168.20));

        let retiree = profile(1958, Decimal::ZERO);
        let result = allocate(&gross, Filing::Single(&retiree), &config);
        assert_eq!(result.partners.len(), 1);
        assert_eq!(result.partners[0].allocated_base, gross.taxable_base);
        assert_eq!(result.net_tax, Decimal::ZERO);

        let earner = profile(1980, dec!(90000));
        let result = allocate(&gross, Filing::Single(&earner), &config);
        assert_eq!(result.credit_applied, Decimal::ZERO);
        assert_eq!(result.net_tax, dec!(1168.20));
    }

    #[test]
    fn test_post_1963_surplus_not_transferred_after_2022() {
        for (config, tax) in [
            (TaxYearConfig::y2023(), dec!(0.32)),
            (TaxYearConfig::y2024(), dec!(0.36)),
            (TaxYearConfig::y2025(), dec!(0.36)),
        ] {
            let gross = CalculationResult::gross(
                crate::calc::MethodKind::ActualReturn,
                config.year,
                dec!(5000),
                Decimal::ONE,
                dec!(5000),
                tax,
                crate::calc::MethodDetails::ActualReturn {
                    direct_returns: dec!(5000),
                    indirect_returns: Decimal::ZERO,
                    debt_interest_paid: Decimal::ZERO,
                    actual_return: dec!(5000),
                },
            );
            let earner = profile(1968, dec!(90000));
            let home = profile(1963, Decimal::ZERO);

            // Everything on the earner: the non-earner's credit is pure surplus
            let shares = evaluate_split(&gross, [&earner, &home], &config, 1, Decimal::ZERO);
            assert_eq!(shares[1].credit_transferred, Decimal::ZERO, "{}", config.year);
            assert_eq!(shares[0].credit_received, Decimal::ZERO);
            assert_eq!(shares[0].net_tax, shares[0].tax_before_credit);

            // Own-tax use stays unrestricted
            let shares = evaluate_split(&gross, [&earner, &home], &config, 1, dec!(5000));
            assert_eq!(shares[1].own_credit_used, shares[1].tax_before_credit);
            assert_eq!(shares[1].net_tax, Decimal::ZERO);
        }
    }

    #[test]
    fn test_pre_1963_surplus_transfers_in_full() {
        let config = TaxYearConfig::y2024();
        let gross = gross_2024(dec!(200000), dec!(300000));
        let earner = profile(1960, dec!(90000));
        let home = profile(1961, Decimal::ZERO);

        let shares = evaluate_split(&gross, [&earner, &home], &config, 1, Decimal::ZERO);
        assert_eq!(shares[1].credit_transferred, dec!(3362.00));
        assert_eq!(shares[0].credit_received, dec!(3362.00));
        assert_eq!(shares[0].net_tax, dec!(5608.43) - dec!(3362.00));
    }

    #[test]
    fn test_2022_partial_transfer() {
        let config = TaxYearConfig::y2022();
        let gross = CalculationResult::gross(
            crate::calc::MethodKind::ActualReturn,
            2022,
            dec!(10000),
            Decimal::ONE,
            dec!(10000),
            dec!(0.31),
            crate::calc::MethodDetails::ActualReturn {
                direct_returns: dec!(10000),
                indirect_returns: Decimal::ZERO,
                debt_interest_paid: Decimal::ZERO,
                actual_return: dec!(10000),
            },
        );
        let earner = profile(1968, dec!(90000));
        let home = profile(1975, Decimal::ZERO);

        let shares = evaluate_split(&gross, [&earner, &home], &config, 1, Decimal::ZERO);
        // 2888 * 0.0667
        assert_eq!(shares[1].credit_transferred, dec!(192.63));
        assert_eq!(shares[0].net_tax, dec!(3100.00) - dec!(192.63));
    }

    #[test]
    fn test_2025_credit_follows_box3_income() {
        let config = TaxYearConfig::y2025();
        let gross = CalculationResult::gross(
            crate::calc::MethodKind::ActualReturn,
            2025,
            dec!(40000),
            Decimal::ONE,
            dec!(40000),
            dec!(0.36),
            crate::calc::MethodDetails::ActualReturn {
                direct_returns: dec!(40000),
                indirect_returns: Decimal::ZERO,
                debt_interest_paid: Decimal::ZERO,
                actual_return: dec!(40000),
            },
        );
        let retiree = profile(1970, Decimal::ZERO);
        let result = allocate(&gross, Filing::Single(&retiree), &config);
        assert_eq!(result.partners[0].own_credit_used, dec!(2333.29));
        assert_eq!(result.net_tax, dec!(14400.00) - dec!(2333.29));
    }

    #[test]
    fn test_2025_allocation_stays_below_pivot() {
        let config = TaxYearConfig::y2025();
        let gross = CalculationResult::gross(
            crate::calc::MethodKind::ActualReturn,
            2025,
            dec!(40000),
            Decimal::ONE,
            dec!(40000),
            dec!(0.36),
            crate::calc::MethodDetails::ActualReturn {
                direct_returns: dec!(40000),
                indirect_returns: Decimal::ZERO,
                debt_interest_paid: Decimal::ZERO,
                actual_return: dec!(40000),
            },
        );
        let earner = profile(1968, dec!(90000));
        // 3,000 of Box 1 income leaves 1,993.40 of credit
        let part_timer = profile(1972, dec!(3000));
        let result = allocate(&gross, Filing::Partners([&earner, &part_timer]), &config);

        let b = &result.partners[1];
        assert!(b.box3_income + dec!(3000) <= config.credit.pivot_income);
        assert_eq!(b.own_credit_used, dec!(1993.40));
        assert_eq!(result.allocated_total(), dec!(40000));
    }

    #[test]
    fn test_2025_allocation_capped_at_pivot() {
        let config = TaxYearConfig::y2025();
        let gross = CalculationResult::gross(
            crate::calc::MethodKind::ActualReturn,
            2025,
            dec!(40000),
            Decimal::ONE,
            dec!(40000),
            dec!(0.36),
            crate::calc::MethodDetails::ActualReturn {
                direct_returns: dec!(40000),
                indirect_returns: Decimal::ZERO,
                debt_interest_paid: Decimal::ZERO,
                actual_return: dec!(40000),
            },
        );
        let earner = profile(1968, dec!(90000));
        // 25,000 of Box 1 income leaves 3,406 below the 28,406 pivot
        let part_timer = profile(1972, dec!(25000));
        let result = allocate(&gross, Filing::Partners([&earner, &part_timer]), &config);

        assert_eq!(result.partners[1].allocated_base, dec!(3406.00));
        assert_eq!(result.partners[0].allocated_base, dec!(36594.00));
        assert!(result.note.as_deref().unwrap_or_default().contains("capped at credit pivot"));
    }

    fn year_config(year_idx: usize) -> TaxYearConfig {
        [
            TaxYearConfig::y2022(),
            TaxYearConfig::y2023(),
            TaxYearConfig::y2024(),
            TaxYearConfig::y2025(),
        ][year_idx]
            .clone()
    }

    fn couple_gross(savings_cents: u64, other_cents: u64, config: &TaxYearConfig) -> CalculationResult {
        savings_variant(
            &WealthSnapshot {
                savings: Decimal::new(savings_cents as i64, 2),
                other: Decimal::new(other_cents as i64, 2),
                debts: Decimal::ZERO,
            },
            config,
            2,
        )
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_allocation_sums_to_base(
            savings_cents in 0u64..200_000_000,
            other_cents in 0u64..200_000_000,
            income_a in 0u32..150_000,
            income_b in 0u32..40_000,
            year_idx in 0usize..4,
        ) {
            let config = year_config(year_idx);
            let gross = couple_gross(savings_cents, other_cents, &config);
            let a = profile(1970, Decimal::from(income_a));
            let b = profile(1975, Decimal::from(income_b));

            let result = allocate(&gross, Filing::Partners([&a, &b]), &config);
            prop_assert_eq!(result.allocated_total(), gross.taxable_base);
            prop_assert!(result.partners.iter().all(|p| p.allocated_base >= Decimal::ZERO));
            prop_assert!(result.net_tax >= Decimal::ZERO);
            prop_assert!(result.net_tax <= result.tax_before_credit);
        }

        #[test]
        fn prop_knee_beats_single_partner_allocation(
            savings_cents in 0u64..200_000_000,
            other_cents in 0u64..200_000_000,
            income_a in 0u32..150_000,
            year_idx in 0usize..4,
        ) {
            let config = year_config(year_idx);
            let gross = couple_gross(savings_cents, other_cents, &config);
            let a = profile(1970, Decimal::from(income_a));
            let b = profile(1975, Decimal::ZERO);

            let result = allocate(&gross, Filing::Partners([&a, &b]), &config);

            // Never worse than leaving the whole base with either partner
            for b_index in 0..2 {
                let all_on_one = evaluate_split(&gross, [&a, &b], &config, b_index, Decimal::ZERO);
                let total: Decimal = all_on_one.iter().map(|p| p.net_tax).sum();
                prop_assert!(result.net_tax <= total + Decimal::new(2, 2));
            }
        }
    }
}
