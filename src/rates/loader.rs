//! CSV-based rate table loader
//!
//! Loads versioned Box 3 reference data from CSV files in data/rates/

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::Decimal;

use super::year::{CreditParams, LegacyBracket, LegacyRegime, TaxYearConfig, YieldRates};
use crate::error::ConfigError;

/// Default path to the rate table directory
pub const DEFAULT_RATES_PATH: &str = "data/rates";

const RATES_FILE: &str = "box3_rates.csv";
const LEGACY_FILE: &str = "legacy_brackets.csv";

/// Column lookup by header name
struct Columns<'a> {
    file: &'static str,
    headers: &'a StringRecord,
}

impl<'a> Columns<'a> {
    fn index(&self, column: &'static str) -> Result<usize, ConfigError> {
        self.headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or(ConfigError::MissingColumn {
                file: self.file,
                column,
            })
    }

    fn raw<'r>(&self, record: &'r StringRecord, column: &'static str) -> Result<&'r str, ConfigError> {
        let idx = self.index(column)?;
        Ok(record.get(idx).unwrap_or("").trim())
    }

    fn parse<T: FromStr>(&self, record: &StringRecord, column: &'static str) -> Result<T, ConfigError> {
        let value = self.raw(record, column)?;
        value.parse().map_err(|_| ConfigError::InvalidValue {
            file: self.file,
            column,
            value: value.to_string(),
        })
    }

    fn decimal(&self, record: &StringRecord, column: &'static str) -> Result<Decimal, ConfigError> {
        self.parse(record, column)
    }

    fn optional_decimal(
        &self,
        record: &StringRecord,
        column: &'static str,
    ) -> Result<Option<Decimal>, ConfigError> {
        if self.raw(record, column)?.is_empty() {
            Ok(None)
        } else {
            self.decimal(record, column).map(Some)
        }
    }
}

/// Load per-year parameters from `box3_rates.csv`
/// Returns configs keyed by year, without legacy brackets attached
pub fn load_year_configs(path: &Path) -> Result<BTreeMap<u16, TaxYearConfig>, ConfigError> {
    let file = File::open(path.join(RATES_FILE))?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();
    let cols = Columns {
        file: RATES_FILE,
        headers: &headers,
    };

    let mut configs = BTreeMap::new();

    for result in reader.records() {
        let record = result?;
        let config = TaxYearConfig {
            year: cols.parse(&record, "year")?,
            box3_rate: cols.decimal(&record, "box3_rate")?,
            tax_free_allowance: cols.decimal(&record, "tax_free_allowance")?,
            debt_threshold: cols.decimal(&record, "debt_threshold")?,
            yields: YieldRates {
                savings: cols.decimal(&record, "yield_savings")?,
                other: cols.decimal(&record, "yield_other")?,
                debts: cols.decimal(&record, "yield_debts")?,
            },
            credit: CreditParams {
                max_credit: cols.decimal(&record, "credit_max")?,
                pivot_income: cols.decimal(&record, "credit_pivot_income")?,
                phase_out_rate: cols.decimal(&record, "credit_phase_out_rate")?,
                cutoff_income: cols.decimal(&record, "credit_cutoff_income")?,
            },
            box1_base_rate: cols.decimal(&record, "box1_base_rate")?,
            box3_income_counts_for_credit: cols.parse(&record, "box3_income_counts_for_credit")?,
            legacy: None,
        };
        configs.insert(config.year, config);
    }

    Ok(configs)
}

/// Load legacy brackets from `legacy_brackets.csv`
/// Rows for one year must be listed from the lowest bracket up
pub fn load_legacy_regimes(path: &Path) -> Result<BTreeMap<u16, LegacyRegime>, ConfigError> {
    let file = File::open(path.join(LEGACY_FILE))?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();
    let cols = Columns {
        file: LEGACY_FILE,
        headers: &headers,
    };

    let mut regimes: BTreeMap<u16, LegacyRegime> = BTreeMap::new();

    for result in reader.records() {
        let record = result?;
        let year: u16 = cols.parse(&record, "year")?;
        let allowance = cols.decimal(&record, "tax_free_allowance")?;
        let bracket = LegacyBracket {
            upper: cols.optional_decimal(&record, "upper")?,
            blended_yield: cols.decimal(&record, "blended_yield")?,
        };

        regimes
            .entry(year)
            .or_insert_with(|| LegacyRegime {
                tax_free_allowance: allowance,
                brackets: Vec::new(),
            })
            .brackets
            .push(bracket);
    }

    Ok(regimes)
}

/// Load the full table from the given directory
pub fn load_from(path: &Path) -> Result<BTreeMap<u16, TaxYearConfig>, ConfigError> {
    let mut configs = load_year_configs(path)?;
    for (year, regime) in load_legacy_regimes(path)? {
        if let Some(config) = configs.get_mut(&year) {
            config.legacy = Some(regime);
        }
    }
    Ok(configs)
}
