//! Box 3 reference data: rates, allowances and credit parameters per tax year

mod year;
pub mod loader;

pub use year::{CreditParams, LegacyBracket, LegacyRegime, TaxYearConfig, YieldRates};
pub use loader::DEFAULT_RATES_PATH;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Version tag of the built-in statutory table
pub const RATE_TABLE_VERSION: &str = "2025.1";

/// Read-only lookup of [`TaxYearConfig`] by year
#[derive(Debug, Clone)]
pub struct RateTable {
    years: BTreeMap<u16, TaxYearConfig>,
}

impl RateTable {
    /// Built-in statutory values for 2022-2025
    pub fn statutory() -> Self {
        let years = [
            TaxYearConfig::y2022(),
            TaxYearConfig::y2023(),
            TaxYearConfig::y2024(),
            TaxYearConfig::y2025(),
        ]
        .into_iter()
        .map(|config| (config.year, config))
        .collect();

        Self { years }
    }

    /// Load the table from CSV files in the default location (data/rates/)
    pub fn from_csv() -> Result<Self, ConfigError> {
        Self::from_csv_path(Path::new(DEFAULT_RATES_PATH))
    }

    /// Load the table from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, ConfigError> {
        let years = loader::load_from(path)?;
        log::debug!("Loaded Box 3 rates for {} tax years from {}", years.len(), path.display());
        Ok(Self { years })
    }

    /// Parameters for a tax year
    pub fn lookup(&self, year: u16) -> Result<&TaxYearConfig, ConfigError> {
        self.years.get(&year).ok_or(ConfigError::UnsupportedYear(year))
    }

    /// Supported years in ascending order
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.years.keys().copied()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::statutory()
    }
}
