//! # Emission Factors
//!
//! Reference table of CO2 factors, one row per subtype.
//!
//! ## Table Format
//!
//! CSV with a header row. Only three columns are read, the rest are ignored:
//! - `SubType`: exact key the estimator matches on
//! - `CO2`: emissions per reference unit
//! - `conv_rate`: divisor taking the user's quantity into the reference unit
//!
//! ## Estimate
//!
//! `(quantity / conv_rate) * CO2`
//!
//! Rows are kept in file order and the first row for a subtype wins. Duplicates
//! are not rejected at load time, the `process check` tool reports them instead.
use std::{collections::HashSet, io::Read};

use serde::Deserialize;
use tracing::debug;

use crate::{activity::Activity, error::BankError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmissionFactor {
    #[serde(rename = "SubType")]
    pub subtype: String,

    #[serde(rename = "CO2")]
    pub co2_factor: f64,

    #[serde(rename = "conv_rate")]
    pub conversion_rate: f64,
}

impl EmissionFactor {
    pub fn scale(&self, quantity: f64) -> Result<f64, BankError> {
        if self.conversion_rate == 0.0 {
            return Err(BankError::DivisionByZero {
                subtype: self.subtype.clone(),
            });
        }

        let footprint = (quantity / self.conversion_rate) * self.co2_factor;

        // JSON has no encoding for inf/NaN
        if !footprint.is_finite() {
            return Err(BankError::OutOfRange {
                subtype: self.subtype.clone(),
            });
        }

        Ok(footprint)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bank {
    pub factors: Vec<EmissionFactor>,
}

impl Bank {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BankError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let factors = reader
            .deserialize()
            .collect::<Result<Vec<EmissionFactor>, _>>()?;

        Ok(Self { factors })
    }

    pub fn lookup(&self, subtype: &str) -> Option<&EmissionFactor> {
        self.factors.iter().find(|factor| factor.subtype == subtype)
    }

    pub fn estimate(&self, subtype: &str, quantity: f64) -> Result<f64, BankError> {
        self.lookup(subtype)
            .ok_or_else(|| BankError::NotFound(subtype.to_string()))?
            .scale(quantity)
    }

    pub fn estimate_activity(&self, activity: &Activity) -> Result<f64, BankError> {
        let footprint = self.estimate(activity.subtype, activity.quantity)?;

        debug!(
            category = %activity.category,
            unit = activity.category.unit(),
            subtype = activity.subtype,
            quantity = activity.quantity,
            footprint,
            "Estimated activity"
        );

        Ok(footprint)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Rows shadowed by an earlier row with the same subtype.
    pub fn duplicates(&self) -> Vec<&EmissionFactor> {
        let mut seen = HashSet::new();

        self.factors
            .iter()
            .filter(|factor| !seen.insert(factor.subtype.as_str()))
            .collect()
    }

    /// Rows whose conversion rate is zero, infinite or NaN.
    pub fn invalid_rates(&self) -> Vec<&EmissionFactor> {
        self.factors
            .iter()
            .filter(|factor| {
                factor.conversion_rate == 0.0 || !factor.conversion_rate.is_finite()
            })
            .collect()
    }
}
