//! # Dataset Checks
//!
//! Offline tooling for the reference table the server reads.
//!
//! The server never validates the table up front. It reads whatever is on disk
//! for every request and only notices problems when a user hits a bad row. Run
//! `check` after editing the CSV to catch those rows first:
//! - Duplicate subtypes: only the first row is ever used, later rows are dead
//! - Zero, infinite or NaN conversion rates: estimates for that subtype fail or collapse to 0
use std::{fmt::Write, path::PathBuf};

use anyhow::Result;
use bank::{BANK_PATH, Bank, EmissionFactor, get_bank};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long, global = true, default_value = BANK_PATH)]
    pub dataset: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report shadowed rows and invalid conversion rates
    Check,

    /// Estimate a single quantity
    Estimate {
        subtype: String,

        #[arg(allow_negative_numbers = true)]
        quantity: f64,
    },
}

#[derive(Debug, PartialEq)]
pub struct Summary {
    pub records: usize,
    pub shadowed: Vec<EmissionFactor>,
    pub invalid_rates: Vec<EmissionFactor>,
}

impl Summary {
    pub fn is_clean(&self) -> bool {
        self.shadowed.is_empty() && self.invalid_rates.is_empty()
    }
}

pub fn run(args: Args) -> Result<String> {
    let bank = get_bank(&args.dataset)?;

    match args.command {
        Command::Check => Ok(render_summary(&summarize(&bank))),
        Command::Estimate { subtype, quantity } => Ok(bank.estimate(&subtype, quantity)?.to_string()),
    }
}

pub fn summarize(bank: &Bank) -> Summary {
    Summary {
        records: bank.len(),
        shadowed: bank.duplicates().into_iter().cloned().collect(),
        invalid_rates: bank.invalid_rates().into_iter().cloned().collect(),
    }
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Loaded Records: {}\n", summary.records);

    for factor in &summary.shadowed {
        let _ = writeln!(
            out,
            "Shadowed row! {} (CO2 {}, conv_rate {})",
            factor.subtype, factor.co2_factor, factor.conversion_rate
        );
    }

    for factor in &summary.invalid_rates {
        let _ = writeln!(
            out,
            "Invalid conversion rate! {} ({})",
            factor.subtype, factor.conversion_rate
        );
    }

    if summary.is_clean() {
        let _ = write!(out, "No problems found.");
    } else {
        let _ = writeln!(out, "\nShadowed Rows: {}", summary.shadowed.len());
        let _ = write!(out, "Invalid Conversion Rates: {}", summary.invalid_rates.len());
    }

    out
}
