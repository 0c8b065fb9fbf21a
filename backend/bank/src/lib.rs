use std::{fs::File, io::ErrorKind, path::Path};

pub mod activity;
pub mod error;
pub mod factors;

pub use activity::{Activity, Category};
pub use error::BankError;
pub use factors::{Bank, EmissionFactor};

pub const BANK_PATH: &str = "data/co2_emission_dataset.csv";

pub fn get_bank<P: AsRef<Path>>(path: P) -> Result<Bank, BankError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BankError::DatasetMissing(path.to_path_buf()),
        _ => BankError::Io(e),
    })?;

    Bank::from_reader(file)
}
