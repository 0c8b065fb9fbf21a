use std::sync::Arc;

use bank::{Bank, get_bank};
use tokio::task::spawn_blocking;

use super::{config::Config, error::AppError};

pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self { config })
    }

    /// Reads the reference table from disk. Called once per calculating request.
    pub async fn load_bank(&self) -> Result<Bank, AppError> {
        let path = self.config.dataset_path.clone();

        let bank = spawn_blocking(move || get_bank(path))
            .await
            .map_err(|e| AppError::InternalError(e.into()))??;

        Ok(bank)
    }
}
