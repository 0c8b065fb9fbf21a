//! Backend of a carbon footprint calculator.
//!
//! Users fill in forms about how they travel, heat their homes, throw things
//! away and eat. Each form is posted here and answered with one CO2 estimate
//! per quantity they entered.
//!
//!
//!
//! # Estimates
//!
//! Every calculating route does the same three things:
//! - Check that all of its form fields are present and non-empty
//! - Load the reference table (see [`bank::factors`])
//! - Run each quantity through `(quantity / conv_rate) * CO2` for its subtype
//!
//! The table is read from disk on every calculating request, so editing the
//! CSV takes effect without a restart.
//!
//!
//!
//! # Routes
//!
//! All routes take `application/x-www-form-urlencoded` bodies and answer JSON.
//!
//! ## Calculating
//!
//! | Route             | Fields                                                            |
//! |-------------------|-------------------------------------------------------------------|
//! | `/transportation` | `psmiles`, `pstype`, `pbmiles`, `pbtype`                          |
//! | `/energy`         | `kwatt`, `energytype`                                             |
//! | `/waste`          | `landfill`, `incineration`, `recycling`                           |
//! | `/food`           | `meat`, `dairy`, `small_fish`, `large_fish`, `fandv`, `bread`, `snack` |
//!
//! Success is `{"message": [..]}` with estimates in field order.
//!
//! ## Submissions
//!
//! `/indform`, `/cmpyform` and `/submit` only validate and log. Nothing is stored.
//!
//! ## Errors
//!
//! Always `{"error": ".."}`.
//! - 400: missing field, bad quantity, unknown subtype, zero conversion rate, undecodable body
//! - 404: unknown route
//! - 500: dataset missing or unreadable, or a handler panicked
//!
//!
//!
//! # Setup
//!
//! Run the server.
//! ```sh
//! RUST_LOG=info cargo run -p carbon
//! ```
//!
//! Point at another table.
//! ```sh
//! DATASET_PATH=/srv/co2.csv RUST_PORT=8080 cargo run -p carbon
//! ```
//!
//! Try it.
//! ```sh
//! curl -X POST localhost:5000/energy -d kwatt=120 -d energytype=Coal
//! ```
//!
//! Check a table before deploying it.
//! ```sh
//! cargo run -p process -- check --dataset data/co2_emission_dataset.csv
//! ```
use std::{future::pending, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use error::handle_panic;
use routes::{
    company_handler, energy_handler, food_handler, individual_handler, not_found_handler,
    submit_handler, transportation_handler, waste_handler,
};
use state::AppState;

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new(Config::load()?);
    info!("Reference table at {}", state.config.dataset_path.display());

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/transportation", post(transportation_handler))
        .route("/energy", post(energy_handler))
        .route("/waste", post(waste_handler))
        .route("/food", post(food_handler))
        .route("/indform", post(individual_handler))
        .route("/cmpyform", post(company_handler))
        .route("/submit", post(submit_handler))
        .fallback(not_found_handler);

    with_layers(router).with_state(state)
}

fn with_layers(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
