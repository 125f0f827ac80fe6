//! # Print Farm Dashboard Entry Point
//!
//! Boots the dashboard and prints the room and detail overview.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Read configuration (`FARM_DB_PATH`, `FARM_SEED`)
//! 3. Open the store & run migrations
//! 4. Seed if empty, subscribe to both collections
//! 5. Print the dashboard

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    farm_dashboard::init_tracing();

    match farm_dashboard::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
