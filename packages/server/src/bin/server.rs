//! Kairo chat server.
//!
//! Routes LOGIN / LOGOUT / MESSAGE commands and fans messages out to every
//! connected client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kairo-server -- --port 8080
//! ```

use clap::Parser;
use kairo_server::{ServerArgs, run_server};
use kairo_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    if let Err(e) = run_server(args.into_config()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
