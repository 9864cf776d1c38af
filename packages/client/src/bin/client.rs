use clap::Parser;
use kairo_client::{ClientArgs, run_client};
use kairo_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = ClientArgs::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run_client(args).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}
