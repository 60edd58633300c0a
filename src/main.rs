mod api;
mod cli;
mod config;
mod models;
mod output;
mod stats;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::run().await
}
