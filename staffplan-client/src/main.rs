use clap::Parser;
use staffplan_client::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), staffplan_client::AppError> {
    run(Cli::parse()).await
}
