use clap::Parser;
use logmetrics::runtime::{boot, cli::Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    boot::init_logging();
    run::run(cli).await
}
