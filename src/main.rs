use anyhow::Result;
use clap::Parser;
use excel_mcp_server::{CliArgs, ServerConfig, init_logging, run_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = ServerConfig::from_args(cli)?;
    init_logging(&config)?;
    run_server(config).await
}
