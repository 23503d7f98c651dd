use clap::Parser;
use godork::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = godork::resolve_config(&cli)?;

    godork::init_tracing(config.general.debug);
    godork::run(cli, config).await?;
    Ok(())
}
