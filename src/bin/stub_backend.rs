use discover_haiti::logger::*;
use discover_haiti::settings::*;
use discover_haiti::stub_backend::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Local stand-in for the Discover Haiti API, seeded with demo accounts.
#[derive(Parser, Debug)]
#[command(name = "stub_backend")]
struct StubCli {
    #[arg(long)]
    settings: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = StubCli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.stub.address.parse()?;
    let state = Arc::new(StubState::with_demo_accounts());
    state.set_refresh_delay(Duration::from_millis(project_settings.stub.refresh_delay_ms));

    let backend = StubBackend::start(address, state)?;
    info!(base_url = %backend.base_url(), "demo accounts: touriste@, partenaire@, admin@example.ht");

    signal::ctrl_c().await?;

    let shutdown_timeout = Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, backend.shutdown()).await {
        Ok(_) => info!("stub backend shutdown successfully"),
        Err(_) => error!("stub backend shutdown timed out"),
    }

    Ok(())
}
