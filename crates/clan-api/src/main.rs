//! `clan-api` binary. Configuration comes from the environment and `.env`.

use clan_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("tracing unavailable: {e}");
    }

    if let Err(e) = serve().await {
        error!(error = %e, "clan-api exited with an error");
        std::process::exit(1);
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = AppConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        port = config.api.port,
        cooldown_backend = ?config.roster.cooldown_backend,
        "Starting clan roster API"
    );

    clan_api::run(config).await?;
    Ok(())
}
