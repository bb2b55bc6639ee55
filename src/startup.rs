use crate::shutdown;
use chrono::{Datelike, Local};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use weekly_roster::config::Config;
use weekly_roster::error::Error;
use weekly_roster::roster::period::{current_period, RosterPeriod};
use weekly_roster::roster::RosterState;
use weekly_roster::web::{router, AppState};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the initial roster and serve it until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let period = current_period().unwrap_or_else(|| {
        warn!("Could not resolve the current week, starting at week 1");
        RosterPeriod::new(Local::now().year(), 1)
    });
    info!(
        "Starting roster at financial year {} week {}",
        period.year, period.week
    );

    let state = AppState::new(RosterState::new(&config.defaults, period));
    let app = router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
