//! Send a single notice to Honeybadger, configured from the environment.
use envconfig::Envconfig;

use badger_notifier::{Config, Connection, ReportError};

#[derive(Envconfig)]
struct SmokeConfig {
    #[envconfig(nested = true)]
    client: Config,

    #[envconfig(from = "NOTICE_CATEGORY", default = "test")]
    category: String,

    #[envconfig(from = "NOTICE_MESSAGE", default = "test notice")]
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), ReportError> {
    tracing_subscriber::fmt::init();

    let config = SmokeConfig::init_from_env().expect("Invalid configuration:");
    let connection =
        Connection::from_config(&config.client).expect("failed to initialize connection");

    connection
        .report_error(Some(&config.category), &config.message)
        .await?;

    tracing::info!("notice sent to {}", connection.endpoint());

    Ok(())
}
