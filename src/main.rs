use tracing_subscriber::EnvFilter;

use carebook::api::{api_router, ApiContext};
use carebook::config::{self, Config};
use carebook::db::Database;
use carebook::mailer::Mailer;
use carebook::notify::Notifier;
use carebook::payment::PaymentGate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env()?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&config.db_path)?;

    let payment = PaymentGate::new(&config.payment);
    let mailer = match &config.mail {
        Some(mail) => Some(Mailer::new(mail)?),
        None => {
            tracing::warn!("Mail relay not configured; appointment emails disabled");
            None
        }
    };
    let notifier = Notifier::new(db.clone(), mailer);

    let app = api_router(ApiContext::new(db, payment, notifier));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Carebook API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
