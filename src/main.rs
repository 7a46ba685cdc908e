use std::net::SocketAddr;
use std::sync::Arc;

use recruitment_pipeline::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes,
    services::mail_service::{LogMailer, Mailer, SmtpMailer},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    init_config()?;
    let config = get_config()?.clone();

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "Delivering mail through SMTP relay");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            info!("SMTP_HOST not set, outgoing mail will only be logged");
            Arc::new(LogMailer)
        }
    };

    let addr: SocketAddr = config.server_address.parse()?;
    let app = routes::app(AppState::new(pool, config, mailer));

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
