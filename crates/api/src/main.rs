use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use jobboard_api::app::{self, services::AppServices};
use jobboard_infra::{db, AppConfig};

#[derive(Parser)]
#[command(name = "jobboard", about = "Job board HTTP backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Apply database migrations and exit.
    Migrate,
    /// Create a staff admin account.
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        full_name: String,
    },
    /// Delete blacklisted refresh tokens that have already expired.
    FlushExpiredTokens,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    jobboard_observability::init(config.log_format);
    if config.auth.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Migrate => migrate(&config).await,
        Command::CreateAdmin {
            email,
            password,
            full_name,
        } => create_admin(&config, &email, &password, &full_name).await,
        Command::FlushExpiredTokens => flush_expired_tokens(&config).await,
    }
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let services = AppServices::from_config(config)
        .await
        .context("failed to connect to database")?;
    let app = app::build_app(Arc::new(services));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let Some(database) = &config.database else {
        bail!("DATABASE_URL must be set to run migrations");
    };
    let pool = db::connect(database)
        .await
        .context("failed to connect to database")?;
    db::migrate(&pool).await.context("migration failed")?;
    Ok(())
}

async fn create_admin(
    config: &AppConfig,
    email: &str,
    password: &str,
    full_name: &str,
) -> anyhow::Result<()> {
    if config.database.is_none() {
        bail!("DATABASE_URL must be set; an in-memory admin would be lost on exit");
    }
    let services = AppServices::from_config(config)
        .await
        .context("failed to connect to database")?;
    let admin = services.provision_admin(email, password, full_name).await?;
    tracing::info!(user_id = %admin.id, email = %admin.email, "admin account created");
    Ok(())
}

async fn flush_expired_tokens(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.is_none() {
        bail!("DATABASE_URL must be set to flush the token blacklist");
    }
    let services = AppServices::from_config(config)
        .await
        .context("failed to connect to database")?;
    services.flush_expired_tokens().await?;
    Ok(())
}
