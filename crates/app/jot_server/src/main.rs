//! Jot API server binary.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "jot_server", about = "Jot notes service")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/jot"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jot_api=debug,jot_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let config = jot_api::config::ApiConfig {
        bind_addr: format!("127.0.0.1:{}", args.port),
        database_url: args.database_url,
        jwt_secret: jot_api::config::resolve_jwt_secret(),
        password_policy: Default::default(),
    };

    if config.signing_secret().is_none() {
        // Not a warning: an unset secret disables every authenticated route.
        error!("JWT_SECRET is not set; token issuance and verification are refused");
    }

    info!(port = args.port, "starting jot_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    jot_api::migrate(&pool).await?;

    let state = jot_api::AppState {
        pool,
        config: config.clone(),
    };
    let app = jot_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
