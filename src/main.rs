use crate::{
    app::{App, CheckoutConfig},
    auth::SessionVerifier,
    db::PostgresDb,
    db_pool::DbPool,
    handler::router,
    migrations::run_migrations,
};
use anyhow::Context;
use clap::Parser;
use normie_rs::NormieApi;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod auth;
mod code;
mod db;
mod db_pool;
mod error;
mod handler;
mod migrations;
mod models;
mod payments;
mod pricing;
mod schema;
mod signals;
mod status;

#[cfg(not(debug_assertions))]
#[must_use]
pub const fn is_debug() -> bool {
    false
}

#[cfg(debug_assertions)]
#[must_use]
pub const fn is_debug() -> bool {
    true
}

#[derive(Default, Parser, Debug)]
struct Arguments {
    #[arg(long, default_value_t = true, help = "Relax CORS", env = "RELAX_CORS")]
    cors_relaxed: bool,

    #[arg(long, default_value_t = 8080, help = "Port to listen on", env = "PORT")]
    port: u16,

    #[arg(
        long,
        default_value_t = 1000,
        help = "Payment code lookup cache size",
        env = "CACHE_SIZE"
    )]
    cache_size: usize,

    #[arg(long, help = "Logging level of the Rust log", env = "RUST_LOG")]
    #[clap(default_value_t = String::from("info,tower_http=debug"))]
    rust_log_level: String,

    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    #[arg(
        long,
        default_value_t = 10,
        help = "DB pool size",
        env = "DB_POOL_SIZE"
    )]
    db_pool_size: usize,

    #[arg(long, default_value_t = String::from(normie_rs::DEFAULT_API_URL), env = "NORMIE_API_URL")]
    normie_api_url: String,

    #[arg(long, help = "Normie API key", env = "NORMIE_API")]
    normie_api_key: String,

    #[arg(
        long,
        default_value_t = 30,
        help = "Timeout of payments API requests",
        env = "NORMIE_TIMEOUT_SECS"
    )]
    normie_timeout_secs: u64,

    #[arg(long, default_value_t = String::from("zelle-pal"), env = "NORMIE_PROJECT_ID")]
    project_id: String,

    #[arg(long, default_value_t = String::from("Payment Code"), env = "CHECKOUT_NAME")]
    checkout_name: String,

    #[arg(long, help = "Secret the session tokens are signed with", env = "SESSION_SECRET")]
    session_secret: String,
}

fn setup_cors(relaxed: bool) -> CorsLayer {
    if relaxed {
        tracing::info!("cors setup: very_permissive");
        CorsLayer::very_permissive().allow_credentials(true)
    } else {
        tracing::info!("cors setup: default");
        CorsLayer::new()
    }
}

fn payments_client(args: &Arguments) -> anyhow::Result<NormieApi> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.normie_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    Ok(NormieApi::new(args.normie_api_key.clone())
        .with_url(&args.normie_api_url)
        .with_client(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.rust_log_level.clone()))
        .with(tracing_subscriber::fmt::layer().with_ansi(is_debug()))
        .init();

    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Could not install rustls default crypto provider."))?;

    run_migrations(&args.db_url)?;

    let dbpool = DbPool::build(&args.db_url, args.db_pool_size).await?;

    let payments = payments_client(&args)?;

    tracing::info!(
        api_url = args.normie_api_url,
        project_id = args.project_id,
        "payments api configured"
    );

    let app = App::new(
        Arc::new(PostgresDb::new(dbpool)),
        Arc::new(payments),
        CheckoutConfig {
            project_id: args.project_id,
            name: args.checkout_name,
        },
        args.cache_size,
    );

    let router = router(app, SessionVerifier::new(&args.session_secret))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(args.cors_relaxed));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    tracing::info!("listening on http://{}", addr);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    signals::create_term_signal_handler(tx);

    let listener = TcpListener::bind(addr).await?;

    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    );

    let graceful = server.with_graceful_shutdown(async {
        rx.await.ok();
    });

    if let Err(e) = graceful.await {
        tracing::error!("server error: {}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_defaults() {
        let args = Arguments::try_parse_from([
            "zellepal",
            "--db-url",
            "postgres://localhost/zellepal",
            "--normie-api-key",
            "key",
            "--session-secret",
            "secret",
        ])
        .unwrap();

        assert_eq!(args.port, 8080);
        assert_eq!(args.project_id, "zelle-pal");
        assert_eq!(args.checkout_name, "Payment Code");
        assert_eq!(args.normie_api_url, normie_rs::DEFAULT_API_URL);
    }

    #[test]
    fn test_payments_client() {
        let args = Arguments {
            normie_api_url: "http://localhost:9000".to_string(),
            normie_timeout_secs: 5,
            ..Default::default()
        };

        assert!(payments_client(&args).is_ok());
    }
}
