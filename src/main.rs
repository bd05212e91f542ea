use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms_backend::{
    article::ArticleStore,
    http::{router, AppState},
    recent::RecencyTracker,
};

#[derive(Parser)]
#[command(name = "cms-backend")]
#[command(about = "Content-management backend with per-user recently-viewed tracking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(short, long, default_value = "8000")]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// SQLite database URL; DATABASE_URL in the environment takes precedence
    #[arg(long, default_value = "sqlite://cms.db")]
    database_url: String,

    #[arg(long, default_value = "false")]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cms_backend={filter_level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").unwrap_or(args.database_url);
    let store = ArticleStore::connect(&database_url)
        .await
        .unwrap_or_else(|e| panic!("failed to open article store at {database_url}: {e}"));

    let app_state = AppState {
        store,
        recent: RecencyTracker::new(),
    };

    let app = router(app_state);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {bind_addr}: {e}"));

    info!("CMS backend started on {}", bind_addr);
    info!("");
    info!("Usage:");
    info!(
        "   curl -X POST -H 'Content-Type: application/json' \
         -d '{{\"title\":\"Hello\",\"content\":\"...\",\"author_id\":1}}' http://{}/articles/",
        bind_addr
    );
    info!("   curl http://{}/articles/1?user_id=42", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
