use clap::Parser;
use dotenvy::dotenv;
use rust_sheet_import::config::AppConfig;
use rust_sheet_import::infrastructure::{database, uploads};
use rust_sheet_import::services::import_service::ImportService;
use rust_sheet_import::services::record_store::SqlRecordStore;
use rust_sheet_import::{AppState, create_app};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the HTTP server
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Import this workbook once and exit instead of serving HTTP
    #[arg(long, value_name = "PATH")]
    import: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_sheet_import=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Rust Sheet Import...");

    let config = AppConfig::from_env();
    info!(
        "⚙️  Config: Table={}, Field={}, Max Size={}MB",
        config.import_table,
        config.upload_field_name,
        config.max_file_size / 1024 / 1024
    );

    let db = database::setup_database(&config).await?;
    let store = Arc::new(SqlRecordStore::new(db.clone(), config.import_table.clone()));
    let import_service = Arc::new(ImportService::new(store));

    if let Some(path) = args.import {
        let inserted = import_service.import(&path).await?;
        info!("🏁 {} row(s) inserted from {}", inserted, path.display());
        db.close().await?;
        return Ok(());
    }

    let upload_store = uploads::setup_uploads(&config.upload_dir).await?;
    info!("🌐 Static assets: {}", config.public_dir.display());

    let state = AppState {
        import_service,
        uploads: upload_store,
        config,
    };

    let app = create_app(state);
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
