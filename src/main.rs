use std::sync::Arc;

use tracing::info;
use tracing_subscriber::prelude::*;

use aidoc::config::Config;
use aidoc::gemini::GeminiClient;
use aidoc::handler::App;
use aidoc::server;
use aidoc::store::ConsultationStore;

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "aidoc.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("aidoc.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting aidoc...");
    info!("Loaded config from {config_path}");

    let store = match ConsultationStore::open(&config.database_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let diagnoser = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    let app = Arc::new(App::new(store, diagnoser, config.history_limit));

    if let Err(e) = server::run(app, &config.bind, config.port).await {
        eprintln!("❌ Server error: {e}");
        std::process::exit(1);
    }
}
