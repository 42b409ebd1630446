//! Captioner — single-binary caption composition server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use captioner_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                println!("Captioner — image caption composition server");
                println!();
                println!("Usage: captioner [command]");
                println!();
                println!("Commands:");
                println!("  (none)                   Start the server");
                println!("  help                     Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT                     Listen port (default 5000)");
                println!("  ORIGIN                   Allowed frontend origin");
                println!("  BLIP_MODEL_ID            Image captioning model");
                println!("  GEN_MODEL_ID             Text generation model");
                println!("  HF_TOKEN                 Hugging Face access token");
                println!("  CAPTIONER_BACKEND        hf | stub");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'captioner help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = captioner_core::CaptionerConfig::from_env()?;
    let port = config.port;
    let base_url = config.base_url.clone();

    let backends = captioner_infer::create_backends(&config.models)
        .map_err(|e| anyhow::anyhow!("Failed to initialize model backends: {}", e))?;

    let state = Arc::new(AppState::new(config, backends));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Captioner server listening on {} ({})", addr, base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
