use chart_sniper::config::{load_config, AppConfig};
use chart_sniper::presenter::render;
use chart_sniper::proxy;
use chart_sniper::store::AnalysisStore;
use chart_sniper::uploader::{UploadOutcome, Uploader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: chart-sniper [serve | analyze <image>]";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => run_proxy(&config).await,
        ["analyze", path] => run_analyze(&config, PathBuf::from(*path)).await,
        _ => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

async fn run_proxy(config: &AppConfig) -> ExitCode {
    info!("Starting analyze proxy...");
    match proxy::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Proxy failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Uploads one image through a running proxy and prints the rendered store.
async fn run_analyze(config: &AppConfig, path: PathBuf) -> ExitCode {
    let store = AnalysisStore::shared();
    let uploader = match Uploader::new(&config.proxy_url, store.clone()) {
        Ok(u) => u,
        Err(e) => {
            error!("Failed to create uploader: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = uploader.upload(&path).await;
    if outcome == UploadOutcome::Skipped {
        eprintln!("PNG, JPG, GIF 파일을 지원합니다: {}", path.display());
        return ExitCode::FAILURE;
    }

    println!("{}", render(&*store.lock().await));
    match outcome {
        UploadOutcome::Analyzed => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
