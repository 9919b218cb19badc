use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use previewer::application::FillPreviewUseCase;
use previewer::infrastructure::{
    AppConfig, ArtifactStorage, CliArgs, ConfigLoader, HttpSourceLoader, LanczosResizer,
    PreviewCache, SourceLoaderConfig,
};
use previewer::presentation::{AppState, build_router, serve};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    // A missing .env is not an error.
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    let loader =
        ConfigLoader::new().unwrap_or_else(|_| ConfigLoader::with_dir(PathBuf::from(".")));
    let mut config = loader.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    config.validate()?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = previewer::VERSION, "Starting {}", previewer::NAME);

    let cache_dir = config.effective_cache_dir();
    let storage = Arc::new(
        ArtifactStorage::open(cache_dir.clone())
            .await
            .wrap_err_with(|| {
                format!("Failed to open artifact directory {}", cache_dir.display())
            })?,
    );
    let cache =
        Arc::new(PreviewCache::rebuild_from_disk(storage.clone(), config.cache_capacity()?).await?);

    let loader_config = SourceLoaderConfig {
        timeout: config.loading.timeout(),
        ..SourceLoaderConfig::default()
    };
    let loader = HttpSourceLoader::new(loader_config, storage.clone())?;
    let resizer = LanczosResizer::new(storage.clone());
    let fill = Arc::new(FillPreviewUseCase::new(
        Arc::new(loader),
        Arc::new(resizer),
        cache,
        storage,
    ));

    let router = build_router(AppState::new(fill.clone(), config.loading.protocol.trim()));
    let address = config.http.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind {address}"))?;

    serve(listener, router).await?;
    fill.shutdown().await;

    Ok(())
}
