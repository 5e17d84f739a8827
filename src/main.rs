//! GoingOn - a REST backend for city-local news diaries.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use goingon::{
    config::{CheckConfig, Cli, Command, ServeConfig, StorageBackend},
    images::{ImageCodec, NewsImageRepository},
    server::{create_router, AppState, RouterConfig},
    storage::{
        create_s3_client, BlobStore, MemoryBlobStore, MemoryNewsStorage, MemoryUserStorage,
        NewsStorage, S3BlobStore, S3NewsStorage, S3ObjectStore, S3UserStorage, UserStorage,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

type Backends = (Arc<dyn UserStorage>, Arc<dyn NewsStorage>, Arc<dyn BlobStore>);

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("GoingOn v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");

    let (users, news, blobs) = match build_backends(&config).await {
        Ok(backends) => backends,
        Err(e) => {
            error!("  Failed to connect to S3: {}", e);
            error!("  Check credentials, bucket name and endpoint");
            return ExitCode::FAILURE;
        }
    };

    info!("  Thumbnail size: {}px", config.thumbnail_size);
    info!("  Max body size: {} bytes", config.max_body_size);

    let images = NewsImageRepository::new(blobs, ImageCodec::new(config.thumbnail_size));
    let state = AppState::new(users, news, images);
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Construct the storage handles for the configured backend.
async fn build_backends(config: &ServeConfig) -> Result<Backends, String> {
    match config.storage {
        StorageBackend::Memory => {
            warn!("  Storage: memory (data is lost on restart)");
            let users: Arc<dyn UserStorage> = Arc::new(MemoryUserStorage::new());
            let news: Arc<dyn NewsStorage> = Arc::new(MemoryNewsStorage::new());
            let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
            Ok((users, news, blobs))
        }
        StorageBackend::S3 => {
            let bucket = config.s3.resolve_bucket()?;
            info!("  Storage: s3");
            info!("  S3 bucket: {}", bucket);
            if let Some(ref endpoint) = config.s3.s3_endpoint {
                info!("  S3 endpoint: {}", endpoint);
            }
            info!("  S3 region: {}", config.s3.s3_region);

            let client =
                create_s3_client(config.s3.s3_endpoint.as_deref(), &config.s3.s3_region).await;
            let store = S3ObjectStore::new(client, bucket, config.s3.s3_prefix.as_deref());
            store.ping().await.map_err(|e| e.to_string())?;

            let users: Arc<dyn UserStorage> = Arc::new(S3UserStorage::new(store.clone()));
            let news: Arc<dyn NewsStorage> = Arc::new(S3NewsStorage::new(store.clone()));
            let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(store));
            Ok((users, news, blobs))
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "goingon=debug,tower_http=debug"
    } else {
        "goingon=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_max_body_size(config.max_body_size);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("GoingOn Configuration Check");
    println!("═══════════════════════════");
    println!();

    let bucket = match config.s3.resolve_bucket() {
        Ok(b) => {
            println!("✓ Bucket: {}", b);
            b
        }
        Err(e) => {
            println!("✗ Bucket: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref prefix) = config.s3.s3_prefix {
        println!("✓ Prefix: {}", prefix);
    }
    if let Some(ref endpoint) = config.s3.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", config.s3.s3_region);
    println!();

    print!("Testing S3 connection... ");

    let client = create_s3_client(config.s3.s3_endpoint.as_deref(), &config.s3.s3_region).await;
    let store = S3ObjectStore::new(client, bucket.clone(), config.s3.s3_prefix.as_deref());

    if let Err(e) = store.ping().await {
        println!("✗ failed");
        println!();
        println!("Error: {}", e);
        println!();
        println!("Please check:");
        println!("  - Your AWS credentials are configured correctly");
        println!("  - The bucket '{}' exists and is accessible", bucket);
        if config.s3.s3_endpoint.is_some() {
            println!("  - The S3 endpoint is correct and reachable");
        }
        return ExitCode::FAILURE;
    }
    println!("✓ success");

    println!();
    println!("═══════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
