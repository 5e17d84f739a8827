//! Configuration management for GoingOn.
//!
//! Settings come from command-line arguments, with environment variables
//! under the `GOINGON_` prefix as a fallback and defaults for everything
//! optional.
//!
//! # Example
//!
//! ```bash
//! # In-memory storage on the default port
//! going-on serve
//!
//! # S3-backed storage against a local MinIO
//! going-on serve --storage s3 --s3-bucket goingon --s3-endpoint http://localhost:9000
//!
//! # Verify the bucket is reachable
//! going-on check --s3-bucket goingon
//! ```
//!
//! # Environment Variables
//!
//! - `GOINGON_HOST` - Server bind address (default: 0.0.0.0)
//! - `GOINGON_PORT` - Server port (default: 3000)
//! - `GOINGON_STORAGE` - `memory` or `s3` (default: memory)
//! - `GOINGON_S3_BUCKET` - S3 bucket name (required for `s3`)
//! - `GOINGON_S3_PREFIX` - Key prefix inside the bucket
//! - `GOINGON_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `GOINGON_S3_REGION` - AWS region (default: us-east-1)
//! - `GOINGON_CORS_ORIGINS` - Allowed CORS origins, comma-separated
//! - `GOINGON_MAX_BODY_SIZE` - Request body limit in bytes (default: 10 MiB)
//! - `GOINGON_THUMBNAIL_SIZE` - Thumbnail bounding box edge (default: 40)

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::images::DEFAULT_THUMBNAIL_SIZE;
use crate::server::DEFAULT_MAX_BODY_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Largest thumbnail edge accepted by validation.
pub const MAX_THUMBNAIL_SIZE: u32 = 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// GoingOn - a REST backend for city-local news diaries.
#[derive(Parser, Debug)]
#[command(name = "going-on")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeConfig),

    /// Check S3 connectivity and configuration
    Check(CheckConfig),
}

/// Where users, news and images are persisted.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; lost on restart
    Memory,
    /// An S3 or S3-compatible bucket
    S3,
}

/// S3 connection settings shared by `serve` and `check`.
#[derive(Args, Debug, Clone)]
pub struct S3Args {
    /// S3 bucket name.
    #[arg(long, env = "GOINGON_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Key prefix inside the bucket.
    #[arg(long, env = "GOINGON_S3_PREFIX")]
    pub s3_prefix: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "GOINGON_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "GOINGON_S3_REGION")]
    pub s3_region: String,
}

impl S3Args {
    /// The configured bucket, or an error naming how to set it.
    pub fn resolve_bucket(&self) -> Result<String, String> {
        match self.s3_bucket.as_deref().map(str::trim) {
            Some(bucket) if !bucket.is_empty() => Ok(bucket.to_string()),
            _ => Err("S3 bucket name is required. Set --s3-bucket or GOINGON_S3_BUCKET".to_string()),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GOINGON_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GOINGON_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Storage backend.
    #[arg(long, value_enum, default_value_t = StorageBackend::Memory, env = "GOINGON_STORAGE")]
    pub storage: StorageBackend,

    #[command(flatten)]
    pub s3: S3Args,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated). Any origin when unset.
    #[arg(long, env = "GOINGON_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE, env = "GOINGON_MAX_BODY_SIZE")]
    pub max_body_size: usize,

    /// Edge of the square thumbnails are scaled to fit, in pixels.
    #[arg(long, default_value_t = DEFAULT_THUMBNAIL_SIZE, env = "GOINGON_THUMBNAIL_SIZE")]
    pub thumbnail_size: u32,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage == StorageBackend::S3 {
            self.s3.resolve_bucket()?;
        }

        if self.thumbnail_size == 0 || self.thumbnail_size > MAX_THUMBNAIL_SIZE {
            return Err(format!(
                "thumbnail_size must be between 1 and {}",
                MAX_THUMBNAIL_SIZE
            ));
        }

        if self.max_body_size == 0 {
            return Err("max_body_size must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub s3: S3Args,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
