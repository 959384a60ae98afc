//! Configuration module
//!
//! Runtime configuration for the face-swap service: server settings, optional
//! result storage, per-request scratch workspaces and the external adapter.
//! Everything is read from the environment (with `.env` support) once at
//! startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8080;
const MAX_UPLOAD_SIZE_MB: usize = 500;
const MAX_CONCURRENT_SWAPS: usize = 2;
const WORKSPACE_CLEANUP_DELAY_SECS: u64 = 60;

const DEFAULT_PROGRAM: &str = "python3";
const DEFAULT_DETECT_ARGS: &str = "detect.py --input {input}";
const DEFAULT_SWAP_ARGS: &str =
    "run.py -s {source} -t {target} -o {output} --frame-processor face_swapper";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" | "pretty" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Invalid LOG_FORMAT: {}", other)),
        }
    }
}

/// When a request workspace is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTrigger {
    /// Release once the response body has been transmitted or dropped
    OnComplete,
    /// Release after a fixed delay once the handler returns
    Delayed(Duration),
}

impl CleanupTrigger {
    fn parse(mode: &str, delay_secs: u64) -> Result<Self, anyhow::Error> {
        match mode.trim().to_lowercase().as_str() {
            "on_complete" | "on-complete" | "complete" => Ok(CleanupTrigger::OnComplete),
            "delayed" | "timer" => Ok(CleanupTrigger::Delayed(Duration::from_secs(delay_secs))),
            other => Err(anyhow::anyhow!(
                "Invalid WORKSPACE_CLEANUP: {} (expected on_complete or delayed)",
                other
            )),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub version: String,
    pub max_upload_size_bytes: usize,
    pub max_concurrent_swaps: usize,
    pub log_format: LogFormat,
}

/// Result storage settings. `backend` is `None` when uploads are disabled.
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    pub backend: Option<StorageBackend>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    // Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub endpoint: Option<String>,
    pub public_base_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl StorageConfig {
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }
}

/// Scratch workspace settings
#[derive(Clone, Debug)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    pub cleanup: CleanupTrigger,
}

/// External face-swap toolkit settings.
///
/// Argument templates are whitespace separated and may contain the
/// `{source}`, `{target}`, `{output}` and `{input}` placeholders.
#[derive(Clone, Debug)]
pub struct AdapterConfig {
    pub program: String,
    pub detect_args: String,
    pub image_args: String,
    pub video_args: String,
    pub warmup_args: Option<String>,
    pub workdir: Option<PathBuf>,
    pub execution_provider: String,
    pub preload_models: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub workspace: WorkspaceConfig,
    pub adapter: AdapterConfig,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert the megabyte limit, rejecting values that do not fit in `usize`
fn upload_limit_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", megabytes))
}

fn parse_bool_var(name: &str, default: bool) -> bool {
    match non_empty_var(name) {
        Some(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        None => default,
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let log_format = match non_empty_var("LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            cors_origins,
            environment,
            version: non_empty_var("APP_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            max_upload_size_bytes: upload_limit_bytes(max_upload_size_mb)?,
            max_concurrent_swaps: env::var("MAX_CONCURRENT_SWAPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONCURRENT_SWAPS),
            log_format,
        };

        let bucket = non_empty_var("STORAGE_BUCKET");
        let backend = match non_empty_var("STORAGE_BACKEND") {
            Some(v) => Some(v.parse::<StorageBackend>()?),
            None if bucket.is_some() => Some(StorageBackend::Gcs),
            None => None,
        };

        let storage = StorageConfig {
            backend,
            bucket,
            region: non_empty_var("STORAGE_REGION").or_else(|| non_empty_var("AWS_REGION")),
            endpoint: non_empty_var("STORAGE_ENDPOINT"),
            public_base_url: non_empty_var("STORAGE_PUBLIC_BASE_URL"),
            local_storage_path: non_empty_var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty_var("LOCAL_STORAGE_BASE_URL"),
        };

        let delay_secs = env::var("WORKSPACE_CLEANUP_DELAY_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(WORKSPACE_CLEANUP_DELAY_SECS);

        let workspace = WorkspaceConfig {
            root: non_empty_var("WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            cleanup: CleanupTrigger::parse(
                &non_empty_var("WORKSPACE_CLEANUP").unwrap_or_else(|| "on_complete".to_string()),
                delay_secs,
            )?,
        };

        let image_args =
            non_empty_var("FACESWAP_IMAGE_ARGS").unwrap_or_else(|| DEFAULT_SWAP_ARGS.to_string());

        let adapter = AdapterConfig {
            program: non_empty_var("FACESWAP_PROGRAM")
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            detect_args: non_empty_var("FACESWAP_DETECT_ARGS")
                .unwrap_or_else(|| DEFAULT_DETECT_ARGS.to_string()),
            video_args: non_empty_var("FACESWAP_VIDEO_ARGS").unwrap_or_else(|| image_args.clone()),
            image_args,
            warmup_args: non_empty_var("FACESWAP_WARMUP_ARGS"),
            workdir: non_empty_var("FACESWAP_WORKDIR").map(PathBuf::from),
            execution_provider: non_empty_var("EXECUTION_PROVIDER")
                .unwrap_or_else(|| "cpu".to_string()),
            preload_models: parse_bool_var("PRELOAD_MODELS", false),
        };

        Ok(Config {
            base,
            storage,
            workspace,
            adapter,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.base.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if let CleanupTrigger::Delayed(delay) = self.workspace.cleanup {
            if delay.is_zero() {
                return Err(anyhow::anyhow!(
                    "WORKSPACE_CLEANUP_DELAY_SECS must be greater than 0 for delayed cleanup"
                ));
            }
        }

        if self.base.max_concurrent_swaps == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_SWAPS must be greater than 0"));
        }

        match self.storage.backend {
            Some(StorageBackend::Gcs) | Some(StorageBackend::S3) if self.storage.bucket.is_none() => {
                return Err(anyhow::anyhow!(
                    "STORAGE_BUCKET is required when STORAGE_BACKEND is gcs or s3"
                ));
            }
            Some(StorageBackend::Local) if self.storage.local_storage_path.is_none() => {
                return Err(anyhow::anyhow!(
                    "LOCAL_STORAGE_PATH is required when STORAGE_BACKEND is local"
                ));
            }
            _ => {}
        }

        if self.adapter.program.trim().is_empty() {
            return Err(anyhow::anyhow!("FACESWAP_PROGRAM must not be empty"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn version(&self) -> &str {
        &self.base.version
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.base.max_upload_size_bytes
    }

    pub fn max_concurrent_swaps(&self) -> usize {
        self.base.max_concurrent_swaps
    }

    pub fn log_format(&self) -> LogFormat {
        self.base.log_format
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    pub fn adapter(&self) -> &AdapterConfig {
        &self.adapter
    }
}

impl Default for Config {
    /// Development defaults without consulting the environment.
    fn default() -> Self {
        Config {
            base: BaseConfig {
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
                max_concurrent_swaps: MAX_CONCURRENT_SWAPS,
                log_format: LogFormat::Compact,
            },
            storage: StorageConfig::default(),
            workspace: WorkspaceConfig {
                root: env::temp_dir(),
                cleanup: CleanupTrigger::OnComplete,
            },
            adapter: AdapterConfig {
                program: DEFAULT_PROGRAM.to_string(),
                detect_args: DEFAULT_DETECT_ARGS.to_string(),
                image_args: DEFAULT_SWAP_ARGS.to_string(),
                video_args: DEFAULT_SWAP_ARGS.to_string(),
                warmup_args: None,
                workdir: None,
                execution_provider: "cpu".to_string(),
                preload_models: false,
            },
        }
    }
}
