use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    /// Directory for photos when no remote bucket is usable
    pub upload_dir: String,
    /// Prefix for locally served photo URLs (e.g. "http://localhost:8000").
    /// Empty means root-relative URLs.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub s3: S3Settings,
}

/// Remote object storage settings. `bucket` unset means local storage.
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    pub bucket: Option<String>,
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack, ...)
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    /// Overrides the public URL prefix of stored objects (e.g. a CDN)
    pub public_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            database_url: get_env("DATABASE_URL", "sqlite:gadgets.db?mode=rwc"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8000"),
            upload_dir: get_env("UPLOAD_DIR", "uploads"),
            public_base_url: get_env("PUBLIC_BASE_URL", ""),
            max_upload_bytes: get_env("MAX_UPLOAD_BYTES", "10485760")
                .parse()
                .unwrap_or(10 * 1024 * 1024),
            s3: S3Settings {
                bucket: get_optional_env("PHOTO_BUCKET"),
                region: get_env("S3_REGION", "us-east-1"),
                endpoint_url: get_optional_env("S3_ENDPOINT_URL"),
                force_path_style: get_env("S3_FORCE_PATH_STYLE", "false")
                    .parse()
                    .unwrap_or(false),
                public_base_url: get_optional_env("PHOTO_PUBLIC_BASE_URL"),
            },
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank variables are both treated as absent
fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
