use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub upload: UploadConfig,
    pub minio: MinioConfig,
    pub database: DatabaseConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadBackend {
    Http,
    Minio,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub backend: UploadBackend,
    pub url: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub stickers_bucket: String,
    pub public_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub thumbnail_max_width: u32,
    pub thumbnail_max_height: u32,
    pub scratch_dir: PathBuf,
    pub paid_pack_price: i64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            thumbnail_max_width: 128,
            thumbnail_max_height: 128,
            scratch_dir: PathBuf::from("./temp_thumbnails"),
            paid_pack_price: 50_000,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let defaults = ImportConfig::default();

        Config {
            upload: UploadConfig {
                backend: match env::var("UPLOAD_BACKEND").as_deref() {
                    Ok("minio") => UploadBackend::Minio,
                    _ => UploadBackend::Http,
                },
                url: env::var("UPLOAD_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/api/stickers/upload".to_string()),
                base_url: env::var("UPLOAD_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/stickers".to_string()),
                timeout: Duration::from_secs(
                    env::var("UPLOAD_TIMEOUT_SECS")
                        .ok()
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(30),
                ),
            },
            minio: MinioConfig {
                endpoint: env::var("MINIO_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:9000".to_string()),
                access_key: env::var("MINIO_ACCESS_KEY")
                    .unwrap_or_else(|_| "minioadmin".to_string()),
                secret_key: env::var("MINIO_SECRET_KEY")
                    .unwrap_or_else(|_| "minioadmin".to_string()),
                region: env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                stickers_bucket: env::var("MINIO_STICKERS_BUCKET")
                    .unwrap_or_else(|_| "stickers".to_string()),
                public_url: env::var("MINIO_PUBLIC_URL").ok(),
            },
            database: DatabaseConfig {
                host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: env::var("DB_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5432),
                user: env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
                password: env::var("DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
                database: env::var("DB_NAME").unwrap_or_else(|_| "stickers".to_string()),
                ssl_mode: env::var("DB_SSL_MODE").unwrap_or_else(|_| "disable".to_string()),
                max_connections: env::var("DB_MAX_CONNS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5),
            },
            import: ImportConfig {
                thumbnail_max_width: env::var("THUMBNAIL_MAX_WIDTH")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.thumbnail_max_width),
                thumbnail_max_height: env::var("THUMBNAIL_MAX_HEIGHT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.thumbnail_max_height),
                scratch_dir: env::var("THUMBNAIL_SCRATCH_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.scratch_dir),
                paid_pack_price: env::var("PAID_PACK_PRICE")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.paid_pack_price),
            },
        }
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.database.user,
            self.database.password,
            self.database.host,
            self.database.port,
            self.database.database,
            self.database.ssl_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_includes_ssl_mode() {
        let config = Config {
            upload: UploadConfig {
                backend: UploadBackend::Http,
                url: String::new(),
                base_url: String::new(),
                timeout: Duration::from_secs(30),
            },
            minio: MinioConfig {
                endpoint: String::new(),
                access_key: String::new(),
                secret_key: String::new(),
                region: String::new(),
                stickers_bucket: String::new(),
                public_url: None,
            },
            database: DatabaseConfig {
                host: "db".to_string(),
                port: 5433,
                user: "importer".to_string(),
                password: "secret".to_string(),
                database: "stickers".to_string(),
                ssl_mode: "require".to_string(),
                max_connections: 5,
            },
            import: ImportConfig::default(),
        };

        assert_eq!(
            config.database_url(),
            "postgres://importer:secret@db:5433/stickers?sslmode=require"
        );
    }

    #[test]
    fn import_defaults() {
        let import = ImportConfig::default();
        assert_eq!((import.thumbnail_max_width, import.thumbnail_max_height), (128, 128));
        assert_eq!(import.paid_pack_price, 50_000);
    }
}
