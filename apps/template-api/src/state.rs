//! Application state for the template API

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use template_engine::{EngineConfig, FieldCatalog};

use crate::pages::PdfPageSource;
use crate::repository::SqliteRepository;

pub struct AppState {
    pub db: SqlitePool,
    pub repo: SqliteRepository,
    pub pages: PdfPageSource,
    pub catalog: FieldCatalog,
    pub config: EngineConfig,
}

impl AppState {
    pub async fn new() -> Result<Self> {
        // Get database path from env or use default
        let db_path = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            let data_dir = dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("template-api");
            std::fs::create_dir_all(&data_dir).ok();
            format!("sqlite:{}/templates.db?mode=rwc", data_dir.display())
        });

        tracing::info!("Connecting to database: {}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_path)
            .await?;

        let documents_dir = std::env::var("TEMPLATE_DOCUMENTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./documents"));
        tracing::info!("Serving documents from {}", documents_dir.display());

        Self::with_pool(pool, documents_dir, EngineConfig::from_env()).await
    }

    /// State over an existing pool, running migrations first
    pub async fn with_pool(
        pool: SqlitePool,
        documents_dir: impl Into<PathBuf>,
        config: EngineConfig,
    ) -> Result<Self> {
        SqliteRepository::run_migrations(&pool).await?;

        Ok(Self {
            repo: SqliteRepository::new(pool.clone()),
            db: pool,
            pages: PdfPageSource::new(documents_dir),
            catalog: FieldCatalog::standard(),
            config,
        })
    }
}

/// Get platform-specific data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
