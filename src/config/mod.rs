use std::env;
use std::path::PathBuf;

/// Runtime configuration for the import service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Destination store connection URL (mysql://, postgres:// or sqlite://)
    pub database_url: String,

    /// Pool size for the destination store (default: 1, a single shared connection)
    pub database_max_connections: u32,

    /// Table receiving one row per spreadsheet record, optionally `schema.table`
    pub import_table: String,

    /// Directory uploaded files are written to (default: "./uploads")
    pub upload_dir: PathBuf,

    /// Directory served as static assets at "/" (default: "./public")
    pub public_dir: PathBuf,

    /// Multipart field name carrying the spreadsheet (default: "excelFile")
    pub upload_field_name: String,

    /// Maximum upload size in bytes (default: 50 MB)
    pub max_file_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://import.db?mode=rwc".to_string(),
            database_max_connections: 1,
            import_table: "your_table_name".to_string(),
            upload_dir: PathBuf::from("./uploads"),
            public_dir: PathBuf::from("./public"),
            upload_field_name: "excelFile".to_string(),
            max_file_size: 50 * 1024 * 1024, // 50 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default.database_max_connections),

            import_table: env::var("IMPORT_TABLE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.import_table),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.public_dir),

            upload_field_name: env::var("UPLOAD_FIELD_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(default.upload_field_name),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }

    /// Config for local development and tests: in-memory SQLite, relative dirs
    pub fn development() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            import_table: "imported_rows".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.upload_field_name, "excelFile");
        assert_eq!(config.database_max_connections, 1);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.import_table, "imported_rows");
        assert_eq!(config.upload_field_name, "excelFile");
    }
}
