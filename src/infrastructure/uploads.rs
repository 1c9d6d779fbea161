use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tracing::{info, warn};

const MAX_NAME_ATTEMPTS: i64 = 1000;

/// Local directory holding uploaded spreadsheets. Files are never cleaned up.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// A freshly created, empty upload file
pub struct ReservedUpload {
    pub file: File,
    pub stored_name: String,
    pub path: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Creates `<field>-<millis><ext>` in the upload directory. When that name
    /// is taken the timestamp is bumped by one millisecond until a free name
    /// is found.
    pub async fn reserve(&self, field_name: &str, original_name: &str) -> io::Result<ReservedUpload> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let now = Utc::now().timestamp_millis();

        for offset in 0..MAX_NAME_ATTEMPTS {
            let name = stored_name(field_name, now + offset, &ext);
            let path = self.dir.join(&name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    return Ok(ReservedUpload {
                        file,
                        stored_name: name,
                        path,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free upload name for '{}' in {}", field_name, self.dir.display()),
        ))
    }

    /// Removes an upload that will not be imported.
    pub async fn discard(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => info!("🧹 Removed discarded upload {}", path.display()),
            Err(e) => warn!("Failed to remove discarded upload {}: {}", path.display(), e),
        }
    }
}

pub fn stored_name(field_name: &str, millis: i64, ext: &str) -> String {
    format!("{}-{}{}", field_name, millis, ext)
}

pub async fn setup_uploads(dir: &Path) -> anyhow::Result<UploadStore> {
    let store = UploadStore::new(dir);
    store.ensure_dir().await?;
    info!("📁 Upload directory: {}", store.dir().display());
    Ok(store)
}
