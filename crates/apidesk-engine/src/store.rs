//! Storage backends for API records and AsyncAPI definitions.
//!
//! The engine talks to storage through two traits:
//! - [`ContentStore`] loads API records and persists description/overview edits
//! - [`DefinitionSource`] returns the raw AsyncAPI definition for an API
//!
//! [`FileStore`] implements both on a local `.apidesk/apis/` tree.
//! The remote publisher source lives in [`crate::http`].

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::{ApiRecord, DescriptionType};

/// File holding the API record inside an API directory.
const RECORD_FILE: &str = "api.json";
/// File holding the AsyncAPI definition inside an API directory.
const DEFINITION_FILE: &str = "asyncapi.json";

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("API not found: {0}")]
    ApiNotFound(String),

    #[error("No AsyncAPI definition for API: {0}")]
    DefinitionNotFound(String),

    #[error("API already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid API ID: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Persisted source of truth for API text content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load the current record of an API.
    async fn load_api(&self, api_id: &str) -> Result<ApiRecord, StoreError>;

    /// Replace one text field of an API and return the updated record.
    async fn update_content(
        &self,
        api_id: &str,
        description_type: DescriptionType,
        content: &str,
    ) -> Result<ApiRecord, StoreError>;
}

/// Provider of raw AsyncAPI definition payloads.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Fetch the raw definition document of an API.
    async fn fetch_definition(&self, api_id: &str) -> Result<String, StoreError>;
}

/// Local file-backed store rooted at a `.apidesk` directory.
///
/// Layout:
/// ```text
/// <base>/apis/<id>/api.json
/// <base>/apis/<id>/asyncapi.json
/// ```
///
/// Clones share one write lock, so content updates through any clone are
/// applied one at a time.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open a store, creating the `apis` directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        fs::create_dir_all(base_path.join("apis"))?;
        Ok(Self {
            base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Register a new API. Fails if the ID is already taken.
    pub fn create_api(&self, record: &ApiRecord) -> Result<(), StoreError> {
        validate_id(&record.id)?;
        if self.record_path(&record.id).exists() {
            return Err(StoreError::AlreadyExists(record.id.clone()));
        }
        self.write_record(record)?;
        info!(api_id = %record.id, name = %record.name, "created API");
        Ok(())
    }

    /// Store an AsyncAPI definition for an existing API.
    pub fn import_definition(&self, api_id: &str, raw: &str) -> Result<(), StoreError> {
        validate_id(api_id)?;
        if !self.record_path(api_id).exists() {
            return Err(StoreError::ApiNotFound(api_id.to_string()));
        }
        atomic_write(&self.api_dir(api_id).join(DEFINITION_FILE), raw.as_bytes())?;
        debug!(api_id, bytes = raw.len(), "imported AsyncAPI definition");
        Ok(())
    }

    /// List all records, sorted by name.
    pub fn list_apis(&self) -> Result<Vec<ApiRecord>, StoreError> {
        let mut records = Vec::new();
        for entry in fs::read_dir(self.base_path.join("apis"))? {
            let path = entry?.path().join(RECORD_FILE);
            if path.is_file() {
                let content = fs::read_to_string(&path)?;
                records.push(serde_json::from_str::<ApiRecord>(&content)?);
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Load a record synchronously.
    pub fn read_record(&self, api_id: &str) -> Result<ApiRecord, StoreError> {
        validate_id(api_id)?;
        let path = self.record_path(api_id);
        if !path.exists() {
            return Err(StoreError::ApiNotFound(api_id.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_record(&self, record: &ApiRecord) -> Result<(), StoreError> {
        let dir = self.api_dir(&record.id);
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(record)?;
        atomic_write(&dir.join(RECORD_FILE), json.as_bytes())?;
        Ok(())
    }

    fn api_dir(&self, api_id: &str) -> PathBuf {
        self.base_path.join("apis").join(api_id)
    }

    fn record_path(&self, api_id: &str) -> PathBuf {
        self.api_dir(api_id).join(RECORD_FILE)
    }
}

#[async_trait]
impl ContentStore for FileStore {
    async fn load_api(&self, api_id: &str) -> Result<ApiRecord, StoreError> {
        let store = self.clone();
        let api_id = api_id.to_string();
        run_blocking(move || store.read_record(&api_id)).await
    }

    async fn update_content(
        &self,
        api_id: &str,
        description_type: DescriptionType,
        content: &str,
    ) -> Result<ApiRecord, StoreError> {
        // The guard moves into the blocking task so an aborted caller cannot
        // release it while the write is still running.
        let guard = Arc::clone(&self.write_lock).lock_owned().await;
        let store = self.clone();
        let api_id = api_id.to_string();
        let content = content.to_string();

        run_blocking(move || {
            let _guard = guard;
            let mut record = store.read_record(&api_id)?;
            record.set_content(description_type, &content);
            store.write_record(&record)?;
            info!(
                api_id = %api_id,
                field = %description_type,
                bytes = content.len(),
                "updated API content"
            );
            Ok(record)
        })
        .await
    }
}

#[async_trait]
impl DefinitionSource for FileStore {
    async fn fetch_definition(&self, api_id: &str) -> Result<String, StoreError> {
        validate_id(api_id)?;
        let path = self.api_dir(api_id).join(DEFINITION_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::DefinitionNotFound(api_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// API IDs become directory names, so keep them to a safe alphabet.
fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !id.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// Run blocking file I/O off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}

/// Distinguishes temp files written in the same nanosecond by one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write to a uniquely named temp file in the same directory, fsync, then
/// rename over the target. The temp file is removed if any step fails.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();
    let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let tmp = path.with_file_name(format!("{file_name}.{nanos}.{pid}.{seq}.tmp"));

    let result = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
