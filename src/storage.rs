use crate::error::{Error, Result};
use crate::model::CalendarData;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the calendar blob lives between sessions.
///
/// `load` never fails: a missing or unreadable blob is an empty calendar.
/// `save` reports failures, but callers treat them as best-effort.
pub trait DurableStore: Send + Sync {
    fn load(&self) -> CalendarData;
    fn save(&self, data: &CalendarData) -> Result<()>;
}

/// Single YAML file holding the whole calendar.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable calendar file is copied before it can be overwritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    fn read(&self) -> Result<CalendarData> {
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(CalendarData::new());
        }
        Ok(serde_yaml::from_str(&raw)?)
    }
}

impl DurableStore for FileStore {
    fn load(&self) -> CalendarData {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no calendar file yet, starting empty");
            return CalendarData::new();
        }
        match self.read() {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "calendar file unreadable, starting empty");
                let backup = self.backup_path();
                if let Err(copy_err) = fs::copy(&self.path, &backup) {
                    tracing::warn!(path = %backup.display(), error = %copy_err, "could not back up unreadable calendar");
                }
                CalendarData::new()
            }
        }
    }

    fn save(&self, data: &CalendarData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_yaml::to_string(data)?;
        fs::write(&self.path, serialized)?;
        tracing::trace!(path = %self.path.display(), "calendar saved");
        Ok(())
    }
}

/// Default location of the calendar file in the platform data directory.
pub fn default_data_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "daybook")
        .ok_or_else(|| Error::Config("locating data directory".into()))?;
    Ok(dirs.data_dir().join("calendar.yml"))
}

/// In-process store for embedding and tests. Keeps the serialized blob the
/// same way a file would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    blob: Option<String>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::default();
        store.lock().blob = Some(blob.into());
        store
    }

    /// Makes every following `save` fail, as a full or unavailable store would.
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    pub fn blob(&self) -> Option<String> {
        self.lock().blob.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // a poisoned lock still holds a consistent blob
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DurableStore for MemoryStore {
    fn load(&self) -> CalendarData {
        let state = self.lock();
        match state.blob.as_deref().map(serde_yaml::from_str::<CalendarData>) {
            Some(Ok(data)) => data,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "stored calendar unreadable, starting empty");
                CalendarData::new()
            }
            None => CalendarData::new(),
        }
    }

    fn save(&self, data: &CalendarData) -> Result<()> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "storage quota exceeded",
            )));
        }
        state.blob = Some(serde_yaml::to_string(data)?);
        state.saves += 1;
        Ok(())
    }
}
