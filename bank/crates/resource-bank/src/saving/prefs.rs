use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SaveError;

/// String key/value storage, the local store saves go to by default.
pub trait Prefs {
    fn get_string(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set_string(&mut self, key: &str, value: String) -> Result<(), SaveError>;
    fn delete_key(&mut self, key: &str) -> Result<bool, SaveError>;

    fn has_key(&self, key: &str) -> Result<bool, SaveError> {
        Ok(self.get_string(key)?.is_some())
    }
}

/// In-process prefs. Clones share the same entries, so a caller can keep a
/// handle to what a bank has written.
#[derive(Clone, Debug, Default)]
pub struct MemoryPrefs {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Prefs for MemoryPrefs {
    fn get_string(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_string(&mut self, key: &str, value: String) -> Result<(), SaveError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn delete_key(&mut self, key: &str) -> Result<bool, SaveError> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }
}

#[derive(Serialize, Deserialize)]
struct PrefsFile {
    entries: BTreeMap<String, String>,
    digest: String,
}

fn entries_digest(entries: &BTreeMap<String, String>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"prefs");
    for (key, value) in entries {
        hasher.update((key.len() as u64).to_le_bytes());
        hasher.update(key.as_bytes());
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.finalize().into()
}

fn read_entries(path: &Path) -> Result<Option<BTreeMap<String, String>>, SaveError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let file: PrefsFile = serde_json::from_str(&raw)?;
    if file.digest != hex::encode(entries_digest(&file.entries)) {
        return Err(SaveError::Corrupt(format!(
            "digest mismatch in {}",
            path.display()
        )));
    }
    Ok(Some(file.entries))
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = PrefsFile {
        entries: entries.clone(),
        digest: hex::encode(entries_digest(entries)),
    };
    let json = serde_json::to_vec_pretty(&file)?;

    let tmp = path.with_extension("tmp");
    {
        let mut out = fs::File::create(&tmp)?;
        out.write_all(&json)?;
        out.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    tracing::trace!(path = %path.display(), bytes = json.len(), "prefs flushed");
    Ok(())
}

/// Prefs kept in a single JSON document on disk.
///
/// The document carries a SHA-256 digest of its entries; a file whose digest
/// does not match is refused. Every write re-reads the file, changes only its
/// own key and replaces the file via a temporary sibling and a rename, so
/// several handles on one path (one per resource family, say) keep each
/// other's entries. A file that went corrupt in between fails the write
/// instead of being overwritten.
///
/// Clones share one entry cache. Reads are served from that cache, which is
/// refreshed on open and on every write.
#[derive(Clone, Debug)]
pub struct FilePrefs {
    path: PathBuf,
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl FilePrefs {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let path = path.as_ref().to_path_buf();
        let entries = match read_entries(&path)? {
            Some(entries) => {
                tracing::debug!(path = %path.display(), keys = entries.len(), "prefs loaded");
                entries
            }
            None => BTreeMap::new(),
        };
        Ok(Self {
            path,
            entries: Rc::new(RefCell::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to what is on disk now and write the result back.
    /// Nothing is written when `change` returns false.
    fn update<F>(&self, change: F) -> Result<bool, SaveError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = read_entries(&self.path)?.unwrap_or_default();
        let changed = change(&mut entries);
        if changed {
            write_entries(&self.path, &entries)?;
        }
        *self.entries.borrow_mut() = entries;
        Ok(changed)
    }
}

impl Prefs for FilePrefs {
    fn get_string(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_string(&mut self, key: &str, value: String) -> Result<(), SaveError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
            true
        })?;
        Ok(())
    }

    fn delete_key(&mut self, key: &str) -> Result<bool, SaveError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
