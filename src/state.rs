/// Persisted record of the last addresses pushed to the registrar
///
/// The record is a small JSON document:
/// ```json
/// {
///   "ipv4": "198.51.100.7",
///   "ipv6": ""
/// }
/// ```
///
/// An empty string means the family is not tracked, not a zero address.
/// A missing file is a first run, never an error.
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// IPv4/IPv6 pair as last stored or as desired for this run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPair {
    #[serde(default)]
    pub ipv4: String,
    #[serde(default)]
    pub ipv6: String,
}

impl AddressPair {
    pub fn new(ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self {
            ipv4: ipv4.into(),
            ipv6: ipv6.into(),
        }
    }
}

/// Result of loading the store: distinguishes a first run from a read failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredRecord {
    Absent,
    Present(AddressPair),
}

impl StoredRecord {
    /// The stored pair, or the all-empty pair when nothing was stored yet.
    pub fn addresses(&self) -> AddressPair {
        match self {
            StoredRecord::Absent => AddressPair::default(),
            StoredRecord::Present(pair) => pair.clone(),
        }
    }
}

/// Get/set over the persisted address record
pub trait AddressStore {
    fn load(&self) -> Result<StoredRecord, StoreError>;

    /// Replace the stored record; readers never observe a partial write.
    fn save(&self, addresses: &AddressPair) -> Result<(), StoreError>;
}

/// JSON file store with write-to-temp-then-rename replacement
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Fill a temp file with `write`, then rename it over the record.
    /// The temp file is removed whenever any step fails.
    fn replace_with<F>(&self, write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut fs::File) -> io::Result<()>,
    {
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).map_err(|e| self.write_error(e))?;

        let result = write(&mut file).and_then(|()| {
            drop(file);
            fs::rename(&temp_path, &self.path)
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_error(e));
        }
        Ok(())
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl AddressStore for FileStore {
    fn load(&self) -> Result<StoredRecord, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("State file {} does not exist yet", self.path.display());
                return Ok(StoredRecord::Absent);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let pair: AddressPair =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(StoredRecord::Present(pair))
    }

    fn save(&self, addresses: &AddressPair) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
            }
        }

        let mut json = serde_json::to_string_pretty(addresses).map_err(StoreError::Serialize)?;
        json.push('\n');

        self.replace_with(|file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })?;

        log::debug!("Stored {:?} in {}", addresses, self.path.display());
        Ok(())
    }
}
