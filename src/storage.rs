/*!
Durable client-side key/value storage.

This stands in for browser local storage: string keys, string values,
synchronous access. `FileStorage` keeps one file per key in a directory;
`MemStorage` keeps everything in a `HashMap` and is mostly for tests.
*/
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq)]
pub struct StorageError(String);

impl StorageError {
    /// Prepend some contextual `annotation` for the error.
    fn annotate(self, annotation: &str) -> Self {
        let s = format!("{}: {}", annotation, &self.0);
        Self(s)
    }

    pub fn display(&self) -> &str { &self.0 }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> StorageError {
        StorageError(format!("Storage I/O: {}", &e))
    }
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError("Storage key must not be empty.".to_owned()));
    }
    match key.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
        Some(c) => Err(StorageError(format!(
            "Storage key {:?} contains disallowed character {:?}.", key, c
        ))),
        None => Ok(()),
    }
}

pub trait Storage {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a key that isn't there is fine.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemStorage {
    map: HashMap<String, String>,
}

impl MemStorage {
    pub fn new() -> Self { Self::default() }
}

impl Storage for MemStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.map.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory doesn't have to exist yet; it gets created on the first
    /// `set()`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        log::trace!("FileStorage::new( {} ) called.", dir.display());
        Self { dir }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        log::trace!("FileStorage::get( {:?} ) called.", key);
        let path = self.path_for(key)?;

        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from(e)
                .annotate(&format!("Unable to read {}", path.display()))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        log::trace!("FileStorage::set( {:?}, [ {} bytes ] ) called.", key, value.len());
        let path = self.path_for(key)?;

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::from(e).annotate(&format!(
                "Unable to create storage directory {}", self.dir.display()
            )))?;
        std::fs::write(&path, value)
            .map_err(|e| StorageError::from(e)
                .annotate(&format!("Unable to write {}", path.display())))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        log::trace!("FileStorage::remove( {:?} ) called.", key);
        let path = self.path_for(key)?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from(e)
                .annotate(&format!("Unable to remove {}", path.display()))),
        }
    }
}
