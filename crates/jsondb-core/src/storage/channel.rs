//! Whole-file read/write channel
//!
//! A `FileChannel` owns one path. Every write replaces the entire file
//! using an atomic write (temp file in the same directory, sync, rename),
//! so readers never observe a partially written document.
//!
//! Reads and writes through the same channel are serialized by a lock held
//! for the duration of the operation. There is no locking across channels
//! or processes: two channels on the same path race, and the last rename wins.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{StorageError, StorageResult};

/// Mutually exclusive whole-file access to a single path
#[derive(Debug)]
pub struct FileChannel {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileChannel {
    /// Open a channel on an existing file
    ///
    /// Fails with [`StorageError::NotFound`] if nothing exists at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Self::bind(path)),
            Ok(_) => Err(StorageError::NotFound { path }),
            Err(e) => Err(StorageError::from_read(e, path)),
        }
    }

    /// Create a new empty file, including any missing parent directories
    ///
    /// Fails with [`StorageError::AlreadyExists`] if the file is already
    /// present. Parent directories created before a failed file creation
    /// are left in place.
    pub fn create(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            return Err(StorageError::AlreadyExists { path });
        }

        if let Some(parent) = non_empty_parent(&path) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        // create_new closes the gap between the exists() check and creation
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StorageError::from_write(e, path.clone()))?;

        debug!("Created file {:?}", path);
        Ok(Self::bind(path))
    }

    fn bind(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// The path this channel is bound to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the entire contents of the file with `contents`
    pub fn write(&self, contents: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        atomic_write(&self.path, contents.as_bytes())
    }

    /// Read the entire file as raw bytes
    ///
    /// Returns `None` when the file holds no content (zero bytes or only
    /// line breaks), so an empty file is distinguishable from content.
    /// Decoding is left to the caller.
    pub fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        let _guard = self.lock.lock();

        let contents =
            fs::read(&self.path).map_err(|e| StorageError::from_read(e, self.path.clone()))?;

        if contents.iter().all(|b| matches!(b, b'\n' | b'\r')) {
            return Ok(None);
        }

        Ok(Some(contents))
    }
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temp file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file over the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let dir = non_empty_parent(path).unwrap_or_else(|| Path::new("."));
    let to_err = |e| StorageError::from_write(e, path.to_path_buf());

    let mut temp = NamedTempFile::new_in(dir).map_err(to_err)?;
    temp.write_all(data).map_err(to_err)?;
    temp.as_file().sync_all().map_err(to_err)?;
    temp.persist(path).map_err(|e| to_err(e.error))?;

    debug!("Wrote {} bytes to {:?}", data.len(), path);
    Ok(())
}

/// `Path::parent` yields `""` for bare file names
fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileChannel::open(temp_dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_open_directory_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileChannel::open(temp_dir.path()).unwrap_err();

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("db.json");

        let channel = FileChannel::create(&nested).unwrap();

        assert!(nested.exists());
        assert_eq!(channel.path(), nested.as_path());
        assert_eq!(fs::read_to_string(&nested).unwrap(), "");
    }

    #[test]
    fn test_create_existing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        fs::write(&path, "{}").unwrap();

        let err = FileChannel::create(&path).unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists { .. }));
        // Existing content is untouched
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_write_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        let channel = FileChannel::create(&path).unwrap();

        channel.write("a much longer first version").unwrap();
        channel.write("short").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let channel = FileChannel::create(temp_dir.path().join("db.json")).unwrap();

        channel.write("one").unwrap();
        channel.write("two").unwrap();

        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_read_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("read_test.txt");
        fs::write(&path, "text of the read test file").unwrap();

        let channel = FileChannel::open(&path).unwrap();

        assert_eq!(
            channel.read().unwrap().as_deref(),
            Some(b"text of the read test file".as_slice())
        );
    }

    #[test]
    fn test_read_empty_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let channel = FileChannel::create(temp_dir.path().join("empty.json")).unwrap();

        assert_eq!(channel.read().unwrap(), None);

        channel.write("\n\n").unwrap();
        assert_eq!(channel.read().unwrap(), None);

        channel.write("\r\n").unwrap();
        assert_eq!(channel.read().unwrap(), None);
    }

    #[test]
    fn test_read_does_not_decode() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.json");
        fs::write(&path, b"{\"a\": \"\xff\xfe\"}").unwrap();

        let channel = FileChannel::open(&path).unwrap();

        assert_eq!(
            channel.read().unwrap().as_deref(),
            Some(b"{\"a\": \"\xff\xfe\"}".as_slice())
        );
    }

    #[test]
    fn test_read_after_file_removed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        let channel = FileChannel::create(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let err = channel.read().unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        let channel = Arc::new(FileChannel::create(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || {
                    let line = i.to_string().repeat(4096);
                    for _ in 0..10 {
                        channel.write(&line).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Whatever write landed last, it landed whole
        let contents = channel.read().unwrap().unwrap();
        assert_eq!(contents.len(), 4096);
        let first = contents[0];
        assert!(contents.iter().all(|&b| b == first));
    }
}
