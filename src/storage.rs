use thiserror::Error;

/// Largest byte offset a log file may reach before rotation.
///
/// FAT16/FAT32 media cap a single file at 4 GiB - 1; crossing it corrupts
/// the write on most card controllers, so the logger rotates first.
pub const MAX_FILE_SIZE: u64 = 4_294_967_295;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("could not create directory")]
    Directory,
    #[error("could not create file")]
    Create,
    #[error("write failed")]
    Write,
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("sync to media failed")]
    Sync,
    #[error("close failed")]
    Close,
}

/// Block-oriented persistent storage service (SD card, eMMC, ...).
///
/// The datalogger consumes this as an external capability; implementations
/// live with the board support code, test suites supply in-memory fakes.
pub trait StorageMedium {
    type File: StorageFile;

    /// Reports whether a file or directory exists at `path`.
    fn exists(&mut self, path: &str) -> bool;

    /// Creates a directory at `path`.
    fn create_dir(&mut self, path: &str) -> Result<(), StorageError>;

    /// Opens `path` for writing, creating it if absent.
    fn create(&mut self, path: &str) -> Result<Self::File, StorageError>;
}

/// An open, append-only file handle on a [`StorageMedium`].
pub trait StorageFile {
    /// Writes `data`, returning the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, StorageError>;

    /// Forces buffered data onto the media.
    fn sync(&mut self) -> Result<(), StorageError>;

    /// Current write position in bytes from the start of the file.
    fn position(&self) -> u64;

    /// Closes the handle, consuming it.
    fn close(self) -> Result<(), StorageError>;
}
