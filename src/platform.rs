use std::{
	collections::HashMap,
	fs::{self, File},
	io::{self, BufReader, Cursor, Read, Seek},
	path::{Path, PathBuf},
	sync::Arc,
	time::SystemTime,
};

/// Represents the source of raw archive bytes.
///
/// Every call to `open_read` must produce an independent handle with its own cursor, as each opened entry owns one.
pub trait Platform {
	/// The type of handle produced for reading.
	type Handle: Read + Seek;

	/// Opens the file at the specified `path` for reading, positioned at its start.
	fn open_read(&self, path: &Path) -> io::Result<Self::Handle>;

	/// Returns the last modification time of the file at the specified `path`.
	fn last_modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Represents the native filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform;

/// Represents a set of files held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryPlatform {
	files: HashMap<PathBuf, Arc<[u8]>>,
	modified: SystemTime,
}

impl Platform for NativePlatform {
	type Handle = BufReader<File>;

	fn open_read(&self, path: &Path) -> io::Result<Self::Handle> {
		File::open(path).map(BufReader::new)
	}

	fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
		fs::metadata(path)?.modified()
	}
}

impl MemoryPlatform {
	/// Creates an empty in-memory platform, reporting `modified` as the time of every file.
	pub fn new(modified: SystemTime) -> Self {
		Self {
			files: HashMap::new(),
			modified,
		}
	}

	/// Registers the specified `bytes` under `path`, replacing any existing file.
	pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Arc<[u8]>>) {
		self.files.insert(path.into(), bytes.into());
	}
}

impl Default for MemoryPlatform {
	fn default() -> Self {
		Self::new(SystemTime::UNIX_EPOCH)
	}
}

impl Platform for MemoryPlatform {
	type Handle = Cursor<Arc<[u8]>>;

	fn open_read(&self, path: &Path) -> io::Result<Self::Handle> {
		self.files.get(path).map(|bytes| Cursor::new(Arc::clone(bytes))).ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
	}

	fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
		if self.files.contains_key(path) {
			Ok(self.modified)
		} else {
			Err(io::ErrorKind::NotFound.into())
		}
	}
}

impl<P> Platform for &P
where
	P: Platform,
{
	type Handle = P::Handle;

	fn open_read(&self, path: &Path) -> io::Result<Self::Handle> {
		(**self).open_read(path)
	}

	fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
		(**self).last_modified(path)
	}
}
