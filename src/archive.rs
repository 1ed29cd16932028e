use std::{
	cmp::Ordering,
	io::{self, Seek},
	path::{Path, PathBuf},
	time::SystemTime,
};

use tracing::{debug, trace, warn};

use crate::{
	error::ArchiveError,
	format::{FormatDescriptor, Mode},
	index::{self, Entry},
	platform::{NativePlatform, Platform},
	read::OpenEntry,
};

/// Represents the maximum length of a name that can be looked up.
pub const MAX_NAME_LENGTH: usize = 12;

/// Represents the maximum length of the extension of a name that can be looked up.
pub const MAX_EXTENSION_LENGTH: usize = 3;

/// Represents the separator that can never appear in the name of an entry.
pub const SEPARATOR: char = '/';

/// Represents an archive.
///
/// The directory is read once when the archive is loaded and never changes afterwards.
/// Entries are kept sorted by name, according to the comparison rule of the format.
#[derive(Debug)]
pub struct Archive<P = NativePlatform> {
	platform: P,
	path: PathBuf,
	modified: SystemTime,
	descriptor: &'static FormatDescriptor,

	entries: Vec<Entry>,
}

impl<P> Archive<P>
where
	P: Platform,
{
	/// Attempts to load the archive at `path` with the layout described by `descriptor`.
	///
	/// The handle used to read the directory is released before returning, whether or not loading succeeds.
	pub fn load(platform: P, path: impl AsRef<Path>, descriptor: &'static FormatDescriptor, mode: Mode) -> Result<Self, ArchiveError> {
		let path = path.as_ref();

		// Read the directory, dropping the handle as soon as it has been read.

		let entries = {
			let (mut inner, count) = descriptor.open_raw(&platform, path, mode)?;

			index::build_index(&mut inner, count, descriptor)?
		};

		let modified = platform.last_modified(path)?;

		report_unreachable(&entries, descriptor);

		debug!("Loaded {} archive {} with {} entries", descriptor.info.extension, path.display(), entries.len());

		Ok(Self {
			platform,
			path: path.to_path_buf(),
			modified,
			descriptor,
			entries,
		})
	}
}

impl<P> Archive<P> {
	/// Returns the path of the archive.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns the layout of the archive.
	pub fn descriptor(&self) -> &'static FormatDescriptor {
		self.descriptor
	}

	/// Returns the number of entries in the archive.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns if the archive is void of any entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the entry at the specified index, if it exists.
	pub fn get(&self, index: usize) -> Option<&Entry> {
		self.entries.get(index)
	}

	/// Returns whether the entry at the specified index is hidden by an earlier entry of the same name.
	///
	/// Shadowed entries are never returned by `lookup`, but can still be opened with `open_at`.
	pub fn is_shadowed(&self, index: usize) -> bool {
		is_shadowed(&self.entries, index, self.descriptor)
	}

	/// Returns an iterator over each of the entries in the archive, sorted by name.
	pub fn iter(&self) -> impl Iterator<Item = &Entry> {
		self.entries.iter()
	}

	/// Returns the entry with the specified `name`.
	///
	/// Names that are too long, that contain a separator or whose extension is longer than three characters
	/// are rejected without searching. If the archive holds several entries with the same name, the one stored first wins.
	pub fn lookup(&self, name: &str) -> Result<&Entry, ArchiveError> {
		if !is_addressable(name) {
			return Err(ArchiveError::NoSuchFile);
		}

		// Find the first entry not ordered before the name.

		let index = self.entries.partition_point(|entry| self.descriptor.compare(&entry.name, name) == Ordering::Less);

		self.entries.get(index).filter(|entry| self.descriptor.compare(&entry.name, name) == Ordering::Equal).ok_or(ArchiveError::NoSuchFile)
	}

	/// Returns whether an entry with the specified `name` exists.
	pub fn exists(&self, name: &str) -> bool {
		self.lookup(name).is_ok()
	}

	/// Returns whether `name` is a directory, which is never the case.
	pub fn is_directory(&self, _name: &str) -> bool {
		false
	}

	/// Returns whether `name` is a symbolic link, which is never the case.
	pub fn is_symlink(&self, _name: &str) -> bool {
		false
	}

	/// Returns the names of the entries in the directory `dir`, sorted by name.
	///
	/// Archives have no subdirectories, so only the root (an empty name) can be enumerated.
	pub fn enumerate(&self, dir: &str) -> Result<impl Iterator<Item = &str>, ArchiveError> {
		if !dir.is_empty() {
			return Err(ArchiveError::NotADirectory);
		}

		Ok(self.entries.iter().map(|entry| entry.name.as_str()))
	}

	/// Returns the modification time of the entry with the specified `name`.
	///
	/// Entries carry no time of their own, so this is the modification time of the archive itself.
	pub fn modified(&self, name: &str) -> Result<SystemTime, ArchiveError> {
		self.lookup(name).map(|_| self.modified)
	}

	/// Always fails, as archives are read-only.
	pub fn open_write(&self, _name: &str) -> Result<(), ArchiveError> {
		Err(ArchiveError::NotSupported)
	}

	/// Always fails, as archives are read-only.
	pub fn open_append(&self, _name: &str) -> Result<(), ArchiveError> {
		Err(ArchiveError::NotSupported)
	}

	/// Always fails, as archives are read-only.
	pub fn remove(&self, _name: &str) -> Result<(), ArchiveError> {
		Err(ArchiveError::NotSupported)
	}

	/// Always fails, as archives have no directories.
	pub fn mkdir(&self, _name: &str) -> Result<(), ArchiveError> {
		Err(ArchiveError::NotSupported)
	}
}

impl<P> Archive<P>
where
	P: Platform,
{
	/// Opens the entry with the specified `name` for reading.
	pub fn open(&self, name: &str) -> Result<OpenEntry<'_, P::Handle>, ArchiveError> {
		let entry = self.lookup(name)?;

		self.open_entry(entry)
	}

	/// Opens the entry at the specified index for reading, bypassing name lookup.
	pub fn open_at(&self, index: usize) -> Result<OpenEntry<'_, P::Handle>, ArchiveError> {
		let entry = self.entries.get(index).ok_or(ArchiveError::NoSuchFile)?;

		self.open_entry(entry)
	}

	fn open_entry<'a>(&'a self, entry: &'a Entry) -> Result<OpenEntry<'a, P::Handle>, ArchiveError> {
		// Open an independent handle and move it to the start of the entry.

		let mut inner = self.platform.open_read(&self.path)?;

		inner.seek(io::SeekFrom::Start(u64::from(entry.start)))?;

		trace!("Opened entry {} at offset {} of {}", entry.name, entry.start, self.path.display());

		Ok(OpenEntry::new(inner, entry))
	}
}

/// Returns whether `name` could belong to an entry, judging by the limits of the name field.
fn is_addressable(name: &str) -> bool {
	let len = name.chars().count();
	let ext = name.split_once('.').map_or(0, |(_, ext)| ext.chars().count());

	len <= MAX_NAME_LENGTH && ext <= MAX_EXTENSION_LENGTH && !name.contains(SEPARATOR)
}

/// Warns about entries that can be enumerated but never found by name.
fn report_unreachable(entries: &[Entry], descriptor: &FormatDescriptor) {
	for entry in entries.iter().filter(|entry| !is_addressable(&entry.name)) {
		warn!("Entry {} cannot be looked up by name", entry.name);
	}

	for index in (0..entries.len()).filter(|&index| is_shadowed(entries, index, descriptor)) {
		warn!("Entry {} is shadowed by an earlier entry of the same name", entries[index].name);
	}
}

/// Returns whether the entry at `index` follows an entry of the same name in the sorted `entries`.
fn is_shadowed(entries: &[Entry], index: usize, descriptor: &FormatDescriptor) -> bool {
	match index.checked_sub(1).and_then(|prev| entries.get(prev)).zip(entries.get(index)) {
		Some((prev, entry)) => descriptor.compare(&prev.name, &entry.name) == Ordering::Equal,
		None => false,
	}
}
