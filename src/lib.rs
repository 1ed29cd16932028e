//! Library for reading the flat archives used by BUILD engine games (`GRP` groupfiles) and Descent II (`MVL` movie libraries).
//!
//! Both formats store a signature, an entry count and a table of fixed-size `(name, size)` records, followed by the
//! uncompressed data of every entry. An [`Archive`] reads that table once, and entries are then looked up by name and
//! opened for reading as independent [`OpenEntry`] handles.

use std::path::Path;

/// Contains the opened archive and its queries.
pub mod archive;

/// Contains types for errors.
pub mod error;

/// Contains the layouts of the supported formats and the logic for recognizing them.
pub mod format;

/// Contains the logic for reading directory tables.
pub mod index;

/// Contains the sources that archives are read from.
pub mod platform;

/// Contains types and the accompanying logic for reading entries.
pub mod read;

pub use archive::Archive;
pub use error::ArchiveError;
pub use format::{ArchiveInfo, Format, FormatDescriptor, Mode};
pub use index::Entry;
pub use platform::{MemoryPlatform, NativePlatform, Platform};
pub use read::OpenEntry;

/// Attempts to open the archive at `path` from the native filesystem, detecting its format.
///
/// If the open is successful, an `Archive` is returned which may be inspected for the contents of the archive.
/// If the open is unsuccessful, an `ArchiveError` is returned.
pub fn open(path: impl AsRef<Path>) -> Result<Archive, ArchiveError> {
	let path = path.as_ref();

	Format::detect(&NativePlatform, path)?.open(NativePlatform, path)
}

/// Returns whether the file at `path` on the native filesystem is an archive of any supported format.
pub fn probe(path: impl AsRef<Path>) -> bool {
	Format::detect(&NativePlatform, path.as_ref()).is_ok()
}
