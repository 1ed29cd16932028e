use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{
	error::ArchiveError,
	format::{FormatDescriptor, Padding},
};

/// Represents the null terminator for the names of entries.
pub const NULL_TERMINATOR: u8 = b'\0';

/// Represents the space character that ends space-padded names.
pub const SPACE: u8 = b' ';

/// Represents the number of entries reserved before any record has been read.
const INITIAL_CAPACITY: u32 = 4096;

/// Represents an entry.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Entry {
	/// The name of the entry, stripped of its padding.
	pub name: String,

	/// The absolute offset, in bytes, of the data of the entry within the archive.
	pub start: u32,

	/// The length, in bytes, of the entry.
	pub size: u32,
}

/// Reads `count` directory records from `inner`, which must be positioned at the first record.
///
/// Offsets are assigned in the order the records are stored, as the data is packed in that order;
/// only afterwards are the entries sorted by name for lookup. Entries with equal names keep their stored order.
pub fn build_index<R>(inner: &mut R, count: u32, descriptor: &FormatDescriptor) -> Result<Vec<Entry>, ArchiveError>
where
	R: Read,
{
	let mut entries: Vec<Entry> = Vec::new();

	// The count is untrusted until the records are actually read, so only reserve a bounded amount up front.

	entries.try_reserve_exact(count.min(INITIAL_CAPACITY) as usize).map_err(|_| ArchiveError::OutOfMemory)?;

	// The data of the first entry immediately follows the directory table.

	let mut pos = u64::from(descriptor.header_size()) + u64::from(count) * u64::from(descriptor.entry_size());
	let mut buf = vec![0; descriptor.name_size];

	for _ in 0..count {
		// Read the properties of the entry.

		inner.read_exact(&mut buf)?;

		let name = to_name(&buf, descriptor.padding);
		let size = inner.read_u32::<LittleEndian>()?;
		let start = u32::try_from(pos).map_err(|_| ArchiveError::Overflow)?;

		entries.try_reserve(1).map_err(|_| ArchiveError::OutOfMemory)?;
		entries.push(Entry {
			name,
			start,
			size,
		});

		pos += u64::from(size);
	}

	entries.sort_by(|a, b| descriptor.compare(&a.name, &b.name));

	Ok(entries)
}

fn to_name(buf: &[u8], padding: Padding) -> String {
	// Determine the position of the terminator and build a string from it.

	let pos = buf.iter().position(|&b| b == NULL_TERMINATOR || (padding == Padding::Space && b == SPACE)).unwrap_or(buf.len());

	buf.iter().map(|&b| char::from(b)).take(pos).collect()
}
