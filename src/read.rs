use std::io::{self, Read, Seek};

use crate::{error::ArchiveError, index::Entry};

/// Represents an entry opened for reading.
///
/// Each opened entry owns an independent handle on the archive, so any number of entries
/// (including the same one several times) can be read at once without sharing a cursor.
#[derive(Debug)]
pub struct OpenEntry<'a, H> {
	inner: H,
	entry: &'a Entry,

	pos: u32,
}

impl<'a, H> OpenEntry<'a, H>
where
	H: Read + Seek,
{
	/// Creates a new opened entry for `entry` from `inner`, which must already be positioned at the start of the entry.
	pub(crate) fn new(inner: H, entry: &'a Entry) -> Self {
		Self {
			inner,
			entry,
			pos: 0,
		}
	}

	/// Returns the entry being read.
	pub fn entry(&self) -> &'a Entry {
		self.entry
	}

	/// Returns the current position within the entry.
	pub fn tell(&self) -> u32 {
		self.pos
	}

	/// Returns whether the end of the entry has been reached.
	pub fn eof(&self) -> bool {
		self.pos >= self.entry.size
	}

	/// Returns the length of the entry.
	pub fn len(&self) -> u32 {
		self.entry.size
	}

	/// Returns if the entry is void of any data.
	pub fn is_empty(&self) -> bool {
		self.entry.size == 0
	}

	/// Moves to the specified `offset` within the entry.
	///
	/// Seeking to the end of the entry or beyond is rejected. If the underlying handle cannot be moved,
	/// the position is left unchanged.
	pub fn seek(&mut self, offset: i64) -> Result<(), ArchiveError> {
		if offset < 0 {
			return Err(ArchiveError::InvalidArgument);
		}

		let offset = u32::try_from(offset).map_err(|_| ArchiveError::PastEndOfFile)?;

		if offset >= self.entry.size {
			return Err(ArchiveError::PastEndOfFile);
		}

		self.inner.seek(io::SeekFrom::Start(u64::from(self.entry.start) + u64::from(offset)))?;
		self.pos = offset;

		Ok(())
	}

	/// Reads up to `count` objects of `size` bytes each into `buf`, returning the number of whole objects read.
	///
	/// The request is limited to the whole objects remaining in the entry. Fewer objects are returned
	/// only if the archive itself ends early.
	pub fn read_objects(&mut self, buf: &mut [u8], size: usize, count: usize) -> Result<usize, ArchiveError> {
		if size == 0 {
			return Ok(0);
		}

		let count = count.min(self.remaining() / size);
		let len = count.checked_mul(size).filter(|&len| len <= buf.len()).ok_or(ArchiveError::InvalidArgument)?;

		let mut off = 0;

		while off < len {
			match self.read(&mut buf[off..len]) {
				Ok(0) => break,
				Ok(num) => off += num,
				Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
				Err(err) => return Err(err.into()),
			}
		}

		Ok(off / size)
	}

	/// Always fails, as archives are read-only.
	pub fn write(&mut self, _buf: &[u8]) -> Result<usize, ArchiveError> {
		Err(ArchiveError::NotSupported)
	}

	/// Closes the entry, releasing the underlying handle.
	pub fn close(self) -> Result<(), ArchiveError> {
		drop(self.inner);

		Ok(())
	}

	fn remaining(&self) -> usize {
		(self.entry.size - self.pos.min(self.entry.size)) as usize
	}
}

impl<'a, H> Read for OpenEntry<'a, H>
where
	H: Read + Seek,
{
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		// Check if we have already reached the end of the entry.

		let len = self.remaining().min(buf.len());

		if len == 0 {
			return Ok(0);
		}

		// Forbid reading beyond the entry, which is immediately followed by the next one.

		let off = self.inner.read(&mut buf[..len])?;

		self.pos += off as u32;

		Ok(off)
	}
}
