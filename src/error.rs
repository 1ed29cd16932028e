use std::io;

use thiserror::Error;

/// Represents an error raised while opening or reading an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
	/// Indicates that the signature did not match the expected format.
	#[error("unsupported archive")]
	UnsupportedArchive,

	/// Indicates that the header or directory table ended early.
	#[error("archive is truncated")]
	Truncated,

	/// Indicates that the directory table could not be allocated.
	#[error("out of memory")]
	OutOfMemory,

	/// Indicates that the archive was requested for writing.
	#[error("archive is read-only")]
	ReadOnlyArchive,

	/// Indicates that the operation is not available on a read-only archive.
	#[error("operation not supported")]
	NotSupported,

	/// Indicates that no entry exists with the requested name.
	#[error("no such file")]
	NoSuchFile,

	/// Indicates that a directory other than the root was requested.
	#[error("not a directory")]
	NotADirectory,

	/// Indicates that an argument was out of its valid domain.
	#[error("invalid argument")]
	InvalidArgument,

	/// Indicates an attempt to seek at or beyond the end of an entry.
	#[error("past end of file")]
	PastEndOfFile,

	/// Indicates that the entry offsets do not fit within 32 bits.
	#[error("directory table overflows the addressable range")]
	Overflow,

	/// Indicates that a generic I/O error occurred.
	#[error("input/output error [{0}]")]
	Io(io::Error),
}

impl From<io::Error> for ArchiveError {
	fn from(value: io::Error) -> Self {
		match value.kind() {
			io::ErrorKind::UnexpectedEof => Self::Truncated,
			_ => Self::Io(value),
		}
	}
}
