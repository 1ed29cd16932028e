use std::{
	cmp::Ordering,
	fmt::{self, Display},
	io::{self, Read},
	path::Path,
	str::FromStr,
};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, trace};

use crate::{archive::Archive, error::ArchiveError, platform::Platform};

/// Represents the number of bytes of the entry count following the signature.
pub const COUNT_SIZE: u32 = 4;

/// Represents the number of bytes of the size field of each directory record.
pub const SIZE_FIELD_SIZE: u32 = 4;

/// Represents the BUILD engine groupfile format.
pub static GRP: FormatDescriptor = FormatDescriptor {
	info: ArchiveInfo {
		extension: "GRP",
		description: "Build engine Groupfile format",
	},
	signature: b"KenSilverman",
	name_size: 12,
	padding: Padding::Space,
	comparison: Comparison::CaseSensitive,
};

/// Represents the Descent II movie library format.
pub static MVL: FormatDescriptor = FormatDescriptor {
	info: ArchiveInfo {
		extension: "MVL",
		description: "Descent II Movielib format",
	},
	signature: b"DMVL",
	name_size: 13,
	padding: Padding::Nul,
	comparison: Comparison::CaseInsensitive,
};

/// Represents how unused bytes of a name field are filled.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Padding {
	/// The name ends at the first space (or null terminator).
	Space,

	/// The name ends at the first null terminator.
	Nul,
}

/// Represents how entry names are ordered and matched.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Comparison {
	/// Names are compared byte for byte.
	CaseSensitive,

	/// Names are compared after folding ASCII letters to lowercase.
	CaseInsensitive,
}

/// Represents the access requested when opening an archive.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Mode {
	/// Indicates read-only access.
	Read,

	/// Indicates write access, which no format supports.
	Write,
}

/// Represents descriptive information about an archive format.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ArchiveInfo {
	/// The conventional file extension, without the leading dot.
	pub extension: &'static str,

	/// A human-readable description of the format.
	pub description: &'static str,
}

/// Represents the binary layout and naming rules of a flat archive format.
///
/// Every supported format shares the same structure: a signature, a little-endian entry count,
/// a table of fixed-size `(name, size)` records and finally the data of each entry, packed in table order.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct FormatDescriptor {
	/// Descriptive information about the format.
	pub info: ArchiveInfo,

	/// The bytes every archive of this format begins with.
	pub signature: &'static [u8],

	/// The width, in bytes, of the name field of each record.
	pub name_size: usize,

	/// How unused bytes of the name field are filled.
	pub padding: Padding,

	/// How names are ordered and matched.
	pub comparison: Comparison,
}

/// Represents a supported archive format.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Format {
	/// BUILD engine groupfiles (`.grp`).
	Grp,

	/// Descent II movie libraries (`.mvl`).
	Mvl,
}

impl FormatDescriptor {
	/// Returns the number of bytes preceding the directory table.
	pub const fn header_size(&self) -> u32 {
		self.signature.len() as u32 + COUNT_SIZE
	}

	/// Returns the number of bytes of a single directory record.
	pub const fn entry_size(&self) -> u32 {
		self.name_size as u32 + SIZE_FIELD_SIZE
	}

	/// Compares two names according to the comparison rule of the format.
	pub fn compare(&self, a: &str, b: &str) -> Ordering {
		match self.comparison {
			Comparison::CaseSensitive => a.as_bytes().cmp(b.as_bytes()),
			Comparison::CaseInsensitive => a.bytes().map(|c| c.to_ascii_lowercase()).cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
		}
	}

	/// Opens the file at `path`, validates its signature and reads its entry count.
	///
	/// On success the returned handle is positioned at the first directory record.
	pub fn open_raw<P>(&self, platform: &P, path: &Path, mode: Mode) -> Result<(P::Handle, u32), ArchiveError>
	where
		P: Platform,
	{
		if mode == Mode::Write {
			return Err(ArchiveError::ReadOnlyArchive);
		}

		let mut handle = platform.open_read(path)?;

		// Check that the signature is the one expected for the format.

		let mut signature = vec![0; self.signature.len()];

		handle.read_exact(&mut signature)?;

		if signature != self.signature {
			return Err(ArchiveError::UnsupportedArchive);
		}

		// Read the number of entries in the archive.

		let count = handle.read_u32::<LittleEndian>()?;

		Ok((handle, count))
	}

	/// Returns whether the file at `path` is an archive of this format that could be opened with `mode`.
	pub fn probe<P>(&self, platform: &P, path: &Path, mode: Mode) -> bool
	where
		P: Platform,
	{
		match self.open_raw(platform, path, mode) {
			Ok(_) => true,
			Err(err) => {
				trace!("{} is not a {} archive: {}", path.display(), self.info.extension, err);

				false
			}
		}
	}
}

impl Format {
	/// Represents every supported format, in the order they are tried during detection.
	pub const ALL: [Format; 2] = [Format::Grp, Format::Mvl];

	/// Returns the layout of the format.
	pub fn descriptor(self) -> &'static FormatDescriptor {
		match self {
			Self::Grp => &GRP,
			Self::Mvl => &MVL,
		}
	}

	/// Returns descriptive information about the format.
	pub fn info(self) -> &'static ArchiveInfo {
		&self.descriptor().info
	}

	/// Returns whether the file at `path` is an archive of this format.
	pub fn probe<P>(self, platform: &P, path: &Path) -> bool
	where
		P: Platform,
	{
		self.descriptor().probe(platform, path, Mode::Read)
	}

	/// Attempts to open the file at `path` as an archive of this format.
	pub fn open<P>(self, platform: P, path: impl AsRef<Path>) -> Result<Archive<P>, ArchiveError>
	where
		P: Platform,
	{
		Archive::load(platform, path, self.descriptor(), Mode::Read)
	}

	/// Determines the format of the archive at `path`.
	///
	/// Formats whose extension matches that of `path` are tried first, followed by all remaining formats.
	pub fn detect<P>(platform: &P, path: &Path) -> Result<Format, ArchiveError>
	where
		P: Platform,
	{
		platform.last_modified(path).map_err(|err| match err.kind() {
			io::ErrorKind::NotFound => ArchiveError::NoSuchFile,
			_ => err.into(),
		})?;

		let ext = path.extension().and_then(|ext| ext.to_str());

		let (matching, others): (Vec<Format>, Vec<Format>) = Self::ALL.into_iter().partition(|format| ext.is_some_and(|ext| ext.eq_ignore_ascii_case(format.info().extension)));

		let format = matching.into_iter().chain(others).find(|format| format.probe(platform, path)).ok_or(ArchiveError::UnsupportedArchive)?;

		debug!("Detected {} archive at {}", format.info().extension, path.display());

		Ok(format)
	}
}

impl Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.info().extension.to_ascii_lowercase())
	}
}

impl FromStr for Format {
	type Err = ArchiveError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.into_iter().find(|format| format.info().extension.eq_ignore_ascii_case(s)).ok_or(ArchiveError::UnsupportedArchive)
	}
}
