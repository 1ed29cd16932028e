use std::{
	fs,
	io::{Read, Write},
	path::PathBuf,
};

use byteorder::{LittleEndian, WriteBytesExt};
use groupfile::{Archive, ArchiveError, Format, Mode, NativePlatform};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn grp_scenario() -> Vec<u8> {
	let mut buf = Vec::new();

	buf.write_all(b"KenSilverman").expect("failed to write signature");
	buf.write_u32::<LittleEndian>(2).expect("failed to write count");
	buf.write_all(b"FILE1       ").expect("failed to write first name");
	buf.write_u32::<LittleEndian>(5).expect("failed to write first size");
	buf.write_all(b"FILE2       ").expect("failed to write second name");
	buf.write_u32::<LittleEndian>(3).expect("failed to write second size");
	buf.write_all(b"hello").expect("failed to write first data");
	buf.write_all(b"abc").expect("failed to write second data");

	buf
}

fn mvl_scenario() -> Vec<u8> {
	let mut buf = Vec::new();

	buf.write_all(b"DMVL").expect("failed to write signature");
	buf.write_u32::<LittleEndian>(2).expect("failed to write count");
	buf.write_all(b"outro.mve\0\0\0\0").expect("failed to write first name");
	buf.write_u32::<LittleEndian>(4).expect("failed to write first size");
	buf.write_all(b"INTRO.MVE\0\0\0\0").expect("failed to write second name");
	buf.write_u32::<LittleEndian>(2).expect("failed to write second size");
	buf.write_all(b"OUTR").expect("failed to write first data");
	buf.write_all(b"IN").expect("failed to write second data");

	buf
}

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
	let path = dir.path().join(name);

	fs::write(&path, bytes).expect("failed to write archive");

	path
}

fn read_all(archive: &Archive, name: &str) -> Vec<u8> {
	let mut buf = Vec::new();

	archive.open(name).expect("failed to open entry").read_to_end(&mut buf).expect("failed to read entry");

	buf
}

#[test]
fn test_grp_scenario() {
	let dir = TempDir::new().expect("failed to create directory");
	let path = write(&dir, "duke3d.grp", &grp_scenario());

	let archive = Format::Grp.open(NativePlatform, &path).expect("failed to open archive");

	let names: Vec<&str> = archive.enumerate("").expect("failed to enumerate").collect();

	assert_eq!(names, vec!["FILE1", "FILE2"]);
	assert_eq!(archive.lookup("FILE1").expect("expected first entry").start, 48);
	assert_eq!(archive.lookup("FILE2").expect("expected second entry").start, 53);

	let mut open = archive.open("FILE1").expect("failed to open entry");
	let mut buf = [0; 16];
	let num = open.read(&mut buf).expect("failed to read entry");

	assert_eq!(&buf[..num], b"hello");
	assert!(open.eof());
	assert!(matches!(open.seek(5), Err(ArchiveError::PastEndOfFile)));

	open.close().expect("failed to close entry");

	assert_eq!(read_all(&archive, "FILE2"), b"abc");
	assert!(matches!(archive.enumerate("sub"), Err(ArchiveError::NotADirectory)));
}

#[test]
fn test_mvl_scenario() {
	let dir = TempDir::new().expect("failed to create directory");
	let path = write(&dir, "movies.mvl", &mvl_scenario());

	let archive = groupfile::open(&path).expect("failed to open archive");

	assert_eq!(archive.descriptor().info.extension, "MVL");

	let names: Vec<&str> = archive.enumerate("").expect("failed to enumerate").collect();

	assert_eq!(names, vec!["INTRO.MVE", "outro.mve"]);
	assert_eq!(read_all(&archive, "intro.mve"), b"IN");
	assert_eq!(read_all(&archive, "OUTRO.MVE"), b"OUTR");

	let modified = fs::metadata(&path).and_then(|meta| meta.modified()).expect("failed to read modification time");

	assert_eq!(archive.modified("Intro.mve").expect("expected modification time"), modified);
}

#[test]
fn test_signature_rejected() {
	let dir = TempDir::new().expect("failed to create directory");

	let mut bytes = grp_scenario();

	bytes[..12].copy_from_slice(b"KenSilverMAN");

	let grp = write(&dir, "bad.grp", &bytes);
	let mvl = write(&dir, "bad.mvl", b"DMVX\0\0\0\0");

	assert!(!Format::Grp.probe(&NativePlatform, &grp));
	assert!(!Format::Mvl.probe(&NativePlatform, &mvl));

	assert!(matches!(Format::Grp.open(NativePlatform, &grp), Err(ArchiveError::UnsupportedArchive)));
	assert!(matches!(Format::Mvl.open(NativePlatform, &mvl), Err(ArchiveError::UnsupportedArchive)));
	assert!(matches!(groupfile::open(&grp), Err(ArchiveError::UnsupportedArchive)));
}

#[test]
fn test_truncated_rejected() {
	let dir = TempDir::new().expect("failed to create directory");

	let bytes = grp_scenario();
	let path = write(&dir, "short.grp", &bytes[..40]);

	assert!(Format::Grp.probe(&NativePlatform, &path));
	assert!(matches!(Format::Grp.open(NativePlatform, &path), Err(ArchiveError::Truncated)));
}

#[test]
fn test_detect_ignores_extension() {
	let dir = TempDir::new().expect("failed to create directory");
	let path = write(&dir, "renamed.dat", &grp_scenario());

	assert!(groupfile::probe(&path));
	assert_eq!(Format::detect(&NativePlatform, &path).expect("failed to detect format"), Format::Grp);
	assert!(matches!(groupfile::open(dir.path().join("missing.grp")), Err(ArchiveError::NoSuchFile)));
}

#[test]
fn test_write_rejected_unmodified() {
	let dir = TempDir::new().expect("failed to create directory");

	for (name, bytes) in [("write.grp", grp_scenario()), ("write.mvl", mvl_scenario())] {
		let path = write(&dir, name, &bytes);
		let archive = groupfile::open(&path).expect("failed to open archive");

		assert!(matches!(archive.open_write("FILE1"), Err(ArchiveError::NotSupported)));
		assert!(matches!(archive.open_write("ANY.MVE"), Err(ArchiveError::NotSupported)));
		assert!(matches!(Archive::load(NativePlatform, &path, archive.descriptor(), Mode::Write), Err(ArchiveError::ReadOnlyArchive)));

		assert_eq!(fs::read(&path).expect("failed to read archive back"), bytes);
	}
}

#[test]
fn test_read_past_size() {
	let dir = TempDir::new().expect("failed to create directory");
	let path = write(&dir, "clamp.grp", &grp_scenario());

	let archive = groupfile::open(&path).expect("failed to open archive");

	for entry in archive.iter() {
		let mut open = archive.open(&entry.name).expect("failed to open entry");
		let mut buf = vec![0; entry.size as usize + 7];
		let num = open.read_objects(&mut buf, 1, entry.size as usize + 7).expect("failed to read entry");

		assert_eq!(num, entry.size as usize);
		assert_eq!(open.tell(), open.len());
	}
}

#[test]
fn test_archive_shareable() {
	fn check<T: Send + Sync>() {}

	check::<Archive>();
}
