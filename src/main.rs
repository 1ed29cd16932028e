//! Command-line application demonstrating usage of the `groupfile` library.

use std::{
	fs::{self, File},
	io::{self, Write},
	path::{Component, Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use groupfile::{Archive, Format, NativePlatform};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Performs basic read-only operations on GRP/MVL archives
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
	/// Increases the verbosity of logging (repeatable), unless overridden by `RUST_LOG`
	#[arg(short, long, global = true, action = ArgAction::Count)]
	verbose: u8,

	/// Indicates the operation to perform
	#[command(subcommand)]
	operation: Operation,
}

/// Represents the operation to perform
#[derive(Debug, Subcommand)]
enum Operation {
	/// List the supported archive formats
	Formats,

	/// Inspect the contents of an archive
	Inspect {
		#[command(flatten)]
		source: Source,
	},

	/// Extract the contents of an archive to an output directory
	Extract {
		#[command(flatten)]
		source: Source,

		/// Specifies the output directory
		#[arg(short, long)]
		target: PathBuf,
	},

	/// Write a single entry of an archive to standard output
	Cat {
		#[command(flatten)]
		source: Source,

		/// Specifies the name of the entry
		name: String,
	},
}

/// Represents the archive to operate on
#[derive(Debug, clap::Args)]
struct Source {
	/// Specifies the archive file
	archive: PathBuf,

	/// Specifies the format of the archive (grp or mvl), detected when omitted
	#[arg(short, long)]
	format: Option<Format>,
}

impl Source {
	fn open(&self) -> Result<Archive> {
		let format = match self.format {
			Some(format) => format,
			None => Format::detect(&NativePlatform, &self.archive).with_context(|| format!("failed to detect format of {}", self.archive.display()))?,
		};

		format.open(NativePlatform, &self.archive).with_context(|| format!("failed to read {} archive {}", format, self.archive.display()))
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	// Honour `RUST_LOG` when set, falling back to the requested verbosity.

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(match cli.verbose {
			0 => "warn",
			1 => "info",
			2 => "debug",
			_ => "trace",
		})
	});

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	// Perform the operation.

	match cli.operation {
		Operation::Formats => {
			for format in Format::ALL {
				let info = format.info();

				println!("[{:<3}] {}", info.extension, info.description);
			}
		}
		Operation::Inspect {
			source,
		} => {
			let archive = source.open()?;

			for entry in archive.iter() {
				println!("[{:<12}] offset: {}, length: {}", entry.name, entry.start, entry.size);
			}

			info!("Inspected {} entries", archive.len());
		}
		Operation::Extract {
			source,
			target,
		} => {
			let archive = source.open()?;

			fs::create_dir_all(&target).with_context(|| format!("failed to create directory {}", target.display()))?;

			for (index, entry) in archive.iter().enumerate() {
				// Refuse names that would escape the output directory.

				if !is_plain(&entry.name) {
					warn!("Skipping entry [{}] with unsafe name", entry.name);

					continue;
				}

				// Only the first stored entry of a name is extracted, as it is the one found by name.

				if archive.is_shadowed(index) {
					warn!("Skipping entry [{}] shadowed by an earlier entry", entry.name);

					continue;
				}

				let path = target.join(&entry.name);

				info!("Extracting entry [{}] to file <{}>", entry.name, path.display());

				let mut src = archive.open_at(index).with_context(|| format!("failed to open entry {}", entry.name))?;
				let mut dst = File::create(&path).with_context(|| format!("failed to create file {}", path.display()))?;

				io::copy(&mut src, &mut dst).with_context(|| format!("failed to extract entry {}", entry.name))?;
			}

			info!("Extracted {} entries", archive.len());
		}
		Operation::Cat {
			source,
			name,
		} => {
			let archive = source.open()?;

			if !archive.exists(&name) {
				bail!("no entry named {} in {}", name, source.archive.display());
			}

			let mut src = archive.open(&name)?;
			let mut stdout = io::stdout().lock();

			io::copy(&mut src, &mut stdout).context("failed to write entry")?;

			stdout.flush()?;
		}
	}

	Ok(())
}

fn is_plain(name: &str) -> bool {
	let mut components = Path::new(name).components();

	matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}
