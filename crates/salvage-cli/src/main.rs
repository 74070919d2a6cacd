use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use salvage_core::probe::command::{DEFAULT_LIST_PROGRAM, DEFAULT_RECOVER_PROGRAM};
use salvage_core::{
	recover_manifest, scan_volume, CommandProbe, ExclusionSet, LogProgress, ProgressSink,
	RecoverOptions, RecoveryReport, ScanManifest, TrimPolicy, VolumeHandle, WalkOptions,
	DEFAULT_IGNORE_NAME,
};
use tracing_subscriber::EnvFilter;

mod progress;

use progress::TerminalProgress;

#[derive(Parser, Debug)]
#[command(
	name = "salvage",
	version,
	about = "Salvage - resumable file recovery through external volume probes",
	after_help = "EXAMPLES:\n    \
		salvage scan --device /dev/disk2s2 --index 0 --root /Users/alice --manifest alice.json\n    \
		salvage recover --manifest alice.json --out /Volumes/Backup/alice --jobs 4\n    \
		salvage run --device /dev/disk2s2 --index 0 --root /Users/alice --out /Volumes/Backup/alice"
)]
struct Cli {
	/// Show debug output
	#[arg(short, long, global = true)]
	verbose: bool,

	/// No progress bars (progress is still logged)
	#[arg(short, long, global = true)]
	quiet: bool,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Enumerate the source tree and save the work list
	Scan {
		#[command(flatten)]
		volume: VolumeArgs,
		#[command(flatten)]
		walk: WalkArgs,
		#[command(flatten)]
		probes: ProbeArgs,
		/// Where to write the scan manifest
		#[arg(long, value_name = "FILE")]
		manifest: PathBuf,
	},
	/// Recover the files listed in a saved manifest
	Recover {
		/// Scan manifest produced by `salvage scan`
		#[arg(long, value_name = "FILE")]
		manifest: PathBuf,
		#[command(flatten)]
		recover: RecoverArgs,
		#[command(flatten)]
		probes: ProbeArgs,
	},
	/// Scan, then recover
	Run {
		#[command(flatten)]
		volume: VolumeArgs,
		#[command(flatten)]
		walk: WalkArgs,
		#[command(flatten)]
		recover: RecoverArgs,
		#[command(flatten)]
		probes: ProbeArgs,
		/// Save the scan here; reused on the next run if it exists
		#[arg(long, value_name = "FILE")]
		manifest: Option<PathBuf>,
		/// Scan again even if the manifest exists
		#[arg(long)]
		rescan: bool,
	},
}

#[derive(Args, Debug)]
struct VolumeArgs {
	/// Device holding the volume (e.g. /dev/disk2s2)
	#[arg(long)]
	device: String,
	/// Volume index inside the container
	#[arg(long, default_value = "0")]
	index: u32,
}

#[derive(Args, Debug)]
struct WalkArgs {
	/// Volume path to recover from
	#[arg(long)]
	root: String,
	/// Directory to prune from the scan (repeatable)
	#[arg(long = "exclude", value_name = "PATH", action = clap::ArgAction::Append)]
	exclude: Vec<String>,
	/// File name to never recover (repeatable)
	#[arg(long = "ignore-name", value_name = "NAME", action = clap::ArgAction::Append, default_value = DEFAULT_IGNORE_NAME)]
	ignore_names: Vec<String>,
}

#[derive(Args, Debug)]
struct RecoverArgs {
	/// Output root mirroring the source root
	#[arg(long, value_name = "DIR")]
	out: PathBuf,
	/// Concurrent extractions
	#[arg(short, long, default_value = "1")]
	jobs: usize,
	/// Keep trailing zero padding in recovered files
	#[arg(long)]
	keep_padding: bool,
	/// Only create directories that receive files
	#[arg(long)]
	no_empty_dirs: bool,
}

#[derive(Args, Debug)]
struct ProbeArgs {
	/// Listing probe executable
	#[arg(long, default_value = DEFAULT_LIST_PROGRAM)]
	list_probe: PathBuf,
	/// Extraction probe executable
	#[arg(long, default_value = DEFAULT_RECOVER_PROGRAM)]
	recover_probe: PathBuf,
	/// Kill a probe invocation after this many seconds (0 disables)
	#[arg(long, default_value = "900", value_name = "SECS")]
	probe_timeout: u64,
}

impl ProbeArgs {
	fn locate(&self) -> Result<CommandProbe> {
		let timeout = (self.probe_timeout > 0).then(|| Duration::from_secs(self.probe_timeout));
		CommandProbe::locate(&self.list_probe, &self.recover_probe, timeout)
			.context("Cannot start recovery without both probes")
	}
}

impl WalkArgs {
	fn options(&self) -> WalkOptions {
		WalkOptions::new(&self.root)
			.with_exclusions(ExclusionSet::new(&self.exclude))
			.with_ignore_names(self.ignore_names.iter().cloned())
	}
}

impl RecoverArgs {
	fn options(&self) -> RecoverOptions {
		let trim = if self.keep_padding {
			TrimPolicy::Verbatim
		} else {
			TrimPolicy::TrailingZeros
		};
		RecoverOptions::new(&self.out)
			.with_trim(trim)
			.with_workers(self.jobs)
			.with_mirror_empty_dirs(!self.no_empty_dirs)
	}
}

fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	let terminal = (!cli.quiet && atty::is(atty::Stream::Stderr)).then(TerminalProgress::new);
	let sink: &dyn ProgressSink = match &terminal {
		Some(terminal) => terminal,
		None => &LogProgress,
	};

	tracing::debug!("{:?}", cli.command);
	let result = dispatch(cli.command, sink);
	if let Some(terminal) = &terminal {
		terminal.finish();
	}
	result
}

fn dispatch(command: Commands, sink: &dyn ProgressSink) -> Result<()> {
	match command {
		Commands::Scan { volume, walk, probes, manifest } => {
			let probe = probes.locate()?;
			let scan = run_scan(&probe, &volume, &walk, sink)?;
			scan.save(&manifest)?;
			print_scan_summary(&scan, &manifest);
		}
		Commands::Recover { manifest, recover, probes } => {
			let probe = probes.locate()?;
			let scan = ScanManifest::load(&manifest)?;
			let report = recover_manifest(&probe, &scan, &recover.options(), sink)?;
			print_recovery_summary(&scan, &report, &recover.out);
		}
		Commands::Run { volume, walk, recover, probes, manifest, rescan } => {
			let probe = probes.locate()?;
			let scan = match &manifest {
				Some(path) if path.exists() && !rescan => {
					println!("♻️  Reusing scan from {}", path.display());
					let scan = ScanManifest::load(path)?;
					check_reusable(&scan, &volume, &walk).with_context(|| {
						format!("Cannot reuse {} (pass --rescan to replace it)", path.display())
					})?;
					scan
				}
				_ => {
					let scan = run_scan(&probe, &volume, &walk, sink)?;
					if let Some(path) = &manifest {
						scan.save(path)?;
					}
					print_scan_summary(&scan, manifest.as_deref().unwrap_or(Path::new("-")));
					scan
				}
			};
			let report = recover_manifest(&probe, &scan, &recover.options(), sink)?;
			print_recovery_summary(&scan, &report, &recover.out);
		}
	}
	Ok(())
}

/// A saved scan only applies to the volume and root it was taken from
fn check_reusable(scan: &ScanManifest, volume: &VolumeArgs, walk: &WalkArgs) -> Result<()> {
	let handle = VolumeHandle::new(volume.device.clone(), volume.index);
	if scan.volume != handle {
		bail!("manifest was scanned from {}, not {}", scan.volume, handle);
	}
	let root = walk.options().root;
	if scan.source_root != root {
		bail!("manifest covers {}, not {}", scan.source_root, root);
	}
	Ok(())
}

fn run_scan(
	probe: &CommandProbe,
	volume: &VolumeArgs,
	walk: &WalkArgs,
	sink: &dyn ProgressSink,
) -> Result<ScanManifest> {
	let handle = VolumeHandle::new(volume.device.clone(), volume.index);
	println!("🔍 Scanning {} on {}", walk.root, handle);
	let scan = scan_volume(probe, &handle, &walk.options(), sink)
		.with_context(|| format!("Scan of {} failed", walk.root))?;
	Ok(scan)
}

fn print_scan_summary(scan: &ScanManifest, manifest: &Path) {
	let stats = &scan.scan_stats;
	println!("✅ Scan completed successfully!");
	println!("📊 Manifest: {} ({})", scan.id, manifest.display());
	println!("📁 Directories Listed: {}", stats.listed_dirs);
	println!(
		"⚠️  Listing Errors: {} ({:.1}%)",
		stats.list_errors,
		stats.error_rate_percent()
	);
	println!("📈 Files Found: {}", stats.files_found);
}

fn print_recovery_summary(scan: &ScanManifest, report: &RecoveryReport, out: &Path) {
	let stats = &report.stats;
	println!("✅ Recovery pass finished in {:.1}s", report.duration.as_secs_f64());
	println!("💾 Output: {}", out.display());
	println!("📁 Directories Listed: {}", scan.scan_stats.listed_dirs);
	println!("⚠️  Listing Errors: {}", scan.scan_stats.list_errors);
	println!("📈 Files Found: {}", scan.items.len());
	println!("🔄 Files Recovered: {}", stats.files_recovered);
	println!("⏭️  Files Skipped: {}", stats.files_skipped);
	println!("❌ Recovery Errors: {}", stats.recover_errors);
	println!(
		"📦 Bytes Written: {} ({} bytes of padding trimmed)",
		stats.bytes_written, stats.bytes_trimmed
	);
	for (item, reason) in report.failures.iter().take(20) {
		println!("   ✗ {}: {}", item, reason);
	}
	if report.failures.len() > 20 {
		println!("   … and {} more (see log)", report.failures.len() - 20);
	}
}
