use std::path::PathBuf;

use clap::Parser;

use yojana_storage::split;

/// Splits a flat scheme collection into the master and details tables.
#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	/// JSON array of flat scheme objects.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	#[arg(long, value_name = "FILE", default_value = "scheme_master.json")]
	pub master: PathBuf,
	#[arg(long, value_name = "FILE", default_value = "scheme_details.json")]
	pub details: PathBuf,
}

pub struct SplitReport {
	pub master_count: usize,
	pub details_count: usize,
}

pub fn run(args: &Args) -> color_eyre::Result<SplitReport> {
	let records = split::read_flat(&args.input)?;

	tracing::info!(input = %args.input.display(), records = records.len(), "Read flat schemes.");

	let (master, details) = split::split_flat(records);

	split::write_tables(&master, &details, &args.master, &args.details)?;

	Ok(SplitReport { master_count: master.len(), details_count: details.len() })
}
