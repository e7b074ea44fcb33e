//! Catalog listing and statistics commands.

use clap::Args;
use tilegeo::config::format_size;

use super::common::print_json;
use crate::error::CliError;
use crate::runner::CliGeocoder;

#[derive(Debug, Args)]
pub struct PostcodesArgs {
    /// Only postcodes starting with this prefix
    pub prefix: Option<String>,

    /// Maximum number of postcodes
    #[arg(long, default_value = "50")]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct PartitionsArgs {
    /// Region name, Arabic or English
    pub region: String,
}

pub fn run_postcodes(
    geocoder: &CliGeocoder,
    args: PostcodesArgs,
    json: bool,
) -> Result<(), CliError> {
    let entries = geocoder.get_postcodes(args.prefix.as_deref(), Some(args.limit))?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No postcodes found.");
        return Ok(());
    }
    println!("{:<10} {:>9} {:>11}", "POSTCODE", "ADDRESSES", "PARTITIONS");
    for entry in &entries {
        println!(
            "{:<10} {:>9} {:>11}",
            entry.postcode,
            entry.address_count,
            entry.partition_ids.len()
        );
    }
    Ok(())
}

pub fn run_partitions(
    geocoder: &CliGeocoder,
    args: PartitionsArgs,
    json: bool,
) -> Result<(), CliError> {
    let partitions = geocoder.get_partitions_by_region(&args.region)?;

    if json {
        return print_json(&partitions);
    }

    if partitions.is_empty() {
        println!("No partitions for region '{}'.", args.region);
        return Ok(());
    }
    println!("{:<18} {:>9} {:>8}", "PARTITION", "ADDRESSES", "SIZE");
    for partition in &partitions {
        let bytes = usize::try_from(partition.file_size_kb.saturating_mul(1024)).unwrap_or(usize::MAX);
        println!(
            "{:<18} {:>9} {:>8}",
            partition.id,
            partition.address_count,
            format_size(bytes)
        );
    }
    println!();
    println!("{} partition(s)", partitions.len());
    Ok(())
}

pub fn run_stats(geocoder: &CliGeocoder, json: bool) -> Result<(), CliError> {
    let stats = geocoder.get_stats()?;
    if json {
        return print_json(&stats);
    }
    println!("{}", stats);
    Ok(())
}
