//! Boundary commands: country detection and administrative hierarchy.

use clap::Args;

use super::common::print_json;
use crate::error::CliError;
use crate::runner::CliGeocoder;

#[derive(Debug, Args)]
pub struct CountryArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

#[derive(Debug, Args)]
pub struct HierarchyArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

pub async fn run_country(
    geocoder: &CliGeocoder,
    args: CountryArgs,
    json: bool,
) -> Result<(), CliError> {
    let country = geocoder.detect_country(args.lat, args.lon).await?;
    let supported = geocoder.is_in_country(args.lat, args.lon).await?;

    if json {
        return print_json(&serde_json::json!({
            "country": country,
            "supported": supported,
        }));
    }

    match country {
        Some(info) => println!("{} ({})", info.name, info.iso_code),
        None => println!("No country found at {}, {}", args.lat, args.lon),
    }
    println!("Supported: {}", if supported { "yes" } else { "no" });
    Ok(())
}

pub async fn run_hierarchy(
    geocoder: &CliGeocoder,
    args: HierarchyArgs,
    json: bool,
) -> Result<(), CliError> {
    let hierarchy = geocoder.get_admin_hierarchy(args.lat, args.lon).await?;

    if json {
        return print_json(&hierarchy);
    }

    let show = |label: Option<String>| label.unwrap_or_else(|| "-".to_string());
    println!(
        "Country:  {}",
        show(hierarchy.country.map(|c| format!("{} ({})", c.name, c.iso_code)))
    );
    println!("Region:   {}", show(hierarchy.region.map(|l| l.to_string())));
    println!("District: {}", show(hierarchy.district.map(|l| l.to_string())));
    Ok(())
}
