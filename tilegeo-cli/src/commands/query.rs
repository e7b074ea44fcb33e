//! Forward and reverse geocoding commands.

use clap::Args;

use super::common::{print_result, QueryArgs};
use crate::error::CliError;
use crate::runner::CliGeocoder;

#[derive(Debug, Args)]
pub struct GeocodeArgs {
    /// Address text, Arabic or English
    pub text: String,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Args)]
pub struct ReverseArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Search radius in meters
    #[arg(long)]
    pub radius: Option<f64>,

    /// Also search partitions adjacent to the point's cell
    #[arg(long)]
    pub neighbors: bool,

    #[command(flatten)]
    pub query: QueryArgs,
}

pub async fn run_geocode(
    geocoder: &CliGeocoder,
    args: GeocodeArgs,
    json: bool,
) -> Result<(), CliError> {
    let opts = args.query.to_options();
    let result = geocoder.geocode(&args.text, &opts).await?;
    print_result(&result, args.query.lang, json)
}

pub async fn run_reverse(
    geocoder: &CliGeocoder,
    args: ReverseArgs,
    json: bool,
) -> Result<(), CliError> {
    let mut opts = args.query.to_options().with_neighbors(args.neighbors);
    if let Some(radius) = args.radius {
        opts = opts.with_radius_meters(radius);
    }
    let result = geocoder.reverse_geocode(args.lat, args.lon, &opts).await?;
    print_result(&result, args.query.lang, json)
}
