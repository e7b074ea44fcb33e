//! Exact-match lookup commands.

use clap::Args;

use super::common::{print_result, QueryArgs};
use crate::error::CliError;
use crate::runner::CliGeocoder;

#[derive(Debug, Args)]
pub struct PostcodeArgs {
    /// Postcode; Arabic-Indic digits are accepted
    pub postcode: String,

    /// Only this house number within the postcode
    #[arg(long)]
    pub number: Option<String>,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Args)]
pub struct NumberArgs {
    /// House number; Arabic-Indic digits are accepted
    pub number: String,

    #[command(flatten)]
    pub query: QueryArgs,
}

pub async fn run_postcode(
    geocoder: &CliGeocoder,
    args: PostcodeArgs,
    json: bool,
) -> Result<(), CliError> {
    let mut opts = args.query.to_options();
    if let Some(number) = args.number {
        opts = opts.with_house_number(number);
    }
    let result = geocoder.search_by_postcode(&args.postcode, &opts).await?;
    print_result(&result, args.query.lang, json)
}

pub async fn run_number(
    geocoder: &CliGeocoder,
    args: NumberArgs,
    json: bool,
) -> Result<(), CliError> {
    let opts = args.query.to_options();
    let result = geocoder.search_by_number(&args.number, &opts).await?;
    print_result(&result, args.query.lang, json)
}
