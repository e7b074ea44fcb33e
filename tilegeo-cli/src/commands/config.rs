//! Configuration inspection CLI commands.
//!
//! Provides `config path` and `config show`. Neither touches the network.

use clap::Subcommand;
use std::path::Path;
use tilegeo::config::{config_file_path, format_size, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration, defaults included
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(config_path),
        ConfigCommands::Show => run_show(config_path),
    }
}

fn run_path(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    println!("{}", path.display());
    Ok(())
}

fn run_show(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    println!("Configuration Settings");
    println!("======================");

    section("data");
    entry("base_url", &config.data.base_url);
    entry("fallback_url", &config.data.fallback_url);
    entry("tile_extension", &config.data.tile_extension);
    entry("partition_index", &config.data.partition_index);
    entry("postcode_index", &config.data.postcode_index);
    entry("world_boundaries", &config.data.world_boundaries);
    entry("region_boundaries", &config.data.region_boundaries);
    entry("district_boundaries", &config.data.district_boundaries);

    section("grid");
    entry("resolution", config.grid.resolution);

    section("country");
    let bbox = &config.country.bbox;
    entry("iso_code", &config.country.iso_code);
    entry(
        "bbox",
        format!(
            "{},{},{},{}",
            bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
        ),
    );

    section("search");
    entry("max_forward_partitions", config.search.max_forward_partitions);
    entry("max_number_partitions", config.search.max_number_partitions);
    entry("default_limit", config.search.default_limit);
    entry("default_radius_m", config.search.default_radius_m);
    entry("unscoped_forward", config.search.unscoped_forward);
    entry("ranked", config.search.ranked);

    section("http");
    entry("timeout_secs", config.http.timeout_secs);
    entry("init_deadline_secs", config.http.init_deadline_secs);

    section("cache");
    entry(
        "partition_cache_size",
        format_size(config.cache.partition_cache_size),
    );

    section("logging");
    entry("level", &config.logging.level);
    match &config.logging.file {
        Some(file) => entry("file", file.display()),
        None => entry("file", "(not set)"),
    }

    Ok(())
}

fn section(name: &str) {
    println!();
    println!("[{}]", name);
}

fn entry(key: &str, value: impl std::fmt::Display) {
    println!("  {} = {}", key, value);
}
