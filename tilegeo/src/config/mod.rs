//! Configuration for the geocoder and the command-line tool.
//!
//! Settings are read from `~/.tilegeo/config.ini` (or an explicit path).
//! Every key is optional; a missing file yields [`ConfigFile::default`].
//!
//! ```ini
//! [data]
//! base_url = https://mirror.example.com/geo
//!
//! [search]
//! unscoped_forward = reject
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod size;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::*;
pub use size::{format_size, parse_size, SizeParseError};
