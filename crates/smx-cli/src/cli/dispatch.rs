//! Dispatch logic: extract params from `ArgMatches` and convert them to
//! command args.

use std::path::PathBuf;

use clap::ArgMatches;
use log::LevelFilter;

use super::ColorChoice;
use crate::commands::disasm::DisasmArgs;
use crate::commands::info::InfoArgs;
use crate::commands::lift::LiftArgs;

/// Log level for the `-v` count of any subcommand.
pub fn verbosity(m: &ArgMatches) -> LevelFilter {
    match m.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub struct InfoParams {
    pub path: PathBuf,
    pub json: bool,
    pub max_image_size: Option<usize>,
    pub color: ColorChoice,
}

impl InfoParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            path: file(m),
            json: m.get_flag("json"),
            max_image_size: m.get_one::<usize>("max_image_size").copied(),
            color: parse_color(m),
        }
    }
}

impl From<InfoParams> for InfoArgs {
    fn from(p: InfoParams) -> Self {
        Self {
            path: p.path,
            json: p.json,
            max_image_size: p.max_image_size,
            // JSON is never colored.
            color: !p.json && p.color.should_colorize(),
        }
    }
}

pub struct DisasmParams {
    pub path: PathBuf,
    pub function: Option<String>,
    pub max_image_size: Option<usize>,
    pub color: ColorChoice,
}

impl DisasmParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            path: file(m),
            function: m.get_one::<String>("function").cloned(),
            max_image_size: m.get_one::<usize>("max_image_size").copied(),
            color: parse_color(m),
        }
    }
}

impl From<DisasmParams> for DisasmArgs {
    fn from(p: DisasmParams) -> Self {
        Self {
            path: p.path,
            function: p.function,
            max_image_size: p.max_image_size,
            color: p.color.should_colorize(),
        }
    }
}

pub struct LiftParams {
    pub path: PathBuf,
    pub function: Option<String>,
    pub max_image_size: Option<usize>,
    pub color: ColorChoice,
}

impl LiftParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            path: file(m),
            function: m.get_one::<String>("function").cloned(),
            max_image_size: m.get_one::<usize>("max_image_size").copied(),
            color: parse_color(m),
        }
    }
}

impl From<LiftParams> for LiftArgs {
    fn from(p: LiftParams) -> Self {
        Self {
            path: p.path,
            function: p.function,
            max_image_size: p.max_image_size,
            color: p.color.should_colorize(),
        }
    }
}

/// `file` is required, so clap rejects matches without it.
fn file(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("file").cloned().unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
