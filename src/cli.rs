use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use config::Source;

use crate::{
    component::scan_field::{ErrorAction, ScanFieldOptions},
    config::{OutputFormat, get_config_dir, get_data_dir},
    libs::validators::ValidatorKind,
    utils::key_events::KeyName,
};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Path to the data directory
    #[arg(short, long, value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Path to a config file (toml, yaml or json5)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Allow typing into the scan field by hand
    #[arg(long)]
    pub editable: bool,

    /// Keep the focus on the scan field while it is empty
    #[arg(long)]
    pub sticky_focus: bool,

    /// Key that ends a scanned code, e.g. Enter, Tab, F2
    #[arg(long, value_name = "KEY")]
    pub last_key: Option<KeyName>,

    /// Maximum number of characters kept for one code
    #[arg(long, value_name = "N")]
    pub max_length: Option<usize>,

    /// Prepended to accepted codes
    #[arg(long, value_name = "TEXT")]
    pub prefix: Option<String>,

    /// Appended to accepted codes
    #[arg(long, value_name = "TEXT")]
    pub suffix: Option<String>,

    /// What to do with the field after a rejected code
    #[arg(long, value_enum, value_name = "ACTION")]
    pub on_error: Option<ErrorAction>,

    /// Which built-in validator checks completed codes
    #[arg(long, value_enum, value_name = "KIND")]
    pub validator: Option<ValidatorKind>,

    /// Regular expression a code has to match; implies `--validator pattern`
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// How accepted codes are printed on exit
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured validator against a code and exit
    Validate {
        /// The code, as the scanner would type it (without the terminator key)
        code: String,
    },
}

/// Outcome of `validate <CODE>`: whether the code is accepted and the line to print.
pub fn validate_code(options: &ScanFieldOptions, code: &str) -> (bool, String) {
    match options.check(code) {
        Some(reported) => (true, format!("accepted: {reported}")),
        None => (false, format!("rejected: {code}")),
    }
}

const VERSION_MESSAGE: &str = concat!(env!("CARGO_PKG_VERSION"));

pub fn version() -> String {
    let author = clap::crate_authors!();

    let data_dir_path = get_data_dir().display().to_string();
    let config_dir_path = get_config_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE}

Authors: {author}

Data directory: {data_dir_path}
Config directory: {config_dir_path}"
    )
}

/// Command line flags as a [`config::Source`], only flags actually given are set.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClapSource {
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<String>,
    pub editable: bool,
    pub sticky_focus: bool,
    pub last_key: Option<KeyName>,
    pub max_length: Option<usize>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub on_error: Option<ErrorAction>,
    pub validator: Option<ValidatorKind>,
    pub pattern: Option<String>,
    pub output: Option<OutputFormat>,
}

impl ClapSource {
    pub fn new(cli: &Cli) -> Self {
        Self {
            config_file: cli.config.clone(),
            data_dir: cli.data_dir.clone(),
            editable: cli.editable,
            sticky_focus: cli.sticky_focus,
            last_key: cli.last_key.clone(),
            max_length: cli.max_length,
            prefix: cli.prefix.clone(),
            suffix: cli.suffix.clone(),
            on_error: cli.on_error,
            validator: cli.validator,
            pattern: cli.pattern.clone(),
            output: cli.output,
        }
    }
}

impl Source for ClapSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut map = config::Map::new();
        let mut set = |key: &str, value: config::Value| {
            map.insert(key.to_string(), value);
        };

        if let Some(data_dir) = &self.data_dir {
            set("data_dir", config::Value::new(None, data_dir.clone()));
        }
        if let Some(output) = self.output {
            set("output", config::Value::new(None, output.to_string()));
        }
        if self.editable {
            set("scan.read_only", config::Value::new(None, false));
        }
        if self.sticky_focus {
            set("scan.allow_blur_on_empty", config::Value::new(None, false));
        }
        if let Some(last_key) = &self.last_key {
            set("scan.last_key", config::Value::new(None, last_key.to_string()));
        }
        if let Some(max_length) = self.max_length {
            set("scan.max_length", config::Value::new(None, max_length as u64));
        }
        if let Some(prefix) = &self.prefix {
            set("scan.prefix", config::Value::new(None, prefix.clone()));
        }
        if let Some(suffix) = &self.suffix {
            set("scan.suffix", config::Value::new(None, suffix.clone()));
        }
        if let Some(on_error) = self.on_error {
            set(
                "scan.action_on_error",
                config::Value::new(None, on_error.to_string()),
            );
        }
        let validator = self
            .validator
            .or(self.pattern.as_ref().map(|_| ValidatorKind::Pattern));
        if let Some(kind) = validator {
            set("scan.validator.kind", config::Value::new(None, kind.to_string()));
        }
        if let Some(pattern) = &self.pattern {
            set(
                "scan.validator.pattern",
                config::Value::new(None, pattern.clone()),
            );
        }
        Ok(map)
    }
}
