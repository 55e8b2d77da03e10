use std::{env, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::{
    component::scan_field::ErrorAction, libs::validators::ValidatorConfig,
    utils::key_events::KeyName,
};

/// How accepted codes are written to stdout when the program exits.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    strum::Display,
    strum::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// One code per line
    #[default]
    Lines,
    /// A JSON array of scan records
    Json,
    /// Print nothing
    None,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,

    /// Number of outcomes kept in the session history
    pub history_size: usize,

    pub output: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: get_data_dir(),
            history_size: 50,
            output: OutputFormat::default(),
        }
    }
}

/// Options of the scan field, see [`crate::component::scan_field::ScanFieldOptions`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Disallow typing into the field by hand
    pub read_only: bool,
    /// Key that ends a code
    pub last_key: KeyName,
    /// If false, the field takes the focus back when it is left empty
    pub allow_blur_on_empty: bool,
    pub action_on_error: ErrorAction,
    /// Characters kept in the buffer beyond this length are dropped
    pub max_length: usize,
    pub prefix: String,
    pub suffix: String,
    pub title: String,
    pub validator: ValidatorConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            read_only: true,
            last_key: KeyName::Enter,
            allow_blur_on_empty: true,
            action_on_error: ErrorAction::Select,
            max_length: 256,
            prefix: String::new(),
            suffix: String::new(),
            title: "Scan".to_string(),
            validator: ValidatorConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
}

impl Config {
    /// Layers, lowest priority first: defaults, config file, CLI.
    pub fn new(cli_source: Option<crate::cli::ClapSource>) -> Result<Self> {
        let data_dir = get_data_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?;

        let explicit_file = cli_source.as_ref().and_then(|c| c.config_file.clone());
        match explicit_file.or_else(config_file_from_env) {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                let config_dir = get_config_dir();
                for name in ["config.toml", "config.yaml", "config.json5"] {
                    builder =
                        builder.add_source(config::File::from(config_dir.join(name)).required(false));
                }
            }
        }

        // Add CLI source last (highest priority)
        if let Some(cli_source) = cli_source {
            builder = builder.add_source(cli_source);
        }

        let cfg: Self = builder
            .build()
            .context("Error building config")?
            .try_deserialize()
            .context("Error deserialize config")?;

        Ok(cfg)
    }
}

fn config_file_from_env() -> Option<PathBuf> {
    env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from)
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = env::var(format!("{}_DATA", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from)
    {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "scancapture", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::{NamedTempFile, tempdir_in};

    use crate::cli::{ClapSource, Cli};

    use super::*;

    fn config_from_args(args: &[&str]) -> Config {
        let args = Cli::parse_from(args);
        Config::new(Some(ClapSource::new(&args))).expect("Failed to load config")
    }

    #[test]
    fn defaults() {
        let config = config_from_args(&["test-config"]);
        assert!(config.scan.read_only);
        assert_eq!(config.scan.last_key, KeyName::Enter);
        assert!(config.scan.allow_blur_on_empty);
        assert_eq!(config.scan.action_on_error, ErrorAction::Select);
        assert_eq!(config.scan.max_length, 256);
        assert_eq!(config.scan.prefix, "");
        assert_eq!(config.config.history_size, 50);
        assert_eq!(config.config.output, OutputFormat::Lines);
    }

    #[test]
    fn data_dir_from_env() {
        let temp_data = tempdir_in(".").unwrap();

        temp_env::with_vars(
            [(
                format!("{}_DATA", PROJECT_NAME.clone()).as_str(),
                Some(temp_data.path().to_str().unwrap()),
            )],
            || {
                let config = Config::new(None).unwrap();
                assert_eq!(config.config.data_dir, temp_data.path());
            },
        );
    }

    #[test]
    fn data_dir_from_cli() {
        let config = config_from_args(&["test-config", "--data-dir", ".cli-data"]);
        assert_eq!(config.config.data_dir, PathBuf::from(".cli-data"));
    }

    #[test]
    fn scan_options_from_cli() {
        let config = config_from_args(&[
            "test-config",
            "--editable",
            "--sticky-focus",
            "--last-key",
            "Tab",
            "--max-length",
            "12",
            "--prefix",
            "P-",
            "--suffix",
            "-S",
            "--on-error",
            "clear",
            "--output",
            "json",
        ]);

        assert!(!config.scan.read_only);
        assert!(!config.scan.allow_blur_on_empty);
        assert_eq!(config.scan.last_key, KeyName::Tab);
        assert_eq!(config.scan.max_length, 12);
        assert_eq!(config.scan.prefix, "P-");
        assert_eq!(config.scan.suffix, "-S");
        assert_eq!(config.scan.action_on_error, ErrorAction::Clear);
        assert_eq!(config.config.output, OutputFormat::Json);
    }

    #[test]
    fn pattern_implies_pattern_validator() {
        let config = config_from_args(&["test-config", "--pattern", r"\d{4}"]);
        assert_eq!(
            config.scan.validator.kind,
            crate::libs::validators::ValidatorKind::Pattern
        );
        assert_eq!(config.scan.validator.pattern.as_deref(), Some(r"\d{4}"));
    }

    #[test]
    fn file_then_cli_override() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
history_size = 5

[scan]
last_key = "F2"
prefix = "FILE-"
action_on_error = "none"

[scan.validator]
kind = "gtin"
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let config = config_from_args(&["test-config", "--config", path]);
        assert_eq!(config.config.history_size, 5);
        assert_eq!(config.scan.last_key, KeyName::F(2));
        assert_eq!(config.scan.prefix, "FILE-");
        assert_eq!(config.scan.action_on_error, ErrorAction::None);
        assert_eq!(
            config.scan.validator.kind,
            crate::libs::validators::ValidatorKind::Gtin
        );
        // untouched keys keep their defaults
        assert_eq!(config.scan.max_length, 256);

        let config = config_from_args(&["test-config", "--config", path, "--prefix", "CLI-"]);
        assert_eq!(config.scan.prefix, "CLI-");
        assert_eq!(config.scan.last_key, KeyName::F(2));
    }

    #[test]
    fn unknown_last_key_is_an_error() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[scan]\nlast_key = \"Hyper\"").unwrap();

        let args = Cli::parse_from(["test-config", "--config", file.path().to_str().unwrap()]);
        assert!(Config::new(Some(ClapSource::new(&args))).is_err());
    }
}
