//! Cleaner configuration from `postclean.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                   |
//! |-----------|-------------------------------------------|
//! | `[paths]` | Input and output directories              |
//! | `[clean]` | How a failing post affects the batch      |
//!
//! The file is optional. Values from the command line override it.

mod error;

pub use error::{ConfigDiagnostics, ConfigError};

use crate::{cli::CleanArgs, debug, log, utils::path::normalize_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing postclean.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative config paths resolve against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub paths: PathsConfig,

    pub clean: CleanSectionConfig,
}

/// `[paths]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the exported `*.md` posts
    pub input: PathBuf,
    /// Directory receiving the cleaned posts
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input_files"),
            output: PathBuf::from("cleaned_md"),
        }
    }
}

/// `[clean]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanSectionConfig {
    /// What to do when a post cannot be cleaned
    pub on_error: ErrorPolicy,

    /// Clean without writing (CLI only)
    #[serde(skip)]
    pub dry: bool,
}

/// Reaction of the batch to a post that fails to clean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first failing post
    #[default]
    Abort,
    /// Report the post, keep going, fail at the end
    Skip,
}

impl CleanerConfig {
    /// Load configuration for the clean command.
    ///
    /// Searches upward from cwd for `config_name`. Without a config file
    /// the defaults apply relative to cwd.
    pub fn load(config_name: &Path, args: &CleanArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(config_name, args, &cwd)
    }

    /// [`CleanerConfig::load`] with an explicit working directory.
    pub fn load_from(config_name: &Path, args: &CleanArgs, cwd: &Path) -> Result<Self> {
        let mut config = match find_config_file(config_name, cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", config_name.display());
                Self {
                    root: cwd.to_path_buf(),
                    ..Self::default()
                }
            }
        };

        config.normalize_paths();
        config.apply_clean_args(args, cwd);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    #[allow(dead_code)] // Used in tests
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "ignoring unknown fields in {}: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Resolve config file paths against the config directory.
    fn normalize_paths(&mut self) {
        self.paths.input = normalize_path(&self.paths.input, &self.root);
        self.paths.output = normalize_path(&self.paths.output, &self.root);
    }

    /// Apply clean command arguments; CLI paths resolve against cwd.
    fn apply_clean_args(&mut self, args: &CleanArgs, cwd: &Path) {
        crate::logger::set_verbose(args.verbose);

        if let Some(input) = &args.input {
            self.paths.input = normalize_path(input, cwd);
        }
        if let Some(output) = &args.output {
            self.paths.output = normalize_path(output, cwd);
        }
        if args.keep_going {
            self.clean.on_error = ErrorPolicy::Skip;
        }
        self.clean.dry = args.dry;
    }

    /// Validate paths, collecting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if !self.paths.input.is_dir() {
            diag.error_with_hint(
                "paths.input",
                format!("input directory `{}` not found", self.paths.input.display()),
                "set [paths] input in postclean.toml or pass --input",
            );
        }
        if self.paths.output == self.paths.input {
            diag.error(
                "paths.output",
                "output directory must differ from the input directory",
            );
        }

        diag.into_result()
    }
}

/// Find config file by searching upward from `cwd`
///
/// Returns the path of the first `config_name` found walking up the parent
/// directories, or `config_name` itself when it is an existing absolute path.
fn find_config_file(config_name: &Path, cwd: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================
