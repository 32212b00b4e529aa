//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading
//! - Dispatching each command to the matching organizer operation
//! - Rendering reports through the output module

use crate::config::Config;
use crate::file_organizer::{BatchOptions, OrganizeMode, Organizer, ScanKind};
use crate::output::OutputFormatter;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sort a cluttered folder into extension or category subdirectories.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Cli {
    /// Directory to organize
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file (TOML, or JSON by extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show entry counts by kind and extension
    Stats,

    /// List the entries of the directory
    List {
        /// files, directories or all
        #[arg(default_value = "all")]
        kind: ScanKind,
    },

    /// Show which category each name would be sorted into
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Move entries into extension (ext) or category (cat) subdirectories
    Organize {
        /// ext or cat
        mode: OrganizeMode,

        /// Directory that receives the organized entries
        destination: PathBuf,

        /// Leave directories where they are
        #[arg(long)]
        files_only: bool,

        /// Entry names to leave alone
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Rename every entry from a pattern: {} is the original name, {n} the position
    Rename {
        pattern: String,

        /// Rename directories too
        #[arg(long)]
        include_dirs: bool,

        /// Entry names to leave alone
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Change the extension of every file with extension FROM to TO
    Retag {
        from: String,
        to: String,

        /// Entry names to leave alone
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Move everything organized into DESTINATION back into the directory
    Restore { destination: PathBuf },
}

impl Cli {
    /// Loads the configuration and runs the selected command.
    ///
    /// Per-item failures are printed as part of the batch report and do not make this
    /// return an error; only a failure to start (bad configuration, unreadable
    /// directory, invalid argument) does.
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.config.as_deref()).context("Error loading configuration")?;
        let organizer =
            Organizer::from_config(&self.dir, config).context("Error compiling filters")?;

        match self.command {
            Command::Stats => {
                let stats = organizer
                    .statistics()
                    .with_context(|| format!("Error reading {}", self.dir.display()))?;
                OutputFormatter::statistics_table(&stats);
            }
            Command::List { kind } => {
                let entries = organizer
                    .scan(kind)
                    .with_context(|| format!("Error reading {}", self.dir.display()))?;
                OutputFormatter::entry_list(&entries);
            }
            Command::Classify { names } => {
                for name in &names {
                    OutputFormatter::classification(name, &organizer.resolve(name));
                }
            }
            Command::Organize {
                mode,
                destination,
                files_only,
                exclude,
            } => {
                OutputFormatter::info(&format!(
                    "Organizing contents of: {}",
                    self.dir.display()
                ));
                let options = BatchOptions {
                    include_directories: !files_only,
                    exclude,
                };
                let report = with_progress(organizer).organize(mode, &destination, &options)?;
                OutputFormatter::batch_summary("moved", &report);
            }
            Command::Rename {
                pattern,
                include_dirs,
                exclude,
            } => {
                let options = BatchOptions {
                    include_directories: include_dirs,
                    exclude,
                };
                let report = with_progress(organizer).rename_all(&pattern, &options)?;
                for relocation in &report.completed {
                    let new_name = relocation
                        .to
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    OutputFormatter::plain(&format!(" - {} → {}", relocation.item, new_name));
                }
                OutputFormatter::batch_summary("renamed", &report);
            }
            Command::Retag { from, to, exclude } => {
                let report = with_progress(organizer).retag_extension(&from, &to, &exclude)?;
                OutputFormatter::batch_summary("changed", &report);
            }
            Command::Restore { destination } => {
                let report = with_progress(organizer).restore(&destination)?;
                OutputFormatter::batch_summary("restored", &report);
            }
        }

        Ok(())
    }
}

fn with_progress(organizer: Organizer) -> Organizer {
    organizer.with_progress(OutputFormatter::create_progress_bar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_organize() {
        let cli = Cli::try_parse_from([
            "dirsort", "--dir", "/tmp/x", "organize", "cat", "Sorted", "--files-only", "-e",
            "keep.txt",
        ])
        .unwrap();

        assert_eq!(cli.dir, PathBuf::from("/tmp/x"));
        match cli.command {
            Command::Organize {
                mode,
                destination,
                files_only,
                exclude,
            } => {
                assert_eq!(mode, OrganizeMode::Category);
                assert_eq!(destination, PathBuf::from("Sorted"));
                assert!(files_only);
                assert_eq!(exclude, vec!["keep.txt".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["dirsort", "organize", "size", "Out"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_defaults_to_all() {
        let cli = Cli::try_parse_from(["dirsort", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List { kind: ScanKind::All }));

        let cli = Cli::try_parse_from(["dirsort", "list", "files", "-vv"]).unwrap();
        assert!(matches!(cli.command, Command::List { kind: ScanKind::Files }));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_retag() {
        let cli = Cli::try_parse_from(["dirsort", "retag", "mp3", ".mp4"]).unwrap();
        match cli.command {
            Command::Retag { from, to, exclude } => {
                assert_eq!(from, "mp3");
                assert_eq!(to, ".mp4");
                assert!(exclude.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
