//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Date Sorter - copies files into a year/month/day tree
///
/// Each file is dated from its EXIF metadata when available, otherwise
/// from its modification time. Files whose metadata cannot be read go to
/// `<dest>/err`, files that cannot be opened go to the others directory.
#[derive(Parser, Debug)]
#[command(name = "date-sorter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// CLI arguments override settings from the file.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Source directory [default: ./source]
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Destination directory [default: ./dest]
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Directory for files that have no date [default: ./others]
    #[arg(short, long)]
    pub others: Option<PathBuf>,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source {
            config.source_dir = source.clone();
        }
        if let Some(ref dest) = self.dest {
            config.dest_dir = dest.clone();
        }
        if let Some(ref others) = self.others {
            config.other_dir = others.clone();
        }
        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
