//! Command-line arguments

use clap::Parser;
use pmdb_core::{Language, PlayerConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pmdb-player", version, about = "PMDB Media Player for Pegasus Frontend")]
pub struct Cli {
    /// Video file to play
    #[arg(value_name = "VIDEO_PATH")]
    pub video: PathBuf,

    /// Start in fullscreen
    #[arg(long)]
    pub fullscreen: bool,

    /// Interface language (es, en)
    #[arg(long, value_name = "LANG")]
    pub language: Option<Language>,

    /// Config file (default: <config dir>/pmdb-player/config.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Position database (default: discovered PMDB-Theme database.json)
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,
}

impl Cli {
    /// Flags win over the config file
    pub fn apply(&self, config: &mut PlayerConfig) {
        if self.fullscreen {
            config.start_fullscreen = true;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(database) = &self.database {
            config.database_path = Some(database.clone());
        }
    }
}
