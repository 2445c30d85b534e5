//! CLI definitions for fceplus.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fceplus diagnostic CLI.
#[derive(Parser)]
#[command(name = "fceplus")]
#[command(about = "Course workload (FCE) lookups and schedule totals")]
#[command(version)]
pub(crate) struct Cli {
    /// Log filter, overrides FCEPLUS_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the average hours for each course
    Lookup {
        /// Course ids, e.g. 15-780 or 15780
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        source: DatasetSource,
    },

    /// Print the schedule total for a set of courses, each counted once
    Total {
        /// Course ids, optionally with declared units as ID=UNITS
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        source: DatasetSource,
    },
}

/// Where to read the reference dataset from.
#[derive(Args, Debug, Clone)]
pub(crate) struct DatasetSource {
    /// Read the dataset from a local JSON file instead of fetching it
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Dataset URL, overrides FCEPLUS_DATASET_URL
    #[arg(long)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_url_is_not_read_from_env() {
        // FCEPLUS_DATASET_URL is applied through the engine config, so an
        // exported URL must not make --file conflict.
        let cmd = Cli::command();
        let lookup = cmd.find_subcommand("lookup").unwrap();
        let url = lookup.get_arguments().find(|a| a.get_id() == "url").unwrap();
        assert!(url.get_env().is_none());
    }

    #[test]
    fn test_file_and_url_conflict() {
        let cli = Cli::try_parse_from(["fceplus", "lookup", "15-780", "--file", "fce.json"]).unwrap();
        match cli.command {
            Commands::Lookup { source, .. } => {
                assert_eq!(source.file.as_deref(), Some(std::path::Path::new("fce.json")));
                assert!(source.url.is_none());
            }
            Commands::Total { .. } => panic!("expected lookup"),
        }

        let err = Cli::try_parse_from([
            "fceplus",
            "total",
            "15-780",
            "--file",
            "fce.json",
            "--url",
            "https://example.com/fce.json",
        ]);
        assert!(err.is_err());
    }
}
