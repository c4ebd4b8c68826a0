//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app_config::MAX_DEPTH;

/// Query a headless content-delivery project.
///
/// Items are fetched together with their linked items, mapped into a typed
/// item graph with rich text resolved, and printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "content-delivery")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/content-delivery/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project id (overrides config file)
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    /// Delivery API base URL (overrides config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Content language
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    /// Fail when linked items are missing from the response
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log degraded content resolution as warnings
    #[arg(long, global = true)]
    pub advanced_logging: bool,

    /// Omit raw JSON payloads from the output
    #[arg(long, global = true)]
    pub no_raw: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch one item by codename
    Item {
        codename: String,

        /// Levels of linked items to include
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DEPTH)))]
        depth: Option<u32>,
    },
    /// List items
    Items {
        /// Content type to list
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,

        /// Levels of linked items to include
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DEPTH)))]
        depth: Option<u32>,

        /// Maximum number of items
        #[arg(long)]
        limit: Option<u32>,

        /// Number of items to skip
        #[arg(long)]
        skip: Option<u32>,

        /// Sort path, e.g. `elements.title[asc]` or `system.last_modified[desc]`
        #[arg(long)]
        order: Option<String>,
    },
    /// Fetch one page of the items feed
    Feed {
        /// Content type to list
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,

        /// Continuation token of the previous page
        #[arg(long)]
        continuation: Option<String>,
    },
    /// Fetch a content type definition
    Type { codename: String },
    /// Fetch a taxonomy group
    Taxonomy { codename: String },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_item_command() {
        let args = Args::try_parse_from(["content-delivery", "item", "warrior", "-d", "2"]).unwrap();
        assert_eq!(
            args.command,
            Command::Item {
                codename: "warrior".to_string(),
                depth: Some(2)
            }
        );
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "content-delivery",
            "items",
            "--type",
            "movie",
            "-p",
            "p1",
            "--strict",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.project.as_deref(), Some("p1"));
        assert!(args.strict);
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::Items { content_type: Some(ref t), .. } if t == "movie"));
    }

    #[test]
    fn test_cli_depth_out_of_range() {
        let result = Args::try_parse_from(["content-delivery", "item", "warrior", "--depth", "11"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_has_no_api_key_flag() {
        let result = Args::try_parse_from(["content-delivery", "--preview-api-key", "k", "item", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Args::try_parse_from(["content-delivery"]).is_err());
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["content-delivery", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["content-delivery", "--invalid-flag", "item", "x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
