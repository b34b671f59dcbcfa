//! Command-line interface definitions.
//!
//! # Examples
//!
//! ```sh
//! # One registered site, second page
//! statement site moran --page 2
//!
//! # Every site using a layout pattern
//! statement pattern table_recordlist_date
//!
//! # A pattern against explicit listing URLs
//! statement pattern media_body --url https://example.house.gov/media/press-releases
//!
//! # Everything in the registry, written to a file
//! statement --output out/all.json all
//!
//! # Syndication feeds
//! statement feeds https://www.example.senate.gov/rss/feeds/?type=press
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::registry::Pattern;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, env = "STATEMENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape one registered site
    Site {
        /// Site identifier from the registry
        id: String,
        /// Listing page, starting at 1 for every layout
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Run one layout pattern over its registered sites, or over --url values
    Pattern {
        #[arg(value_parser = parse_pattern)]
        name: Pattern,
        /// Listing URL to scrape instead of the registered ones (repeatable)
        #[arg(short, long = "url")]
        urls: Vec<String>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Run every pattern over every registered site
    All {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Collect RSS or Atom feeds
    Feeds {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// List registered sites
    Sites {
        /// Only sites using this pattern
        #[arg(long, value_parser = parse_pattern)]
        pattern: Option<Pattern>,
    },
}

fn parse_pattern(s: &str) -> Result<Pattern, String> {
    s.parse::<Pattern>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_command() {
        let cli = Cli::parse_from(["statement", "site", "moran", "--page", "2"]);
        assert_eq!(
            cli.command,
            Command::Site {
                id: "moran".into(),
                page: 2
            }
        );
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_pattern_with_urls() {
        let cli = Cli::parse_from([
            "statement",
            "-o",
            "/tmp/out.json",
            "pattern",
            "media_body",
            "--url",
            "https://a.house.gov/media/press-releases",
            "--url",
            "https://b.house.gov/media/press-releases",
        ]);
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out.json")));
        match cli.command {
            Command::Pattern { name, urls, page } => {
                assert_eq!(name, Pattern::MediaBody);
                assert_eq!(urls.len(), 2);
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_pattern_is_rejected() {
        assert!(Cli::try_parse_from(["statement", "pattern", "grid_cards"]).is_err());
    }

    #[test]
    fn test_feeds_requires_a_url() {
        assert!(Cli::try_parse_from(["statement", "feeds"]).is_err());
        let cli = Cli::parse_from(["statement", "--config", "statement.yaml", "feeds", "https://x.gov/rss"]);
        assert_eq!(cli.config, Some(PathBuf::from("statement.yaml")));
    }
}
