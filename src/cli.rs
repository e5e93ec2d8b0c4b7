//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use vaultfetch_core::catalog::Kind;

/// Interactive client for the AudioVault media catalog.
///
/// Vaultfetch signs in to the catalog site, lets you search or browse
/// movies and shows from a menu, and streams the selected file to disk
/// with a progress bar.
#[derive(Parser, Debug)]
#[command(name = "vaultfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Base URL of the catalog site
    #[arg(long, env = "VAULTFETCH_BASE_URL", default_value = "https://audiovault.net/")]
    pub base_url: Url,

    /// Directory to save downloads into (defaults to server-provided filename
    /// in the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Minimum courtesy delay between page fetches in milliseconds (max 60000)
    #[arg(long, default_value_t = 400, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_min: u64,

    /// Maximum courtesy delay between page fetches in milliseconds (max 60000)
    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_max: u64,
}

/// Top-level menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SearchMovies,
    SearchShows,
    RecentMovies,
    RecentShows,
    Exit,
}

impl MenuChoice {
    /// All choices in menu display order.
    pub const ALL: [MenuChoice; 5] = [
        MenuChoice::SearchMovies,
        MenuChoice::SearchShows,
        MenuChoice::RecentMovies,
        MenuChoice::RecentShows,
        MenuChoice::Exit,
    ];

    /// Label shown in the interactive menu.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::SearchMovies => "Search movies",
            MenuChoice::SearchShows => "Search shows",
            MenuChoice::RecentMovies => "Recent movies",
            MenuChoice::RecentShows => "Recent shows",
            MenuChoice::Exit => "Exit",
        }
    }

    /// Catalog kind this choice operates on, if any.
    #[must_use]
    pub fn kind(self) -> Option<Kind> {
        match self {
            MenuChoice::SearchMovies | MenuChoice::RecentMovies => Some(Kind::Movies),
            MenuChoice::SearchShows | MenuChoice::RecentShows => Some(Kind::Shows),
            MenuChoice::Exit => None,
        }
    }

    /// Whether this choice prompts for a search query.
    #[must_use]
    pub fn is_search(self) -> bool {
        matches!(self, MenuChoice::SearchMovies | MenuChoice::SearchShows)
    }
}
