//! Discovery of previously saved dated CSV exports.
//!
//! Listing exports are saved next to the binary as
//! `movies_<YYYY-MM-DD>.csv` / `shows_<YYYY-MM-DD>.csv`. This module scans a
//! directory for them and reports the newest per catalog kind.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

/// Date format embedded in export filenames.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Newest export file found per catalog kind.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatestExports {
    /// Newest `movies_<date>.csv`, if any.
    pub movies: Option<PathBuf>,
    /// Newest `shows_<date>.csv`, if any.
    pub shows: Option<PathBuf>,
}

/// Scans `dir` for dated CSV exports and returns the newest per kind.
///
/// Files with unparseable dates, dates in the future, or foreign prefixes
/// are ignored.
///
/// # Errors
///
/// Returns the underlying IO error when the directory cannot be read.
pub fn find_latest_csvs(dir: &Path) -> std::io::Result<LatestExports> {
    let today = Local::now().date_naive();
    let mut newest_movie: Option<(NaiveDate, PathBuf)> = None;
    let mut newest_show: Option<(NaiveDate, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let slot = if stem.starts_with("movies_") {
            &mut newest_movie
        } else if stem.starts_with("shows_") {
            &mut newest_show
        } else {
            continue;
        };

        let Some(stamp) = stem.rsplit('_').next() else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(stamp, EXPORT_DATE_FORMAT) else {
            debug!(file = %path.display(), "ignoring export with unparseable date");
            continue;
        };
        if date > today {
            continue;
        }
        if slot.as_ref().is_none_or(|(newest, _)| date > *newest) {
            *slot = Some((date, path));
        }
    }

    Ok(LatestExports {
        movies: newest_movie.map(|(_, path)| path),
        shows: newest_show.map(|(_, path)| path),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"id,name\n").unwrap();
    }

    #[test]
    fn test_find_latest_csvs_picks_newest_per_kind() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "movies_2024-01-10.csv");
        touch(dir.path(), "movies_2024-03-02.csv");
        touch(dir.path(), "shows_2023-12-31.csv");

        let latest = find_latest_csvs(dir.path()).unwrap();
        assert_eq!(
            latest.movies.unwrap().file_name().unwrap(),
            "movies_2024-03-02.csv"
        );
        assert_eq!(
            latest.shows.unwrap().file_name().unwrap(),
            "shows_2023-12-31.csv"
        );
    }

    #[test]
    fn test_find_latest_csvs_ignores_foreign_and_undated_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "movies_notadate.csv");
        touch(dir.path(), "books_2024-01-01.csv");
        touch(dir.path(), "readme.txt");

        let latest = find_latest_csvs(dir.path()).unwrap();
        assert_eq!(latest, LatestExports::default());
    }

    #[test]
    fn test_find_latest_csvs_ignores_future_dates() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "movies_9999-01-01.csv");
        touch(dir.path(), "movies_2020-06-15.csv");

        let latest = find_latest_csvs(dir.path()).unwrap();
        assert_eq!(
            latest.movies.unwrap().file_name().unwrap(),
            "movies_2020-06-15.csv"
        );
    }

    #[test]
    fn test_find_latest_csvs_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_latest_csvs(dir.path()).unwrap(), LatestExports::default());
    }
}
