//! Progress accounting for an active transfer.

use indicatif::{ProgressBar, ProgressStyle};

/// Callback invoked with the cumulative transfer percentage (0.0 to 100.0,
/// rounded to two decimal places) after each chunk.
pub type ProgressFn<'a> = dyn Fn(f64) + Send + Sync + 'a;

/// Tracks bytes transferred and fans updates out to the optional callback
/// and/or progress bar.
///
/// `bytes_transferred` is monotonically non-decreasing and clamped to the
/// total, so reported percentages never decrease and never exceed 100.
pub(crate) struct ProgressReporter<'a> {
    total_bytes: u64,
    bytes_transferred: u64,
    callback: Option<&'a ProgressFn<'a>>,
    bar: Option<ProgressBar>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(
        total_bytes: u64,
        callback: Option<&'a ProgressFn<'a>>,
        show_bar: bool,
    ) -> Self {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(total_bytes);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        });
        Self {
            total_bytes,
            bytes_transferred: 0,
            callback,
            bar,
        }
    }

    /// Records another chunk and reports the new percentage.
    pub(crate) fn advance(&mut self, chunk_len: u64) {
        self.bytes_transferred = self
            .bytes_transferred
            .saturating_add(chunk_len)
            .min(self.total_bytes);
        let percent = self.percent();
        if let Some(callback) = self.callback {
            callback(percent);
        }
        if let Some(bar) = &self.bar {
            bar.set_position(self.bytes_transferred);
        }
    }

    pub(crate) fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    /// Current percentage, rounded to two decimal places.
    #[allow(clippy::cast_precision_loss)]
    fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let raw = (self.bytes_transferred as f64 / self.total_bytes as f64) * 100.0;
        (raw * 100.0).round() / 100.0
    }

    /// Completes the bar on a successful transfer.
    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish();
        }
    }

    /// Clears the bar after an aborted or failed transfer.
    pub(crate) fn abandon(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_percentages_are_monotonic_and_end_at_100() {
        let seen = Mutex::new(Vec::new());
        let callback = |p: f64| seen.lock().unwrap().push(p);
        let mut reporter = ProgressReporter::new(1000, Some(&callback), false);

        for _ in 0..10 {
            reporter.advance(100);
        }

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 10);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "not monotonic: {seen:?}");
        assert!((seen.last().unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_rounds_to_two_decimals() {
        let seen = Mutex::new(Vec::new());
        let callback = |p: f64| seen.lock().unwrap().push(p);
        let mut reporter = ProgressReporter::new(3, Some(&callback), false);

        reporter.advance(1);
        let seen = seen.into_inner().unwrap();
        assert!((seen[0] - 33.33).abs() < f64::EPSILON, "got {}", seen[0]);
    }

    #[test]
    fn test_progress_clamps_at_total() {
        let mut reporter = ProgressReporter::new(100, None, false);
        reporter.advance(250);
        assert_eq!(reporter.bytes_transferred(), 100);
    }
}
