//! Human-readable byte formatting for download size output.

/// Binary prefixes, smallest first. Each step is another factor of 1024.
const SYMBOLS: [&str; 8] = ["KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with a binary prefix and one decimal place.
///
/// Values under 1024 are rendered without a prefix (`"512B"`).
///
/// # Example
///
/// ```
/// use vaultfetch_core::format::human_bytes;
///
/// assert_eq!(human_bytes(1_048_576), "1.0MB");
/// assert_eq!(human_bytes(10), "10B");
/// ```
#[must_use]
pub fn human_bytes(n: u64) -> String {
    // u128 thresholds: the ZB/YB steps do not fit in a u64.
    for (i, symbol) in SYMBOLS.iter().enumerate().rev() {
        let threshold = 1u128 << ((i + 1) * 10);
        if u128::from(n) >= threshold {
            #[allow(clippy::cast_precision_loss)]
            let value = n as f64 / threshold as f64;
            return format!("{value:.1}{symbol}");
        }
    }
    format!("{n}B")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes_below_one_kilobyte() {
        assert_eq!(human_bytes(0), "0B");
        assert_eq!(human_bytes(1023), "1023B");
    }

    #[test]
    fn test_human_bytes_kilobytes() {
        assert_eq!(human_bytes(1024), "1.0KB");
        assert_eq!(human_bytes(1536), "1.5KB");
    }

    #[test]
    fn test_human_bytes_megabytes() {
        assert_eq!(human_bytes(1_048_576), "1.0MB");
        assert_eq!(human_bytes(5 * 1_048_576 + 1_048_576 / 2), "5.5MB");
    }

    #[test]
    fn test_human_bytes_large_values() {
        assert_eq!(human_bytes(1u64 << 30), "1.0GB");
        assert_eq!(human_bytes(1u64 << 40), "1.0TB");
        assert_eq!(human_bytes(u64::MAX), "16.0EB");
    }
}
