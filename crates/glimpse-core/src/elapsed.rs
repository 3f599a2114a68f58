//! Elapsed-time bucketing for history display.

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Bucket an elapsed duration (seconds) into the largest unit that is
/// still >= 1, with integer truncation: `90 -> "1m"`, `59 -> "59s"`.
///
/// Pure and total over i64; negative input (clock skew between writer and
/// reader) clamps to `"0s"`.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < MINUTE {
        format!("{seconds}s")
    } else if seconds < HOUR {
        format!("{}m", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{}h", seconds / HOUR)
    } else {
        format!("{}d", seconds / DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_values() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(45), "45s");
        assert_eq!(format_elapsed(59), "59s");
        assert_eq!(format_elapsed(90), "1m");
        assert_eq!(format_elapsed(7_200), "2h");
        assert_eq!(format_elapsed(172_800), "2d");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_elapsed(60), "1m");
        assert_eq!(format_elapsed(3_599), "59m");
        assert_eq!(format_elapsed(3_600), "1h");
        assert_eq!(format_elapsed(86_399), "23h");
        assert_eq!(format_elapsed(86_400), "1d");
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(format_elapsed(-5), "0s");
    }
}
