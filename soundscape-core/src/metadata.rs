//! Filename-driven recording metadata.
//!
//! Field recorders stamp every clip as `<unit>_<YYYYMMDD>_<HHMMSS>.wav`
//! (e.g. `04213SPOT1_20250602_120000.wav`). Two fixed patterns — an 8-digit
//! date token bounded by underscores and a 6-digit time token immediately
//! before the `.wav` suffix — are the whole contract. Anything else carries
//! no usable timestamp and the file is skipped upstream; this is a closed,
//! bit-exact format, not a heuristic parser.

use std::sync::OnceLock;

use regex::Regex;

/// Capture timestamp parsed from a recording's filename.
///
/// Date fields stay zero-padded text (`"06"`, not `6`) so they round-trip
/// unchanged into the output table; hour and minute are numeric because the
/// downstream diel analysis buckets by them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingMetadata {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: u32,
    pub minute: u32,
}

fn date_token() -> &'static Regex {
    static DATE_TOKEN: OnceLock<Regex> = OnceLock::new();
    DATE_TOKEN.get_or_init(|| Regex::new(r"_(\d{8})_").expect("static pattern"))
}

fn time_token() -> &'static Regex {
    static TIME_TOKEN: OnceLock<Regex> = OnceLock::new();
    TIME_TOKEN.get_or_init(|| Regex::new(r"_(\d{6})\.wav$").expect("static pattern"))
}

/// Extract `{year, month, day, hour, minute}` from a filename.
///
/// Returns `None` when either token is missing so the caller can skip the
/// file and keep the batch going.
pub fn extract(filename: &str) -> Option<RecordingMetadata> {
    let date = date_token().captures(filename)?.get(1)?.as_str().to_owned();
    let time = time_token().captures(filename)?.get(1)?.as_str();

    let hour = time[0..2].parse().ok()?;
    let minute = time[2..4].parse().ok()?;

    Some(RecordingMetadata {
        year: date[0..4].to_owned(),
        month: date[4..6].to_owned(),
        day: date[6..8].to_owned(),
        hour,
        minute,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_filename_parses() {
        let meta = extract("04213SPOT1_20250602_120000.wav").expect("should parse");
        assert_eq!(meta.year, "2025");
        assert_eq!(meta.month, "06");
        assert_eq!(meta.day, "02");
        assert_eq!(meta.hour, 12);
        assert_eq!(meta.minute, 0);
    }

    #[test]
    fn leading_zeroes_survive() {
        let meta = extract("2MM07103_20250330_083000.wav").expect("should parse");
        assert_eq!(meta.month, "03");
        assert_eq!(meta.day, "30");
        assert_eq!(meta.hour, 8);
        assert_eq!(meta.minute, 30);
    }

    #[test]
    fn no_tokens_means_no_metadata() {
        assert_eq!(extract("no_date_here.wav"), None);
    }

    #[test]
    fn date_without_time_is_rejected() {
        assert_eq!(extract("unit_20250602.wav"), None);
        assert_eq!(extract("unit_20250602_1200.wav"), None);
    }

    #[test]
    fn time_token_must_touch_the_suffix() {
        assert_eq!(extract("unit_20250602_120000_extra.wav"), None);
        assert_eq!(extract("unit_20250602_120000.flac"), None);
    }
}
