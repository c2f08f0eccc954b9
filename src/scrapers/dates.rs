//! Publish date normalization.
//!
//! Feeds use whatever date format they like; the byline always shows
//! `D/M/YY` without leading zeros.

use crate::error::ExtractError;
use chrono::{NaiveDate, NaiveDateTime};

/// Short byline form of a date, e.g. `1/4/23`.
pub const SHORT_FORMAT: &str = "%-d/%-m/%y";

/// Parse `raw` with the strftime-style `format` and return its calendar date.
///
/// Formats carrying a time of day and formats carrying only a date are both
/// accepted. A numeric offset (`%z`) is parsed and ignored, so the date is
/// the one printed in the feed, and a `Z` suffix reads as UTC for formats
/// ending in `%z` or `%:z`. A trailing named zone (`%Z`, e.g. `GMT`) is
/// dropped along with the last word of `raw`.
pub fn parse_date(raw: &str, format: &str) -> Result<NaiveDate, ExtractError> {
    let failure = || ExtractError::DateFormat {
        raw: raw.to_string(),
        format: format.to_string(),
    };

    let mut text = raw.trim();
    let mut fmt = format.trim();
    if let Some(stripped) = fmt.strip_suffix("%Z") {
        fmt = stripped.trim_end();
        text = match text.rsplit_once(char::is_whitespace) {
            Some((head, _zone)) => head.trim_end(),
            None => return Err(failure()),
        };
    }

    let zulu;
    if fmt.ends_with("%z") || fmt.ends_with("%:z") {
        if let Some(head) = text.strip_suffix(['Z', 'z']) {
            zulu = format!("{}+00:00", head);
            text = &zulu;
        }
    }

    NaiveDateTime::parse_from_str(text, fmt)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(text, fmt))
        .map_err(|_| failure())
}

/// Parse with the feed's format and re-emit in [`SHORT_FORMAT`].
pub fn reformat(raw: &str, format: &str) -> Result<String, ExtractError> {
    Ok(parse_date(raw, format)?.format(SHORT_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date() {
        assert_eq!(reformat("2023-04-01", "%Y-%m-%d").unwrap(), "1/4/23");
    }

    #[test]
    fn test_rfc822_with_numeric_offset() {
        assert_eq!(
            reformat("Mon, 05 Jun 2023 23:30:00 -0500", "%a, %d %b %Y %H:%M:%S %z").unwrap(),
            "5/6/23"
        );
    }

    #[test]
    fn test_rfc822_with_named_zone() {
        assert_eq!(
            reformat("Mon, 05 Jun 2023 10:00:00 GMT", "%a, %d %b %Y %H:%M:%S %Z").unwrap(),
            "5/6/23"
        );
    }

    #[test]
    fn test_atom_timestamp() {
        assert_eq!(
            reformat("2023-12-25T08:15:00Z", "%Y-%m-%dT%H:%M:%SZ").unwrap(),
            "25/12/23"
        );
    }

    #[test]
    fn test_zulu_suffix_with_offset_formats() {
        for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%:z"] {
            assert_eq!(
                reformat("2023-12-25T08:15:00Z", format).unwrap(),
                "25/12/23",
                "{format}"
            );
            assert_eq!(
                reformat("2023-12-25T08:15:00+01:00", format).unwrap(),
                "25/12/23",
                "{format}"
            );
        }
    }

    #[test]
    fn test_same_date_whatever_the_input_format() {
        let inputs = [
            ("2023-04-01", "%Y-%m-%d"),
            ("01/04/2023", "%d/%m/%Y"),
            ("04.01.2023", "%m.%d.%Y"),
            ("Apr 01, 2023", "%b %d, %Y"),
            ("Sat, 01 Apr 2023 12:00:00 +0000", "%a, %d %b %Y %H:%M:%S %z"),
        ];
        let expected = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        for (raw, format) in inputs {
            assert_eq!(parse_date(raw, format).unwrap(), expected, "{raw} / {format}");
            assert_eq!(reformat(raw, format).unwrap(), "1/4/23");
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(reformat("\n  2023-04-01 \n", "%Y-%m-%d").unwrap(), "1/4/23");
    }

    #[test]
    fn test_mismatch_is_a_date_format_error() {
        let err = reformat("April first", "%Y-%m-%d").unwrap_err();
        assert!(matches!(err, ExtractError::DateFormat { .. }));
        assert_eq!(err.kind(), "date_format");
    }
}
