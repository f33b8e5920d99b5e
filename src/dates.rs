//! Conversion between the `DD-MM-YYYY` text people type and the `YYYY-MM-DD`
//! text the database sorts on. Both directions insist on the exact layout
//! before asking chrono whether the day exists, so `5-6-2024` or `15/06/2024`
//! never sneak through chrono's more forgiving parser.

use chrono::NaiveDate;

use crate::error::{BookingError, BookingResult};

/// Layout shown to users in prompts and error messages.
pub const DISPLAY_LAYOUT: &str = "DD-MM-YYYY";
/// Layout used inside the database.
pub const STORAGE_LAYOUT: &str = "YYYY-MM-DD";

const DISPLAY_FORMAT: &str = "%d-%m-%Y";
const STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Convert a display date (`15-06-2024`) into its storage form (`2024-06-15`).
pub fn to_storage(text: &str) -> BookingResult<String> {
    let date = parse_strict(text, &[2, 5], DISPLAY_FORMAT, DISPLAY_LAYOUT)?;
    Ok(date.format(STORAGE_FORMAT).to_string())
}

/// Convert a storage date (`2024-06-15`) back into display form (`15-06-2024`).
pub fn from_storage(text: &str) -> BookingResult<String> {
    let date = parse_strict(text, &[4, 7], STORAGE_FORMAT, STORAGE_LAYOUT)?;
    Ok(date.format(DISPLAY_FORMAT).to_string())
}

fn parse_strict(
    text: &str,
    dashes: &[usize],
    format: &str,
    layout: &'static str,
) -> BookingResult<NaiveDate> {
    let trimmed = text.trim();
    let invalid = || BookingError::InvalidDate {
        input: trimmed.to_string(),
        expected: layout,
    };

    if !matches_layout(trimmed, dashes) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(trimmed, format).map_err(|_| invalid())
}

/// Ten ASCII characters, dashes exactly where expected and digits elsewhere.
fn matches_layout(text: &str, dashes: &[usize]) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| {
            if dashes.contains(&idx) {
                *byte == b'-'
            } else {
                byte.is_ascii_digit()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_dates_survive_a_round_trip() {
        for input in ["15-06-2024", "01-01-2000", "29-02-2024", "31-12-1999"] {
            let stored = to_storage(input).unwrap();
            assert_eq!(from_storage(&stored).unwrap(), input);
        }
    }

    #[test]
    fn converts_to_sortable_storage_form() {
        assert_eq!(to_storage("15-06-2024").unwrap(), "2024-06-15");
        assert_eq!(from_storage("2024-06-15").unwrap(), "15-06-2024");
    }

    #[test]
    fn rejects_days_missing_from_the_calendar() {
        assert!(to_storage("31-02-2024").is_err());
        assert!(to_storage("29-02-2023").is_err());
        assert!(to_storage("00-01-2024").is_err());
        assert!(to_storage("10-13-2024").is_err());
    }

    #[test]
    fn rejects_loose_layouts() {
        for input in ["15/06/2024", "5-06-2024", "15-6-2024", "2024-06-15", "15-06-24", "ab-cd-efgh", ""] {
            assert!(to_storage(input).is_err(), "{input} should be rejected");
        }
        assert!(from_storage("15-06-2024").is_err());
        assert!(from_storage("2024/06/15").is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(to_storage("  15-06-2024 ").unwrap(), "2024-06-15");
    }

    #[test]
    fn error_names_the_expected_layout() {
        let err = to_storage("31-02-2024").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid date '31-02-2024'. Use the DD-MM-YYYY format."
        );
    }
}
