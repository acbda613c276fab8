//! DICOM DA value formatting.
//!
//! Archive dates are fixed-width `YYYYMMDD` strings, which makes them
//! sortable as plain text. Display output uses the hyphenated form.

/// Reformats a compact 8-character DICOM date (`20240115`) into its
/// hyphenated form (`2024-01-15`).
///
/// Anything that is not exactly 8 ASCII characters is passed through
/// unchanged; an empty input stays empty. This never fails, malformed
/// values simply come back as-is.
pub fn format_dicom_date(raw: &str) -> String {
    if raw.len() == 8 && raw.is_ascii() {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact_date() {
        assert_eq!(format_dicom_date("20240115"), "2024-01-15");
        assert_eq!(format_dicom_date("19991231"), "1999-12-31");
    }

    #[test]
    fn test_pass_through_other_lengths() {
        assert_eq!(format_dicom_date(""), "");
        assert_eq!(format_dicom_date("2024"), "2024");
        assert_eq!(format_dicom_date("2024-01-15"), "2024-01-15");
        assert_eq!(format_dicom_date("202401150"), "202401150");
    }

    #[test]
    fn test_compact_dates_sort_like_formatted_dates() {
        let mut raw = vec!["20240102", "20231231", "20240101"];
        raw.sort_unstable();
        let formatted: Vec<String> = raw.iter().map(|d| format_dicom_date(d)).collect();
        assert_eq!(formatted, vec!["2023-12-31", "2024-01-01", "2024-01-02"]);
    }
}
