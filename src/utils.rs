/// Placeholder tokens in artwork URL templates returned by the search service
const WIDTH_PLACEHOLDER: &str = "{w}";
const HEIGHT_PLACEHOLDER: &str = "{h}";

/// Format a number of seconds as `M:SS`
///
/// Sub-second and minute components are truncated, never rounded.
/// Negative and NaN inputs render as `0:00`.
pub fn format_timestamp(seconds: f64) -> String {
    // `as` saturates: negatives and NaN become 0
    let total = seconds as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse the leading numeric prefix of `raw`, falling back to `0.0`
///
/// Player output is trusted as-is and nobody downstream checks for failure,
/// so this never errors:
/// - leading whitespace is skipped
/// - an optional sign, digits, and one decimal separator are accepted
/// - both `.` and `,` count as the decimal separator (AppleScript coerces
///   reals to text using the user's locale)
/// - an exponent is only taken when digits follow it
/// - anything after the numeric prefix is ignored
/// - no digits at all yields `0.0`
pub fn parse_leading_float(raw: &str) -> f64 {
    let bytes = raw.trim_start().as_bytes();
    let mut normalized = String::with_capacity(bytes.len());
    let mut i = 0;

    if let Some(&sign) = bytes.first() {
        if sign == b'-' || sign == b'+' {
            normalized.push(sign as char);
            i += 1;
        }
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        normalized.push(bytes[i] as char);
        digits += 1;
        i += 1;
    }

    if i < bytes.len() && (bytes[i] == b'.' || bytes[i] == b',') {
        normalized.push('.');
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            normalized.push(bytes[i] as char);
            digits += 1;
            i += 1;
        }
    }

    if digits == 0 {
        return 0.0;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        let mut exponent = String::from("e");
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            exponent.push(bytes[j] as char);
            j += 1;
        }
        let start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            exponent.push(bytes[j] as char);
            j += 1;
        }
        if j > start {
            normalized.push_str(&exponent);
        }
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Substitute the `{w}`/`{h}` placeholders of an artwork template with a square size
pub fn size_artwork_url(template: &str, size: u32) -> String {
    let size = size.to_string();
    template
        .replace(WIDTH_PLACEHOLDER, &size)
        .replace(HEIGHT_PLACEHOLDER, &size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_truncates_components() {
        assert_eq!(format_timestamp(125.7), "2:05");
        assert_eq!(format_timestamp(59.0), "0:59");
        assert_eq!(format_timestamp(59.999), "0:59");
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(3600.0), "60:00");
    }

    #[test]
    fn timestamp_clamps_garbage_to_zero() {
        assert_eq!(format_timestamp(-4.0), "0:00");
        assert_eq!(format_timestamp(f64::NAN), "0:00");
    }

    #[test]
    fn leading_float_accepts_plain_numbers() {
        assert_eq!(parse_leading_float("125.0"), 125.0);
        assert_eq!(parse_leading_float("10"), 10.0);
        assert_eq!(parse_leading_float("  7.25"), 7.25);
        assert_eq!(parse_leading_float("-3.5"), -3.5);
        assert_eq!(parse_leading_float(".5"), 0.5);
    }

    #[test]
    fn leading_float_accepts_comma_separator() {
        assert_eq!(parse_leading_float("125,5"), 125.5);
        assert_eq!(parse_leading_float("0,25"), 0.25);
    }

    #[test]
    fn leading_float_ignores_trailing_garbage() {
        assert_eq!(parse_leading_float("12.5abc"), 12.5);
        assert_eq!(parse_leading_float("42 seconds"), 42.0);
        assert_eq!(parse_leading_float("1.5e"), 1.5);
        assert_eq!(parse_leading_float("1.5e+"), 1.5);
        assert_eq!(parse_leading_float("2E2x"), 200.0);
    }

    #[test]
    fn leading_float_falls_back_to_zero() {
        assert_eq!(parse_leading_float(""), 0.0);
        assert_eq!(parse_leading_float("abc"), 0.0);
        assert_eq!(parse_leading_float("missing value"), 0.0);
        assert_eq!(parse_leading_float("-"), 0.0);
        assert_eq!(parse_leading_float("."), 0.0);
        assert_eq!(parse_leading_float("1e999"), 0.0);
    }

    #[test]
    fn artwork_template_gets_square_size() {
        assert_eq!(
            size_artwork_url("https://is1.mzstatic.com/image-{w}x{h}bb.jpg", 512),
            "https://is1.mzstatic.com/image-512x512bb.jpg"
        );
        assert_eq!(size_artwork_url("no-placeholders.jpg", 512), "no-placeholders.jpg");
    }
}
