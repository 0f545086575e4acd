//! Parsing of human-authored value strings.

/// Returns true for tokens that mean "no value published".
pub fn is_unknown(token: Option<&str>) -> bool {
    match token.map(str::trim) {
        None => true,
        Some(value) => {
            value.is_empty()
                || value.eq_ignore_ascii_case("n/a")
                || value.eq_ignore_ascii_case("unknown")
        }
    }
}

/// Converts a value token into a plain amount.
///
/// - `None` and the unknown sentinel give `0`.
/// - Thousands separators are stripped.
/// - One trailing `k`, `m` or `b` (any case) scales by a thousand, million or billion.
/// - Anything that is still not a finite number gives `0`.
///
/// Negative literals pass through unchanged.
pub fn normalize(token: Option<&str>) -> f64 {
    let Some(raw) = token else {
        return 0.0;
    };
    if is_unknown(Some(raw)) {
        return 0.0;
    }

    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();

    let (number, multiplier) = split_magnitude(&cleaned);
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let scaled = value * multiplier;
            if scaled.is_finite() {
                scaled
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn split_magnitude(text: &str) -> (&str, f64) {
    let Some(last) = text.chars().last() else {
        return (text, 1.0);
    };
    let multiplier = match last.to_ascii_lowercase() {
        'k' => 1_000.0,
        'm' => 1_000_000.0,
        'b' => 1_000_000_000.0,
        _ => return (text, 1.0),
    };
    (&text[..text.len() - last.len_utf8()], multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_suffixes() {
        assert_eq!(normalize(Some("2.5m")), 2_500_000.0);
        assert_eq!(normalize(Some("450k")), 450_000.0);
        assert_eq!(normalize(Some("450K")), 450_000.0);
        assert_eq!(normalize(Some("1.2B")), 1_200_000_000.0);
    }

    #[test]
    fn separators_and_plain_numbers() {
        assert_eq!(normalize(Some("1,234")), 1234.0);
        assert_eq!(normalize(Some(" 12,500,000 ")), 12_500_000.0);
        assert_eq!(normalize(Some("75")), 75.0);
    }

    #[test]
    fn unknown_and_garbage_are_zero() {
        assert_eq!(normalize(None), 0.0);
        assert_eq!(normalize(Some("N/A")), 0.0);
        assert_eq!(normalize(Some("n/a")), 0.0);
        assert_eq!(normalize(Some("")), 0.0);
        assert_eq!(normalize(Some("lots")), 0.0);
        assert_eq!(normalize(Some("m")), 0.0);
        assert_eq!(normalize(Some("2.5x")), 0.0);
        assert_eq!(normalize(Some("inf")), 0.0);
        assert_eq!(normalize(Some("NaN")), 0.0);
    }

    #[test]
    fn negative_literals_pass_through() {
        assert_eq!(normalize(Some("-3k")), -3_000.0);
    }

    #[test]
    fn unknown_sentinel_detection() {
        assert!(is_unknown(None));
        assert!(is_unknown(Some(" N/A ")));
        assert!(is_unknown(Some("Unknown")));
        assert!(!is_unknown(Some("0")));
        assert!(!is_unknown(Some("1m")));
    }
}
