use once_cell::sync::Lazy;
use regex::Regex;

// A run of exactly four digits, not embedded in a longer digit run
static FOUR_DIGIT_RUN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").ok());

/// Parse a graduation year from a free-form spreadsheet cell.
///
/// Numeric cells (`2015`, `2015.0`) are coerced first. Anything else falls
/// back to the first run of exactly four ASCII digits, so `"Class of 2015"`
/// yields 2015. Returns `None` instead of failing.
pub fn parse_graduation_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if value.fract() == 0.0 && (1000.0..=9999.0).contains(&value) {
                Some(value as i32)
            } else {
                first_four_digit_run(&value.to_string())
            }
        }
        _ => first_four_digit_run(raw),
    }
}

fn first_four_digit_run(text: &str) -> Option<i32> {
    let regex = FOUR_DIGIT_RUN.as_ref()?;
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_years() {
        assert_eq!(parse_graduation_year("2015"), Some(2015));
        assert_eq!(parse_graduation_year("2015.0"), Some(2015));
        assert_eq!(parse_graduation_year(" 1998 "), Some(1998));
    }

    #[test]
    fn test_compound_strings() {
        assert_eq!(parse_graduation_year("Class of 2015"), Some(2015));
        assert_eq!(parse_graduation_year("'09 / 2009"), Some(2009));
        assert_eq!(parse_graduation_year("2015-2017"), Some(2015));
    }

    #[test]
    fn test_unparsable_years_are_unset() {
        assert_eq!(parse_graduation_year("unknown"), None);
        assert_eq!(parse_graduation_year(""), None);
        assert_eq!(parse_graduation_year("15"), None);
        assert_eq!(parse_graduation_year("NaN"), None);
        assert_eq!(parse_graduation_year("id 201512"), None);
    }
}
