// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Parse a string-like value into `i32` while being forgiving about
/// whitespace and missing fields.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

/// Parse the differentiated-assessment flag. CSV exports are inconsistent
/// about it, so both numeric and textual spellings are accepted.
pub fn parse_bool_safe(s: Option<&str>) -> Option<bool> {
    let s = s?.trim().to_lowercase();
    match s.as_str() {
        "1" | "да" | "true" => Some(true),
        "0" | "нет" | "false" => Some(false),
        _ => None,
    }
}

/// First year of an academic-year string like `"2023-2024"`.
///
/// Returns 0 when the field is missing or malformed; the caller only uses the
/// value to order competency versions, so 0 simply means "oldest".
pub fn parse_year_start(s: Option<&str>) -> i32 {
    s.and_then(|v| v.trim().split('-').next())
        .and_then(|y| y.trim().parse::<i32>().ok())
        .unwrap_or(0)
}

/// Flatten `(course, semester-in-course)` to a 1..8 semester number.
///
/// Course 2, semester 1 is the 3rd semester overall. Out-of-range inputs
/// return `None` so the loader can count the row as a parse error.
pub fn flat_semester(course: i32, semester_in_course: i32) -> Option<u8> {
    if !(1..=4).contains(&course) || !(1..=2).contains(&semester_in_course) {
        return None;
    }
    Some(((course - 1) * 2 + semester_in_course) as u8)
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Dense ranks for `values`, best (largest) value first.
///
/// Ties share a rank and the next distinct value takes the immediately
/// following integer, so ranks never have gaps. The result is positionally
/// parallel to the input.
pub fn dense_ranks_desc(values: &[f64]) -> Vec<usize> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    distinct.dedup();
    values
        .iter()
        .map(|v| {
            distinct
                .iter()
                .position(|d| d == v)
                .map(|i| i + 1)
                .unwrap_or(0)
        })
        .collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_semester_converts_course_pairs() {
        assert_eq!(flat_semester(1, 1), Some(1));
        assert_eq!(flat_semester(2, 1), Some(3));
        assert_eq!(flat_semester(4, 2), Some(8));
    }

    #[test]
    fn flat_semester_rejects_out_of_range() {
        assert_eq!(flat_semester(0, 1), None);
        assert_eq!(flat_semester(5, 1), None);
        assert_eq!(flat_semester(2, 3), None);
    }

    #[test]
    fn bool_flag_accepts_common_spellings() {
        assert_eq!(parse_bool_safe(Some("1")), Some(true));
        assert_eq!(parse_bool_safe(Some("Да")), Some(true));
        assert_eq!(parse_bool_safe(Some(" нет ")), Some(false));
        assert_eq!(parse_bool_safe(Some("0")), Some(false));
        assert_eq!(parse_bool_safe(Some("maybe")), None);
        assert_eq!(parse_bool_safe(None), None);
    }

    #[test]
    fn year_start_defaults_to_zero() {
        assert_eq!(parse_year_start(Some("2023-2024")), 2023);
        assert_eq!(parse_year_start(Some("garbage")), 0);
        assert_eq!(parse_year_start(None), 0);
    }

    #[test]
    fn dense_ranks_share_rank_on_ties() {
        let ranks = dense_ranks_desc(&[4.5, 3.0, 4.5, 2.0]);
        assert_eq!(ranks, vec![1, 2, 1, 3]);
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert!((average(&[2.0, 4.0]) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert!((round2(66.666_666) - 66.67).abs() < 1e-9);
        assert!((round2(33.333_333) - 33.33).abs() < 1e-9);
    }
}
