//! Conversions that follow the built-in number and string semantics
//! flows promise (`Number()`, `parseFloat`, `toFixed`, relative indices, ...)

use flowcore::{exponent_with_sign, format_number, ValidationError};

const MAX_RADIX_FRACTION_DIGITS: usize = 20;

/// `Number(string)`
pub(crate) fn string_to_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.starts_with(['+', '-']) {
                return f64::NAN;
            }
            return u128::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if numeric {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `parseFloat(string)`: the longest numeric prefix, or NaN
pub(crate) fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let (sign, body) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if body.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = body.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let integer_end = digits_from(0);
    let mut end = integer_end;
    let mut seen_digit = integer_end > 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_end = digits_from(end + 1);
        seen_digit |= fraction_end > end + 1;
        end = fraction_end;
    }
    if !seen_digit {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_start = end + 1;
        if exponent_start < bytes.len() && matches!(bytes[exponent_start], b'+' | b'-') {
            exponent_start += 1;
        }
        let exponent_end = digits_from(exponent_start);
        if exponent_end > exponent_start {
            end = exponent_end;
        }
    }
    body[..end]
        .parse::<f64>()
        .map_or(f64::NAN, |n| sign * n)
}

/// `Math.round`: halves round towards +Infinity
pub(crate) fn js_round(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// `Math.min` for two operands; NaN wins
pub(crate) fn js_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// `Math.max` for two operands; NaN wins
pub(crate) fn js_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// `Math.sign`
pub(crate) fn js_sign(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        n
    } else {
        n.signum()
    }
}

pub(crate) fn to_fixed(n: f64, digits: i32) -> Result<String, ValidationError> {
    if !(0..=100).contains(&digits) {
        return Err(ValidationError::Range(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(format_number(n));
    }
    let body = fixed_half_up(n.abs(), digits as usize);
    Ok(if n < 0.0 { format!("-{}", body) } else { body })
}

pub(crate) fn to_exponential(n: f64, digits: Option<i32>) -> Result<String, ValidationError> {
    if let Some(digits) = digits {
        if !(0..=100).contains(&digits) {
            return Err(ValidationError::Range(
                "toExponential() argument must be between 0 and 100".to_string(),
            ));
        }
    }
    if !n.is_finite() {
        return Ok(format_number(n));
    }
    let Some(digits) = digits else {
        return Ok(exponent_with_sign(&format!("{:e}", n)));
    };
    let (significand, exponent) = significant_half_up(n.abs(), digits as usize + 1);
    Ok(signed(n, scientific(&significand, exponent)))
}

pub(crate) fn to_precision(n: f64, precision: Option<i32>) -> Result<String, ValidationError> {
    let Some(precision) = precision else {
        return Ok(format_number(n));
    };
    if !n.is_finite() {
        return Ok(format_number(n));
    }
    if !(1..=100).contains(&precision) {
        return Err(ValidationError::Range(
            "toPrecision() argument must be between 1 and 100".to_string(),
        ));
    }

    let (significand, exponent) = significant_half_up(n.abs(), precision as usize);
    if exponent < -6 || exponent >= precision {
        return Ok(signed(n, scientific(&significand, exponent)));
    }
    let body = if exponent >= 0 {
        let (integer, fraction) = significand.split_at(exponent as usize + 1);
        if fraction.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, fraction)
        }
    } else {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), significand)
    };
    Ok(signed(n, body))
}

/// Decimal places that render any `f64` exactly
const EXACT_DIGITS: usize = 1100;

/// `abs` with `digits` fraction places; an exact half rounds up
fn fixed_half_up(abs: f64, digits: usize) -> String {
    let exact = format!("{:.*}", digits + EXACT_DIGITS, abs);
    let (integer, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, dropped) = fraction.split_at(digits.min(fraction.len()));

    let mut all: Vec<u8> = integer.bytes().chain(kept.bytes()).collect();
    if rounds_up(dropped.as_bytes()) {
        carry(&mut all);
    }
    let (integer, fraction) = all.split_at(all.len() - digits);
    let integer: String = integer.iter().map(|&b| char::from(b)).collect();
    if fraction.is_empty() {
        integer
    } else {
        let fraction: String = fraction.iter().map(|&b| char::from(b)).collect();
        format!("{}.{}", integer, fraction)
    }
}

/// The first `count` significant digits of `abs`, halves rounded up, with the
/// decimal exponent of the leading digit
fn significant_half_up(abs: f64, count: usize) -> (String, i32) {
    if abs == 0.0 {
        return ("0".repeat(count), 0);
    }
    let exact = format!("{:.*e}", EXACT_DIGITS, abs);
    let (mantissa, exponent) = exact.split_once('e').unwrap_or((exact.as_str(), "0"));
    let mut exponent: i32 = exponent.parse().unwrap_or(0);

    let all: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let (kept, dropped) = all.split_at(count.min(all.len()));
    let mut digits = kept.to_vec();
    if rounds_up(dropped) && carry(&mut digits) {
        digits.pop();
        exponent += 1;
    }
    (digits.iter().map(|&b| char::from(b)).collect(), exponent)
}

fn rounds_up(dropped: &[u8]) -> bool {
    dropped.first().is_some_and(|&digit| digit >= b'5')
}

/// Adds one unit in the last place; true when a new leading digit appeared
fn carry(digits: &mut Vec<u8>) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return false;
        }
    }
    digits.insert(0, b'1');
    true
}

fn scientific(significand: &str, exponent: i32) -> String {
    let (lead, rest) = significand.split_at(1);
    let sign = if exponent < 0 { '-' } else { '+' };
    if rest.is_empty() {
        format!("{}e{}{}", lead, sign, exponent.abs())
    } else {
        format!("{}.{}e{}{}", lead, rest, sign, exponent.abs())
    }
}

fn signed(n: f64, body: String) -> String {
    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

pub(crate) fn check_radix(radix: i32) -> Result<u32, ValidationError> {
    if (2..=36).contains(&radix) {
        Ok(radix as u32)
    } else {
        Err(ValidationError::Range(
            "toString() radix must be between 2 and 36".to_string(),
        ))
    }
}

/// `Number.prototype.toString(radix)` for a validated radix
pub(crate) fn number_to_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return format_number(n);
    }
    let base = f64::from(radix);
    let mut integer = n.abs().trunc();
    let mut fraction = n.abs() - integer;

    let mut digits = Vec::new();
    while integer >= 1.0 {
        digits.push(digit_char((integer % base) as u32, radix));
        integer = (integer / base).trunc();
    }
    if digits.is_empty() {
        digits.push('0');
    }
    digits.reverse();
    let mut out: String = digits.into_iter().collect();

    if fraction > 0.0 {
        out.push('.');
        for _ in 0..MAX_RADIX_FRACTION_DIGITS {
            fraction *= base;
            let digit = fraction.trunc() as u32;
            out.push(digit_char(digit, radix));
            fraction -= f64::from(digit);
            if fraction <= 0.0 {
                break;
            }
        }
    }

    if n < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// `BigInt.prototype.toString(radix)` for a validated radix
pub(crate) fn bigint_to_radix(n: i128, radix: u32) -> String {
    let mut magnitude = n.unsigned_abs();
    let base = u128::from(radix);
    let mut digits = Vec::new();
    loop {
        digits.push(digit_char((magnitude % base) as u32, radix));
        magnitude /= base;
        if magnitude == 0 {
            break;
        }
    }
    if n < 0 {
        digits.push('-');
    }
    digits.into_iter().rev().collect()
}

fn digit_char(digit: u32, radix: u32) -> char {
    char::from_digit(digit, radix).unwrap_or('0')
}

/// `toLocaleString()` with en-US grouping and at most three fraction digits
pub(crate) fn to_locale_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let rounded = fixed_half_up(n.abs(), 3);
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + fraction.len() + 1);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    if n < 0.0 && grouped != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Resolve a possibly negative index against `len`, clamped to `0..=len`
pub(crate) fn relative_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    if index < 0 {
        (len + index).max(0) as usize
    } else {
        index.min(len) as usize
    }
}

/// Clamp an index to `0..=len` without counting from the end
pub(crate) fn clamp_index(index: i64, len: usize) -> usize {
    index.clamp(0, len as i64) as usize
}

/// Integer argument from a dynamic number (`NaN` becomes 0)
pub(crate) fn to_integer(n: f64) -> i64 {
    if n.is_nan() {
        0
    } else {
        n as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", 42.0)]
    #[case("  3.5 ", 3.5)]
    #[case("", 0.0)]
    #[case("0x1A", 26.0)]
    #[case("-Infinity", f64::NEG_INFINITY)]
    #[case("1e3", 1000.0)]
    fn number_conversion(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(string_to_number(input), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("12px")]
    #[case("inf")]
    #[case("0x+1")]
    fn number_conversion_rejects(#[case] input: &str) {
        assert!(string_to_number(input).is_nan());
    }

    #[rstest]
    #[case("12px", 12.0)]
    #[case("  -3.25e2abc", -325.0)]
    #[case(".5", 0.5)]
    #[case("1e", 1.0)]
    #[case("Infinityx", f64::INFINITY)]
    fn float_prefixes(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_float(input), expected);
    }

    #[test]
    fn float_prefix_without_digits_is_nan() {
        assert!(parse_float("px").is_nan());
        assert!(parse_float(".").is_nan());
    }

    #[test]
    fn rounding_matches_math_round() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(0.49999999999999994), 0.0);
    }

    #[test]
    fn fixed_exponential_and_precision() {
        assert_eq!(to_fixed(3.14159, 2).unwrap(), "3.14");
        assert!(to_fixed(1.0, 101).is_err());
        assert_eq!(to_exponential(12345.0, Some(2)).unwrap(), "1.23e+4");
        assert_eq!(to_exponential(0.00015, None).unwrap(), "1.5e-4");
        assert_eq!(to_precision(123.456, Some(4)).unwrap(), "123.5");
        assert_eq!(to_precision(123456.0, Some(2)).unwrap(), "1.2e+5");
        assert_eq!(to_precision(0.0, Some(3)).unwrap(), "0.00");
    }

    #[rstest]
    #[case(2.5, 0, "3")]
    #[case(0.125, 2, "0.13")]
    #[case(-2.5, 0, "-3")]
    #[case(0.5, 0, "1")]
    #[case(1.005, 2, "1.00")]
    #[case(9.95, 1, "9.9")]
    #[case(99.5, 0, "100")]
    #[case(-0.0001, 2, "-0.00")]
    fn fixed_ties_round_away_from_zero(
        #[case] n: f64,
        #[case] digits: i32,
        #[case] expected: &str,
    ) {
        assert_eq!(to_fixed(n, digits).unwrap(), expected);
    }

    #[rstest]
    #[case(2.5, 1, "3")]
    #[case(-2.5, 1, "-3")]
    #[case(99.99, 3, "100")]
    #[case(0.000123, 2, "0.00012")]
    #[case(0.0000001234, 2, "1.2e-7")]
    fn precision_ties_round_away_from_zero(
        #[case] n: f64,
        #[case] precision: i32,
        #[case] expected: &str,
    ) {
        assert_eq!(to_precision(n, Some(precision)).unwrap(), expected);
    }

    #[rstest]
    #[case(2.5, 0, "3e+0")]
    #[case(-2.5, 0, "-3e+0")]
    #[case(0.125, 1, "1.3e-1")]
    #[case(0.0, 2, "0.00e+0")]
    #[case(999.5, 2, "1.00e+3")]
    fn exponential_ties_round_away_from_zero(
        #[case] n: f64,
        #[case] digits: i32,
        #[case] expected: &str,
    ) {
        assert_eq!(to_exponential(n, Some(digits)).unwrap(), expected);
    }

    #[test]
    fn radix_rendering() {
        assert_eq!(number_to_radix(255.0, 16), "ff");
        assert_eq!(number_to_radix(-5.0, 2), "-101");
        assert_eq!(number_to_radix(0.5, 2), "0.1");
        assert_eq!(bigint_to_radix(-255, 16), "-ff");
        assert_eq!(bigint_to_radix(0, 2), "0");
        assert!(check_radix(1).is_err());
    }

    #[test]
    fn locale_grouping() {
        assert_eq!(to_locale_string(1234567.891), "1,234,567.891");
        assert_eq!(to_locale_string(-1000.0), "-1,000");
        assert_eq!(to_locale_string(0.1), "0.1");
        assert_eq!(to_locale_string(0.0625), "0.063");
    }

    #[test]
    fn relative_indices() {
        assert_eq!(relative_index(-2, 5), 3);
        assert_eq!(relative_index(-9, 5), 0);
        assert_eq!(relative_index(9, 5), 5);
        assert_eq!(clamp_index(-1, 5), 0);
    }
}
