//! Display formatting for amounts shown on the page and in the CSV export.

/// Whole units with comma thousands separators: `1234567.8` → `"1,234,568"`
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Two decimals, used for the lakhs figure
pub fn format_lakhs(value: f64) -> String {
    format!("{:.2}", value)
}

/// Experience as a decimal that always shows a fractional part: `5.0`, `2.5`
///
/// Very large or small values switch to scientific notation with a signed,
/// two-digit exponent: `1e+16`, `1.5e-05`.
pub fn format_years(value: f64) -> String {
    let shortest = format!("{:?}", value);
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => shortest,
    }
}
