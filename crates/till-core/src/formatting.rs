/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use till_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    // Build the thousands-separated integer portion.
    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals.
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..]; // ".50"
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a monetary amount in Malaysian Ringgit with two decimal places and
/// thousands separators.
///
/// # Examples
///
/// ```
/// use till_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56),  "RM1,234.56");
/// assert_eq!(format_currency(0.0),      "RM0.00");
/// assert_eq!(format_currency(-9.99),    "RM-9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("RM-{}", format_number(amount.abs(), 2))
    } else {
        format!("RM{}", format_number(amount, 2))
    }
}

/// Format decimal hours the way the attendance store records them: exactly
/// two decimal places, no grouping.
///
/// # Examples
///
/// ```
/// use till_core::formatting::format_hours;
///
/// assert_eq!(format_hours(8.0),  "8.00");
/// assert_eq!(format_hours(7.5),  "7.50");
/// assert_eq!(format_hours(0.25), "0.25");
/// ```
pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

/// Format a unit count for best-seller listings.
///
/// # Examples
///
/// ```
/// use till_core::formatting::format_units;
///
/// assert_eq!(format_units(1), "1 unit");
/// assert_eq!(format_units(5), "5 units");
/// ```
pub fn format_units(count: u32) -> String {
    if count == 1 {
        "1 unit".to_string()
    } else {
        format!("{} units", count)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
