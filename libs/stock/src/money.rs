/// Two-decimal price string, e.g. `102.00`.
pub fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

/// Reads a price produced by [`format_money`]; anything unparsable counts as zero.
pub fn parse_money(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

/// Signed change from `previous` to `now`, e.g. `+2.00 (+2.00%)`.
///
/// Both sides are money strings so the delta matches what the user saw
/// printed. The percentage is left out when `previous` is zero.
pub fn price_diff(now: &str, previous: &str) -> String {
    let now = parse_money(now);
    let previous = parse_money(previous);

    let diff = round_cents(now - previous);
    if previous == 0.0 {
        return format!("{diff:+.2}");
    }

    let percent = round_cents(diff / previous * 100.0);
    format!("{diff:+.2} ({percent:+.2}%)")
}

// also turns -0.0 into 0.0 so it prints as +0.00
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Display symbol for an ISO 4217 code, falling back to the code itself.
pub fn currency_symbol(code: &str) -> &str {
    match code.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "CHF" => "CHF",
        "CAD" => "CA$",
        "AUD" => "A$",
        "HKD" => "HK$",
        "SEK" | "NOK" | "DKK" => "kr",
        "THB" => "฿",
        "BRL" => "R$",
        "RUB" => "₽",
        "TRY" => "₺",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_money(102.0), "102.00");
        assert_eq!(format_money(0.126), "0.13");
        assert_eq!(format_money(1234.5), "1234.50");
    }

    #[test]
    fn diff_with_percentage() {
        assert_eq!(price_diff("102.00", "100.00"), "+2.00 (+2.00%)");
        assert_eq!(price_diff("98.50", "100.00"), "-1.50 (-1.50%)");
    }

    #[test]
    fn diff_from_zero_has_no_percentage() {
        assert_eq!(price_diff("102.00", "0.00"), "+102.00");
    }

    #[test]
    fn unchanged_price_is_positive_zero() {
        assert_eq!(price_diff("10.10", "10.10"), "+0.00 (+0.00%)");
    }

    #[test]
    fn currency_symbols() {
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("eur"), "€");
        assert_eq!(currency_symbol("XYZ"), "XYZ");
    }
}
