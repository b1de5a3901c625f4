//! Formatting and HTML helpers

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    for (count, c) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Format a money amount with two decimals and thousands separators
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.trunc();
    let cents = ((rounded - whole).abs() * Decimal::from(100))
        .trunc()
        .to_u32()
        .unwrap_or(0);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{:02}", sign, format_number(whole.abs().normalize()), cents)
}

/// Escape text for inclusion in HTML fragments
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
