//! Display formatting for prices and product text

use rust_decimal::{Decimal, RoundingStrategy};

/// `₹` followed by the amount in Indian digit grouping (`12,34,567.5`),
/// with at most two fraction digits and no trailing zeros.
pub fn format_inr(price: Decimal) -> String {
    let rounded = price
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::from("₹");
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_indian(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `₹` with exactly two decimals and no grouping, as shown in the admin table
pub fn format_inr_fixed(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("₹{:.2}", rounded)
}

// Last three digits, then pairs: 1234567 -> 12,34,567
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// First `max_chars` characters, with `...` appended when anything was cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Upper-case the first letter of every word
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(dec("0")), "₹0");
        assert_eq!(format_inr(dec("999")), "₹999");
        assert_eq!(format_inr(dec("1000")), "₹1,000");
        assert_eq!(format_inr(dec("123456")), "₹1,23,456");
        assert_eq!(format_inr(dec("1234567.5")), "₹12,34,567.5");
    }

    #[test]
    fn test_format_inr_fraction_digits() {
        assert_eq!(format_inr(dec("45.50")), "₹45.5");
        assert_eq!(format_inr(dec("45.00")), "₹45");
        assert_eq!(format_inr(dec("9.999")), "₹10");
        assert_eq!(format_inr(dec("12.345")), "₹12.35");
    }

    #[test]
    fn test_format_inr_fixed() {
        assert_eq!(format_inr_fixed(dec("45.5")), "₹45.50");
        assert_eq!(format_inr_fixed(dec("1234")), "₹1234.00");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        let long = "a".repeat(60);
        assert_eq!(truncate(&long, 50), format!("{}...", "a".repeat(50)));
        assert_eq!(truncate(&"é".repeat(51), 50), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("otc"), "Otc");
        assert_eq!(capitalize_words("pain relief"), "Pain Relief");
        assert_eq!(capitalize_words(""), "");
    }
}
