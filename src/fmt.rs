/// Plain two-decimal amount as used in exports and the itemized report.
/// Never renders negative zero.
pub fn amount(val: f64) -> String {
    let rounded = (val * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0.00".to_string();
    }
    format!("{rounded:.2}")
}

/// Dollar amount with thousands separators for terminal tables: $1,234.56
pub fn money(val: f64) -> String {
    let plain = amount(val.abs());
    let (int_part, dec_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if amount(val).starts_with('-') { "-" } else { "" };
    format!("{sign}${grouped}.{dec_part}")
}
