//! Currency display helpers.

/// Group the integer part of `value` the South-Asian way: the last three
/// digits, then pairs (`1234567.89` -> `"12,34,567"`).
///
/// The fraction is truncated. Non-finite input yields `"N/A"`.
pub fn group_south_asian(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let whole = value.trunc() as i128;
    let digits = whole.unsigned_abs().to_string();
    let sign = if whole < 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}{digits}");
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2 + 1);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped},{last_three}")
}
