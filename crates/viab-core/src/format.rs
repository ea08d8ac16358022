//! Brazilian currency and percentage formatting, independent of locale.

/// Renders `value` as `1.234,56`: dot thousands separators, comma decimal
/// mark, two decimals. Non-finite values render as `0,00`.
pub fn format_brl(value: f64) -> String {
    format_decimal(value, 2)
}

/// Renders a percentage as `12,50%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value, 2))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_decimal(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return format!("0,{}", "0".repeat(decimals as usize));
    }

    let scale = 10_u128.pow(decimals);
    let scaled = (value.abs() * scale as f64).round() as u128;
    let integer = (scaled / scale).to_string();
    let fraction = scaled % scale;

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && scaled > 0 { "-" } else { "" };
    if decimals == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{fraction:0width$}", width = decimals as usize)
    }
}
