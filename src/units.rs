//! Unit conversion and display formatting helpers.

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Value immediately followed by its unit: "7.2pH", "200L".
///
/// Whole numbers print without a fractional part, matching how the values
/// were entered.
pub fn format_display_value(value: f64, unit: &str) -> String {
    format!("{}{}", value, unit)
}

/// Range bound for error messages. Always keeps one decimal so that "9.0"
/// reads as a measurement rather than a count.
pub fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Title-case a snake_case key: "dissolved_oxygen" -> "Dissolved Oxygen"
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
