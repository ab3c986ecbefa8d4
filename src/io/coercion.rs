/// Outcome of reading one cell as a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Value(f64),
    /// Blank or an explicit missing-value marker
    Null,
    /// Text that is not a number, or one that overflows to infinity
    Invalid,
}

const NULL_MARKERS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

pub fn coerce_numeric(raw: &str) -> Coerced {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        return Coerced::Null;
    }

    match trimmed.replace(',', "").parse::<f64>() {
        Ok(value) if value.is_nan() => Coerced::Null,
        Ok(value) if value.is_infinite() => Coerced::Invalid,
        Ok(value) => Coerced::Value(value),
        Err(_) => Coerced::Invalid,
    }
}

impl Coerced {
    /// Collapse to a float, `NaN` for anything missing or invalid
    pub fn or_nan(self) -> f64 {
        match self {
            Coerced::Value(value) => value,
            Coerced::Null | Coerced::Invalid => f64::NAN,
        }
    }
}
