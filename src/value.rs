use std::fmt::{self, Display, Formatter};

/// A value produced by evaluating a guest expression.
///
/// The [`Display`] implementation mirrors the guest's default string
/// conversion and is what log messages use unless the host overrides
/// [`Evaluator::to_display_text`](crate::Evaluator::to_display_text).
#[derive(Clone, Debug, PartialEq)]
pub enum GuestValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    /// Tables, functions, userdata and other values only known by address.
    Reference { type_name: String, address: usize },
}
impl Display for GuestValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{}", format_number(*value)),
            Self::String(value) => write!(f, "{value}"),
            Self::Reference { type_name, address } => write!(f, "{type_name}: {address:#x}"),
        }
    }
}

/// Formats like C's `%.14g` and appends `.0` to integral results, so that
/// floats stay distinguishable from integers.
fn format_number(number: f64) -> String {
    const PRECISION: i32 = 14;

    if number.is_nan() {
        return if number.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if number.is_infinite() {
        return if number < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    // The exponent after rounding to the significant digits.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, number);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();

    let text = if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            strip_fraction_zeros(mantissa),
            exponent.abs(),
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        strip_fraction_zeros(&format!("{number:.decimals$}")).to_string()
    };

    if text.bytes().all(|byte| byte.is_ascii_digit() || byte == b'-') {
        format!("{text}.0")
    } else {
        text
    }
}
fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

impl GuestValue {
    /// Only the boolean `true` counts. Guest truthiness (where any non-nil,
    /// non-false value is true) doesn't apply to conditions.
    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) | Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Reference { type_name, .. } => type_name,
        }
    }
}

#[cfg(test)]
mod test {
    use super::GuestValue;

    #[test]
    fn only_boolean_true_is_true() {
        assert!(GuestValue::Boolean(true).is_true());
        assert!(!GuestValue::Boolean(false).is_true());
        assert!(!GuestValue::Integer(1).is_true());
        assert!(!GuestValue::String("true".to_string()).is_true());
        assert!(!GuestValue::Nil.is_true());
    }

    #[test]
    fn display_matches_guest_conversion() {
        assert_eq!(GuestValue::Nil.to_string(), "nil");
        assert_eq!(GuestValue::Boolean(false).to_string(), "false");
        assert_eq!(GuestValue::Integer(-42).to_string(), "-42");
        assert_eq!(GuestValue::Number(1.5).to_string(), "1.5");
        assert_eq!(GuestValue::Number(1.0).to_string(), "1.0");
        assert_eq!(GuestValue::String("hi".to_string()).to_string(), "hi");
        assert_eq!(
            GuestValue::Reference {
                type_name: "table".to_string(),
                address: 0x1f00,
            }
            .to_string(),
            "table: 0x1f00",
        );
    }

    #[test]
    fn numbers_use_fourteen_significant_digits() {
        let cases = [
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (-3.0, "-3.0"),
            (0.1, "0.1"),
            (1.0 / 3.0, "0.33333333333333"),
            (100.25, "100.25"),
            (1e13, "10000000000000.0"),
            (1e14, "1e+14"),
            (1e20, "1e+20"),
            (123_456_789_012_345_680.0, "1.2345678901235e+17"),
            (0.0001, "0.0001"),
            (0.000_012_5, "1.25e-05"),
            (2.5e-300, "2.5e-300"),
            (f64::INFINITY, "inf"),
            (f64::NEG_INFINITY, "-inf"),
            (f64::NAN, "nan"),
        ];
        for (number, expected) in cases {
            assert_eq!(GuestValue::Number(number).to_string(), expected, "{number:?}");
        }
    }
}
