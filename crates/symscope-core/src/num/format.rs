//! Text rendering of [`NumVariant`].

use std::fmt;

use super::NumVariant;

/// Significant digits printed for a `float`.
const FLOAT_DIGITS: usize = 8;
/// Significant digits printed for a `double`.
const DOUBLE_DIGITS: usize = 16;

impl fmt::Display for NumVariant
{
    /// Decimal rendering
    ///
    /// Integers print in full. `float` uses 8 and `double` 16 significant
    /// digits in the shortest of fixed or scientific notation, as C's `%g`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match *self {
            NumVariant::Char(_) | NumVariant::Short(_) | NumVariant::Long(_) | NumVariant::Int(_) => {
                write!(f, "{}", self.as_int())
            }
            NumVariant::UChar(_) | NumVariant::UShort(_) | NumVariant::ULong(_) | NumVariant::UInt(_) => {
                write!(f, "{}", self.as_uint())
            }
            NumVariant::LongLong(v) => write!(f, "{v}"),
            NumVariant::ULongLong(v) => write!(f, "{v}"),
            NumVariant::Float(v) => f.write_str(&general(f64::from(v), FLOAT_DIGITS)),
            NumVariant::Double(v) => f.write_str(&general(v, DOUBLE_DIGITS)),
        }
    }
}

impl NumVariant
{
    /// Hexadecimal rendering with a `0x` prefix
    ///
    /// Signed values print their two's complement bits at `int` width (or
    /// `long long` width for 64-bit values). Floating point values print in
    /// C99 hex-float notation.
    ///
    /// ```rust
    /// use symscope_core::num::NumVariant;
    ///
    /// assert_eq!(NumVariant::from(255u8).to_hex(), "0xff");
    /// assert_eq!(NumVariant::from(-1i8).to_hex(), "0xffffffff");
    /// assert_eq!(NumVariant::from(1.0f64).to_hex(), "0x1p+0");
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String
    {
        match *self {
            NumVariant::Char(_) | NumVariant::Short(_) | NumVariant::Long(_) | NumVariant::Int(_) => {
                format!("{:#x}", self.as_int())
            }
            NumVariant::UChar(_) | NumVariant::UShort(_) | NumVariant::ULong(_) | NumVariant::UInt(_) => {
                format!("{:#x}", self.as_uint())
            }
            NumVariant::LongLong(v) => format!("{v:#x}"),
            NumVariant::ULongLong(v) => format!("{v:#x}"),
            NumVariant::Float(v) => hex_float(f64::from(v)),
            NumVariant::Double(v) => hex_float(v),
        }
    }
}

/// `%.{precision}g`
fn general(value: f64, precision: usize) -> String
{
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round once in scientific form so the exponent reflects the rounding.
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let precision = precision as i32;

    if exponent < -4 || exponent >= precision {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (precision - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str
{
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// `%a` with the shortest exact mantissa.
fn hex_float(value: f64) -> String
{
    if value.is_nan() {
        return "nan".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{sign}inf");
    }

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);

    if biased == 0 && fraction == 0 {
        return format!("{sign}0x0p+0");
    }

    let (lead, exponent) = if biased == 0 { (0, -1022) } else { (1, biased - 1023) };
    let digits = format!("{fraction:013x}");
    let digits = digits.trim_end_matches('0');
    let exp_sign = if exponent < 0 { '-' } else { '+' };

    if digits.is_empty() {
        format!("{sign}0x{lead}p{exp_sign}{}", exponent.abs())
    } else {
        format!("{sign}0x{lead}.{digits}p{exp_sign}{}", exponent.abs())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_general_fixed_notation()
    {
        assert_eq!(general(1.5, DOUBLE_DIGITS), "1.5");
        assert_eq!(general(100.0, FLOAT_DIGITS), "100");
        assert_eq!(general(0.0001, DOUBLE_DIGITS), "0.0001");
        assert_eq!(general(-2.25, DOUBLE_DIGITS), "-2.25");
    }

    #[test]
    fn test_general_scientific_notation()
    {
        assert_eq!(general(1e20, DOUBLE_DIGITS), "1e+20");
        assert_eq!(general(0.00001, DOUBLE_DIGITS), "1e-05");
        assert_eq!(general(123_456_789.0, FLOAT_DIGITS), "1.2345679e+08");
    }

    #[test]
    fn test_general_float_precision()
    {
        assert_eq!(general(f64::from(0.1f32), FLOAT_DIGITS), "0.1");
        assert_eq!(general(0.1, DOUBLE_DIGITS), "0.1");
        assert_eq!(general(1.0 / 3.0, DOUBLE_DIGITS), "0.3333333333333333");
    }

    #[test]
    fn test_general_special_values()
    {
        assert_eq!(general(f64::NAN, DOUBLE_DIGITS), "nan");
        assert_eq!(general(f64::NEG_INFINITY, DOUBLE_DIGITS), "-inf");
        assert_eq!(general(0.0, DOUBLE_DIGITS), "0");
    }

    #[test]
    fn test_hex_float()
    {
        assert_eq!(hex_float(1.0), "0x1p+0");
        assert_eq!(hex_float(0.5), "0x1p-1");
        assert_eq!(hex_float(1.5), "0x1.8p+0");
        assert_eq!(hex_float(-2.0), "-0x1p+1");
        assert_eq!(hex_float(0.0), "0x0p+0");
        assert_eq!(hex_float(f64::from_bits(1)), "0x0.0000000000001p-1022");
    }

    #[test]
    fn test_display_integers()
    {
        assert_eq!(NumVariant::from(-5i8).to_string(), "-5");
        assert_eq!(NumVariant::from(200u8).to_string(), "200");
        assert_eq!(NumVariant::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(NumVariant::long(-7).to_string(), "-7");
    }

    #[test]
    fn test_hex_integers()
    {
        assert_eq!(NumVariant::from(0u32).to_hex(), "0x0");
        assert_eq!(NumVariant::from(-1i64).to_hex(), "0xffffffffffffffff");
        assert_eq!(NumVariant::ulong(0xdead).to_hex(), "0xdead");
    }
}
