//! Typed literals and binary operators for the `calc` command.
//!
//! A literal is `value[:type]`, e.g. `10:uchar`, `-1:int`, `0xff:ushort`,
//! `2.5:double`. Without a type, integers are `int` (or `long long` when they
//! do not fit) and anything with a `.` or exponent is `double`.

use std::str::FromStr;

use symscope_core::num::NumResult;
use symscope_core::{NumType, NumVariant};
use thiserror::Error;

/// A literal or operator the `calc` command cannot read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseLiteralError(String);

fn error(message: impl Into<String>) -> ParseLiteralError
{
    ParseLiteralError(message.into())
}

/// Type name accepted after the `:` of a literal.
pub fn parse_num_type(name: &str) -> Result<NumType, ParseLiteralError>
{
    let ty = match name.trim().to_ascii_lowercase().as_str() {
        "char" | "i8" => NumType::Char,
        "uchar" | "u8" => NumType::UChar,
        "short" | "i16" => NumType::Short,
        "ushort" | "u16" => NumType::UShort,
        "long" => NumType::Long,
        "ulong" => NumType::ULong,
        "longlong" | "i64" => NumType::LongLong,
        "ulonglong" | "u64" => NumType::ULongLong,
        "int" | "i32" => NumType::Int,
        "uint" | "u32" => NumType::UInt,
        "float" | "f32" => NumType::Float,
        "double" | "f64" => NumType::Double,
        other => return Err(error(format!("unknown type '{other}'"))),
    };
    Ok(ty)
}

fn parse_integer(text: &str) -> Result<i128, ParseLiteralError>
{
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => digits.parse::<i128>(),
    }
    .map_err(|_| error(format!("invalid integer '{text}'")))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn fit<T: TryFrom<i128>>(value: i128, ty: NumType) -> Result<T, ParseLiteralError>
{
    T::try_from(value).map_err(|_| error(format!("{value} does not fit in {ty}")))
}

fn integer_variant(value: i128, ty: NumType) -> Result<NumVariant, ParseLiteralError>
{
    let variant = match ty {
        NumType::Char => NumVariant::from(fit::<i8>(value, ty)?),
        NumType::UChar => NumVariant::from(fit::<u8>(value, ty)?),
        NumType::Short => NumVariant::from(fit::<i16>(value, ty)?),
        NumType::UShort => NumVariant::from(fit::<u16>(value, ty)?),
        NumType::Long => NumVariant::long(fit(value, ty)?),
        NumType::ULong => NumVariant::ulong(fit(value, ty)?),
        NumType::LongLong => NumVariant::from(fit::<i64>(value, ty)?),
        NumType::ULongLong => NumVariant::from(fit::<u64>(value, ty)?),
        NumType::Int => NumVariant::from(fit::<i32>(value, ty)?),
        NumType::UInt => NumVariant::from(fit::<u32>(value, ty)?),
        NumType::Float | NumType::Double => NumVariant::from(value as f64).cast(ty),
    };
    Ok(variant)
}

fn looks_like_float(text: &str) -> bool
{
    !text.starts_with("0x") && !text.starts_with("-0x") && text.contains(['.', 'e', 'E'])
}

/// Parse a typed literal.
pub fn parse_literal(text: &str) -> Result<NumVariant, ParseLiteralError>
{
    let (value, ty) = match text.rsplit_once(':') {
        Some((value, ty)) => (value.trim(), Some(parse_num_type(ty)?)),
        None => (text.trim(), None),
    };
    if value.is_empty() {
        return Err(error("empty literal"));
    }

    if looks_like_float(value) {
        let number = value
            .parse::<f64>()
            .map_err(|_| error(format!("invalid number '{value}'")))?;
        return match ty {
            None | Some(NumType::Double) => Ok(NumVariant::from(number)),
            Some(NumType::Float) => Ok(NumVariant::from(number as f32)),
            Some(other) => Err(error(format!("'{value}' is not an integer literal for {other}"))),
        };
    }

    let number = parse_integer(value)?;
    match ty {
        Some(ty) => integer_variant(number, ty),
        None if i32::try_from(number).is_ok() => integer_variant(number, NumType::Int),
        None => integer_variant(number, NumType::LongLong),
    }
}

/// Binary operator of the `calc` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp
{
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    LogicalAnd,
    LogicalOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FromStr for BinaryOp
{
    type Err = ParseLiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let op = match s {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" | "x" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&&" => BinaryOp::LogicalAnd,
            "||" => BinaryOp::LogicalOr,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            other => return Err(error(format!("unknown operator '{other}'"))),
        };
        Ok(op)
    }
}

/// Comparisons and logical operators yield an `int` 0 or 1, as in C.
fn truth(value: bool) -> NumVariant
{
    NumVariant::from(i32::from(value))
}

impl BinaryOp
{
    pub fn apply(self, lhs: NumVariant, rhs: NumVariant) -> NumResult<NumVariant>
    {
        match self {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Rem => lhs % rhs,
            BinaryOp::BitAnd => lhs & rhs,
            BinaryOp::BitOr => lhs | rhs,
            BinaryOp::BitXor => lhs ^ rhs,
            BinaryOp::Shl => lhs << rhs,
            BinaryOp::Shr => lhs >> rhs,
            BinaryOp::LogicalAnd => Ok(truth(lhs.logical_and(&rhs))),
            BinaryOp::LogicalOr => Ok(truth(lhs.logical_or(&rhs))),
            BinaryOp::Eq => Ok(truth(lhs == rhs)),
            BinaryOp::Ne => Ok(truth(lhs != rhs)),
            BinaryOp::Lt => Ok(truth(lhs < rhs)),
            BinaryOp::Le => Ok(truth(lhs <= rhs)),
            BinaryOp::Gt => Ok(truth(lhs > rhs)),
            BinaryOp::Ge => Ok(truth(lhs >= rhs)),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_typed_literals()
    {
        assert_eq!(parse_literal("10:uchar").unwrap(), NumVariant::from(10u8));
        assert_eq!(parse_literal("-1:int").unwrap().num_type(), NumType::Int);
        assert_eq!(parse_literal("0xff:ushort").unwrap(), NumVariant::from(255u16));
        assert_eq!(parse_literal("7:long").unwrap().num_type(), NumType::Long);
        assert_eq!(parse_literal("2.5:double").unwrap().as_double(), 2.5);
        assert_eq!(parse_literal("1.5:float").unwrap().num_type(), NumType::Float);
    }

    #[test]
    fn test_untyped_literals()
    {
        assert_eq!(parse_literal("42").unwrap().num_type(), NumType::Int);
        assert_eq!(parse_literal("5000000000").unwrap().num_type(), NumType::LongLong);
        assert_eq!(parse_literal("0.25").unwrap().num_type(), NumType::Double);
    }

    #[test]
    fn test_rejected_literals()
    {
        assert!(parse_literal("256:uchar").is_err());
        assert!(parse_literal("-1:uint").is_err());
        assert!(parse_literal("2.5:int").is_err());
        assert!(parse_literal("1:quad").is_err());
        assert!(parse_literal(":int").is_err());
        assert!(parse_literal("abc").is_err());
    }

    #[test]
    fn test_apply_follows_promotion()
    {
        let lhs = parse_literal("200:uchar").unwrap();
        let rhs = parse_literal("100:uchar").unwrap();
        let sum = BinaryOp::Add.apply(lhs, rhs).unwrap();
        assert_eq!(sum.num_type(), NumType::Int);
        assert_eq!(sum.as_int(), 300);
    }

    #[test]
    fn test_apply_comparisons_and_errors()
    {
        let minus_one = parse_literal("-1:int").unwrap();
        let one = parse_literal("1:uint").unwrap();
        // -1 converts to UINT_MAX when compared against unsigned int.
        assert_eq!(BinaryOp::Gt.apply(minus_one, one).unwrap(), NumVariant::from(1i32));

        let zero = parse_literal("0").unwrap();
        assert!(BinaryOp::Div.apply(one, zero).is_err());
        let half = parse_literal("0.5").unwrap();
        assert!(BinaryOp::Rem.apply(half, one).is_err());
    }

    #[test]
    fn test_operator_from_str()
    {
        assert_eq!("<<".parse::<BinaryOp>().unwrap(), BinaryOp::Shl);
        assert_eq!("||".parse::<BinaryOp>().unwrap(), BinaryOp::LogicalOr);
        assert!("**".parse::<BinaryOp>().is_err());
    }

    #[test]
    fn test_parse_error_message()
    {
        let error = parse_literal("1:quad").unwrap_err();
        assert_eq!(error.to_string(), "unknown type 'quad'");
        let boxed: Box<dyn std::error::Error> = Box::new(error);
        assert!(boxed.to_string().contains("quad"));
    }
}
