//! Operators over [`NumVariant`].
//!
//! Every binary operator promotes both operands through the conversion table
//! first. Arithmetic that is always defined (`+`, `-`, `*`, unary `-`) returns
//! a plain [`NumVariant`] and wraps on integer overflow. Operators that can
//! fail return [`NumResult`].

use std::cmp::Ordering;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Shl, Shr, Sub};

use super::lattice::promoted_type;
use super::{NumResult, NumType, NumVariant, NumVariantError};

/// Bind both operands as the native type of `$ty` and evaluate `$body`.
macro_rules! with_promoted {
    ($ty:expr, $lhs:expr, $rhs:expr, |$a:ident, $b:ident| $body:expr) => {
        match $ty {
            NumType::Char => {
                let ($a, $b) = ($lhs.as_char(), $rhs.as_char());
                $body
            }
            NumType::UChar => {
                let ($a, $b) = ($lhs.as_uchar(), $rhs.as_uchar());
                $body
            }
            NumType::Short => {
                let ($a, $b) = ($lhs.as_short(), $rhs.as_short());
                $body
            }
            NumType::UShort => {
                let ($a, $b) = ($lhs.as_ushort(), $rhs.as_ushort());
                $body
            }
            NumType::Long => {
                let ($a, $b) = ($lhs.as_long(), $rhs.as_long());
                $body
            }
            NumType::ULong => {
                let ($a, $b) = ($lhs.as_ulong(), $rhs.as_ulong());
                $body
            }
            NumType::LongLong => {
                let ($a, $b) = ($lhs.as_longlong(), $rhs.as_longlong());
                $body
            }
            NumType::ULongLong => {
                let ($a, $b) = ($lhs.as_ulonglong(), $rhs.as_ulonglong());
                $body
            }
            NumType::Int => {
                let ($a, $b) = ($lhs.as_int(), $rhs.as_int());
                $body
            }
            NumType::UInt => {
                let ($a, $b) = ($lhs.as_uint(), $rhs.as_uint());
                $body
            }
            NumType::Float => {
                let ($a, $b) = ($lhs.as_float(), $rhs.as_float());
                $body
            }
            NumType::Double => {
                let ($a, $b) = ($lhs.as_double(), $rhs.as_double());
                $body
            }
        }
    };
}

/// Arithmetic defined for every representation.
macro_rules! arith_op {
    ($lhs:expr, $rhs:expr, |$a:ident, $b:ident| int => $int:expr, float => $float:expr) => {{
        let (lhs, rhs) = ($lhs, $rhs);
        match promoted_type(lhs.num_type(), rhs.num_type()) {
            NumType::Char => NumVariant::Char({
                let ($a, $b) = (lhs.as_char(), rhs.as_char());
                $int
            }),
            NumType::UChar => NumVariant::UChar({
                let ($a, $b) = (lhs.as_uchar(), rhs.as_uchar());
                $int
            }),
            NumType::Short => NumVariant::Short({
                let ($a, $b) = (lhs.as_short(), rhs.as_short());
                $int
            }),
            NumType::UShort => NumVariant::UShort({
                let ($a, $b) = (lhs.as_ushort(), rhs.as_ushort());
                $int
            }),
            NumType::Long => NumVariant::Long({
                let ($a, $b) = (lhs.as_long(), rhs.as_long());
                $int
            }),
            NumType::ULong => NumVariant::ULong({
                let ($a, $b) = (lhs.as_ulong(), rhs.as_ulong());
                $int
            }),
            NumType::LongLong => NumVariant::LongLong({
                let ($a, $b) = (lhs.as_longlong(), rhs.as_longlong());
                $int
            }),
            NumType::ULongLong => NumVariant::ULongLong({
                let ($a, $b) = (lhs.as_ulonglong(), rhs.as_ulonglong());
                $int
            }),
            NumType::Int => NumVariant::Int({
                let ($a, $b) = (lhs.as_int(), rhs.as_int());
                $int
            }),
            NumType::UInt => NumVariant::UInt({
                let ($a, $b) = (lhs.as_uint(), rhs.as_uint());
                $int
            }),
            NumType::Float => NumVariant::Float({
                let ($a, $b) = (lhs.as_float(), rhs.as_float());
                $float
            }),
            NumType::Double => NumVariant::Double({
                let ($a, $b) = (lhs.as_double(), rhs.as_double());
                $float
            }),
        }
    }};
}

/// Integer-only operation. `$int` evaluates to `NumResult` of the native type.
macro_rules! int_op {
    ($op:literal, $lhs:expr, $rhs:expr, |$a:ident, $b:ident| $int:expr) => {{
        let (lhs, rhs) = ($lhs, $rhs);
        let ty = promoted_type(lhs.num_type(), rhs.num_type());
        match ty {
            NumType::Char => {
                let ($a, $b) = (lhs.as_char(), rhs.as_char());
                $int.map(NumVariant::Char)
            }
            NumType::UChar => {
                let ($a, $b) = (lhs.as_uchar(), rhs.as_uchar());
                $int.map(NumVariant::UChar)
            }
            NumType::Short => {
                let ($a, $b) = (lhs.as_short(), rhs.as_short());
                $int.map(NumVariant::Short)
            }
            NumType::UShort => {
                let ($a, $b) = (lhs.as_ushort(), rhs.as_ushort());
                $int.map(NumVariant::UShort)
            }
            NumType::Long => {
                let ($a, $b) = (lhs.as_long(), rhs.as_long());
                $int.map(NumVariant::Long)
            }
            NumType::ULong => {
                let ($a, $b) = (lhs.as_ulong(), rhs.as_ulong());
                $int.map(NumVariant::ULong)
            }
            NumType::LongLong => {
                let ($a, $b) = (lhs.as_longlong(), rhs.as_longlong());
                $int.map(NumVariant::LongLong)
            }
            NumType::ULongLong => {
                let ($a, $b) = (lhs.as_ulonglong(), rhs.as_ulonglong());
                $int.map(NumVariant::ULongLong)
            }
            NumType::Int => {
                let ($a, $b) = (lhs.as_int(), rhs.as_int());
                $int.map(NumVariant::Int)
            }
            NumType::UInt => {
                let ($a, $b) = (lhs.as_uint(), rhs.as_uint());
                $int.map(NumVariant::UInt)
            }
            NumType::Float | NumType::Double => Err(NumVariantError::UnsupportedOperation { op: $op, ty }),
        }
    }};
}

impl PartialEq for NumVariant
{
    fn eq(&self, other: &Self) -> bool
    {
        let ty = promoted_type(self.num_type(), other.num_type());
        with_promoted!(ty, self, other, |a, b| a == b)
    }
}

impl PartialOrd for NumVariant
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        let ty = promoted_type(self.num_type(), other.num_type());
        with_promoted!(ty, self, other, |a, b| a.partial_cmp(&b))
    }
}

impl Add for NumVariant
{
    type Output = NumVariant;

    fn add(self, rhs: Self) -> Self::Output
    {
        arith_op!(self, rhs, |a, b| int => a.wrapping_add(b), float => a + b)
    }
}

impl Sub for NumVariant
{
    type Output = NumVariant;

    fn sub(self, rhs: Self) -> Self::Output
    {
        arith_op!(self, rhs, |a, b| int => a.wrapping_sub(b), float => a - b)
    }
}

impl Mul for NumVariant
{
    type Output = NumVariant;

    fn mul(self, rhs: Self) -> Self::Output
    {
        arith_op!(self, rhs, |a, b| int => a.wrapping_mul(b), float => a * b)
    }
}

impl Div for NumVariant
{
    type Output = NumResult<NumVariant>;

    fn div(self, rhs: Self) -> Self::Output
    {
        let ty = promoted_type(self.num_type(), rhs.num_type());
        if !ty.is_float() && rhs.cast(ty).as_ulonglong() == 0 {
            return Err(NumVariantError::DivisionByZero);
        }
        Ok(arith_op!(self, rhs, |a, b| int => a.wrapping_div(b), float => a / b))
    }
}

impl Rem for NumVariant
{
    type Output = NumResult<NumVariant>;

    fn rem(self, rhs: Self) -> Self::Output
    {
        int_op!("%", self, rhs, |a, b| if b == 0 {
            Err(NumVariantError::DivisionByZero)
        } else {
            Ok(a.wrapping_rem(b))
        })
    }
}

impl BitAnd for NumVariant
{
    type Output = NumResult<NumVariant>;

    fn bitand(self, rhs: Self) -> Self::Output
    {
        int_op!("&", self, rhs, |a, b| NumResult::Ok(a & b))
    }
}

impl BitOr for NumVariant
{
    type Output = NumResult<NumVariant>;

    fn bitor(self, rhs: Self) -> Self::Output
    {
        int_op!("|", self, rhs, |a, b| NumResult::Ok(a | b))
    }
}

impl BitXor for NumVariant
{
    type Output = NumResult<NumVariant>;

    fn bitxor(self, rhs: Self) -> Self::Output
    {
        int_op!("^", self, rhs, |a, b| NumResult::Ok(a ^ b))
    }
}

impl Shl for NumVariant
{
    type Output = NumResult<NumVariant>;

    /// The result keeps the left operand's tag.
    fn shl(self, rhs: Self) -> Self::Output
    {
        let shifted = int_op!("<<", self, rhs, |a, b| NumResult::Ok(a.wrapping_shl(b as u32)))?;
        Ok(shifted.cast(self.num_type()))
    }
}

impl Shr for NumVariant
{
    type Output = NumResult<NumVariant>;

    /// The result keeps the left operand's tag.
    fn shr(self, rhs: Self) -> Self::Output
    {
        let shifted = int_op!(">>", self, rhs, |a, b| NumResult::Ok(a.wrapping_shr(b as u32)))?;
        Ok(shifted.cast(self.num_type()))
    }
}

impl Not for NumVariant
{
    type Output = NumResult<NumVariant>;

    /// Bitwise complement, computed as xor with all ones in the operand's tag.
    fn not(self) -> Self::Output
    {
        let ones = NumVariant::ULongLong(!0).cast(self.num_type());
        int_op!("~", self, ones, |a, b| NumResult::Ok(a ^ b))
    }
}

impl Neg for NumVariant
{
    type Output = NumVariant;

    fn neg(self) -> Self::Output
    {
        NumVariant::Int(0).cast(self.num_type()) - self
    }
}

impl NumVariant
{
    /// C `&&`.
    #[must_use]
    pub fn logical_and(&self, other: &NumVariant) -> bool
    {
        !(self.logical_not() || other.logical_not())
    }

    /// C `||`.
    #[must_use]
    pub fn logical_or(&self, other: &NumVariant) -> bool
    {
        !(self.logical_not() && other.logical_not())
    }

    /// C `!`: true when the value compares equal to zero.
    #[must_use]
    pub fn logical_not(&self) -> bool
    {
        *self == NumVariant::Int(0)
    }

    /// Prefix `++`
    ///
    /// Adds a `1` of the operand's own tag; the sum still follows the
    /// promotion table, so a `char` becomes an `int`.
    pub fn increment(&mut self) -> NumVariant
    {
        *self = *self + NumVariant::Int(1).cast(self.num_type());
        *self
    }

    /// Prefix `--`.
    pub fn decrement(&mut self) -> NumVariant
    {
        *self = *self - NumVariant::Int(1).cast(self.num_type());
        *self
    }

    /// Postfix `++`: returns the value before the update.
    pub fn post_increment(&mut self) -> NumVariant
    {
        let previous = *self;
        self.increment();
        previous
    }

    /// Postfix `--`: returns the value before the update.
    pub fn post_decrement(&mut self) -> NumVariant
    {
        let previous = *self;
        self.decrement();
        previous
    }
}
