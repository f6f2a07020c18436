//! The `NumVariant` value type and its casts.

use std::fmt;

/// Native numeric representation carried by a [`NumVariant`]
///
/// The declaration order is significant: it indexes the promotion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumType
{
    /// `char` (signed, 1 byte)
    Char,
    /// `unsigned char`
    UChar,
    /// `short`
    Short,
    /// `unsigned short`
    UShort,
    /// `long` (4 bytes)
    Long,
    /// `unsigned long` (4 bytes)
    ULong,
    /// `long long`
    LongLong,
    /// `unsigned long long`
    ULongLong,
    /// `int`
    Int,
    /// `unsigned int`
    UInt,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl NumType
{
    /// Every tag, in table order.
    pub const ALL: [NumType; 12] = [
        NumType::Char,
        NumType::UChar,
        NumType::Short,
        NumType::UShort,
        NumType::Long,
        NumType::ULong,
        NumType::LongLong,
        NumType::ULongLong,
        NumType::Int,
        NumType::UInt,
        NumType::Float,
        NumType::Double,
    ];

    pub(crate) const fn index(self) -> usize
    {
        self as usize
    }

    /// Storage size in bytes.
    #[must_use]
    pub const fn size(self) -> usize
    {
        match self {
            NumType::Char | NumType::UChar => 1,
            NumType::Short | NumType::UShort => 2,
            NumType::Long | NumType::ULong | NumType::Int | NumType::UInt | NumType::Float => 4,
            NumType::LongLong | NumType::ULongLong | NumType::Double => 8,
        }
    }

    /// `true` for `float` and `double`.
    #[must_use]
    pub const fn is_float(self) -> bool
    {
        matches!(self, NumType::Float | NumType::Double)
    }

    /// C spelling of the type.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            NumType::Char => "char",
            NumType::UChar => "unsigned char",
            NumType::Short => "short",
            NumType::UShort => "unsigned short",
            NumType::Long => "long",
            NumType::ULong => "unsigned long",
            NumType::LongLong => "long long",
            NumType::ULongLong => "unsigned long long",
            NumType::Int => "int",
            NumType::UInt => "unsigned int",
            NumType::Float => "float",
            NumType::Double => "double",
        }
    }
}

impl fmt::Display for NumType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// A number tagged with the C type it was produced as
///
/// The enum makes the tag and the payload inseparable: there is no way to read
/// an `int` payload out of a `double` tagged value. Values are `Copy` and carry
/// no identity beyond their tag and payload.
///
/// ## Example
///
/// ```rust
/// use symscope_core::num::{NumType, NumVariant};
///
/// let v = NumVariant::from(-1i32);
/// assert!(v.is_signed());
/// assert_eq!(v.as_uint(), u32::MAX);
/// assert_eq!(v.cast(NumType::UChar), NumVariant::from(255u8));
/// ```
#[derive(Debug, Clone, Copy)]
pub enum NumVariant
{
    /// `char`
    Char(i8),
    /// `unsigned char`
    UChar(u8),
    /// `short`
    Short(i16),
    /// `unsigned short`
    UShort(u16),
    /// `long`
    Long(i32),
    /// `unsigned long`
    ULong(u32),
    /// `long long`
    LongLong(i64),
    /// `unsigned long long`
    ULongLong(u64),
    /// `int`
    Int(i32),
    /// `unsigned int`
    UInt(u32),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
}

impl Default for NumVariant
{
    fn default() -> Self
    {
        NumVariant::UChar(0)
    }
}

macro_rules! impl_from_native {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for NumVariant
            {
                fn from(value: $native) -> Self
                {
                    NumVariant::$variant(value)
                }
            }
        )*
    };
}

impl_from_native! {
    i8 => Char,
    u8 => UChar,
    i16 => Short,
    u16 => UShort,
    i64 => LongLong,
    u64 => ULongLong,
    i32 => Int,
    u32 => UInt,
    f32 => Float,
    f64 => Double,
}

/// Applies a C `static_cast` from whatever the variant holds to `$target`.
macro_rules! cast_payload {
    ($value:expr, $target:ty) => {
        match $value {
            NumVariant::Char(v) => v as $target,
            NumVariant::UChar(v) => v as $target,
            NumVariant::Short(v) => v as $target,
            NumVariant::UShort(v) => v as $target,
            NumVariant::Long(v) | NumVariant::Int(v) => v as $target,
            NumVariant::ULong(v) | NumVariant::UInt(v) => v as $target,
            NumVariant::LongLong(v) => v as $target,
            NumVariant::ULongLong(v) => v as $target,
            NumVariant::Float(v) => v as $target,
            NumVariant::Double(v) => v as $target,
        }
    };
}

impl NumVariant
{
    /// Build a `long` value (Rust has no distinct 32-bit `long`).
    #[must_use]
    pub const fn long(value: i32) -> Self
    {
        NumVariant::Long(value)
    }

    /// Build an `unsigned long` value.
    #[must_use]
    pub const fn ulong(value: u32) -> Self
    {
        NumVariant::ULong(value)
    }

    /// Tag of the held value.
    #[must_use]
    pub const fn num_type(&self) -> NumType
    {
        match self {
            NumVariant::Char(_) => NumType::Char,
            NumVariant::UChar(_) => NumType::UChar,
            NumVariant::Short(_) => NumType::Short,
            NumVariant::UShort(_) => NumType::UShort,
            NumVariant::Long(_) => NumType::Long,
            NumVariant::ULong(_) => NumType::ULong,
            NumVariant::LongLong(_) => NumType::LongLong,
            NumVariant::ULongLong(_) => NumType::ULongLong,
            NumVariant::Int(_) => NumType::Int,
            NumVariant::UInt(_) => NumType::UInt,
            NumVariant::Float(_) => NumType::Float,
            NumVariant::Double(_) => NumType::Double,
        }
    }

    /// Storage size of the held value in bytes.
    #[must_use]
    pub const fn size(&self) -> usize
    {
        self.num_type().size()
    }

    /// Convert to another representation with C cast semantics
    ///
    /// Integer narrowing truncates, widening sign- or zero-extends by the
    /// source signedness, and float to integer conversion truncates toward
    /// zero (saturating where C would be undefined).
    #[must_use]
    pub fn cast(self, target: NumType) -> NumVariant
    {
        match target {
            NumType::Char => NumVariant::Char(cast_payload!(self, i8)),
            NumType::UChar => NumVariant::UChar(cast_payload!(self, u8)),
            NumType::Short => NumVariant::Short(cast_payload!(self, i16)),
            NumType::UShort => NumVariant::UShort(cast_payload!(self, u16)),
            NumType::Long => NumVariant::Long(cast_payload!(self, i32)),
            NumType::ULong => NumVariant::ULong(cast_payload!(self, u32)),
            NumType::LongLong => NumVariant::LongLong(cast_payload!(self, i64)),
            NumType::ULongLong => NumVariant::ULongLong(cast_payload!(self, u64)),
            NumType::Int => NumVariant::Int(cast_payload!(self, i32)),
            NumType::UInt => NumVariant::UInt(cast_payload!(self, u32)),
            NumType::Float => NumVariant::Float(cast_payload!(self, f32)),
            NumType::Double => NumVariant::Double(cast_payload!(self, f64)),
        }
    }

    #[must_use]
    pub fn as_char(&self) -> i8
    {
        cast_payload!(*self, i8)
    }

    #[must_use]
    pub fn as_uchar(&self) -> u8
    {
        cast_payload!(*self, u8)
    }

    #[must_use]
    pub fn as_short(&self) -> i16
    {
        cast_payload!(*self, i16)
    }

    #[must_use]
    pub fn as_ushort(&self) -> u16
    {
        cast_payload!(*self, u16)
    }

    #[must_use]
    pub fn as_long(&self) -> i32
    {
        cast_payload!(*self, i32)
    }

    #[must_use]
    pub fn as_ulong(&self) -> u32
    {
        cast_payload!(*self, u32)
    }

    #[must_use]
    pub fn as_longlong(&self) -> i64
    {
        cast_payload!(*self, i64)
    }

    #[must_use]
    pub fn as_ulonglong(&self) -> u64
    {
        cast_payload!(*self, u64)
    }

    #[must_use]
    pub fn as_int(&self) -> i32
    {
        cast_payload!(*self, i32)
    }

    #[must_use]
    pub fn as_uint(&self) -> u32
    {
        cast_payload!(*self, u32)
    }

    #[must_use]
    pub fn as_float(&self) -> f32
    {
        cast_payload!(*self, f32)
    }

    #[must_use]
    pub fn as_double(&self) -> f64
    {
        cast_payload!(*self, f64)
    }

    /// Truth value after narrowing to `unsigned char`
    ///
    /// Only the low byte takes part: `256` is false. Use
    /// [`NumVariant::logical_not`] for a full-width zero test.
    #[must_use]
    pub fn as_bool(&self) -> bool
    {
        self.as_uchar() != 0
    }

    #[must_use]
    pub const fn is_char(&self) -> bool
    {
        matches!(self, NumVariant::Char(_))
    }

    #[must_use]
    pub const fn is_uchar(&self) -> bool
    {
        matches!(self, NumVariant::UChar(_))
    }

    #[must_use]
    pub const fn is_short(&self) -> bool
    {
        matches!(self, NumVariant::Short(_))
    }

    #[must_use]
    pub const fn is_ushort(&self) -> bool
    {
        matches!(self, NumVariant::UShort(_))
    }

    #[must_use]
    pub const fn is_long(&self) -> bool
    {
        matches!(self, NumVariant::Long(_))
    }

    #[must_use]
    pub const fn is_ulong(&self) -> bool
    {
        matches!(self, NumVariant::ULong(_))
    }

    #[must_use]
    pub const fn is_longlong(&self) -> bool
    {
        matches!(self, NumVariant::LongLong(_))
    }

    #[must_use]
    pub const fn is_ulonglong(&self) -> bool
    {
        matches!(self, NumVariant::ULongLong(_))
    }

    #[must_use]
    pub const fn is_int(&self) -> bool
    {
        matches!(self, NumVariant::Int(_))
    }

    #[must_use]
    pub const fn is_uint(&self) -> bool
    {
        matches!(self, NumVariant::UInt(_))
    }

    #[must_use]
    pub const fn is_float(&self) -> bool
    {
        matches!(self, NumVariant::Float(_))
    }

    #[must_use]
    pub const fn is_double(&self) -> bool
    {
        matches!(self, NumVariant::Double(_))
    }

    /// `true` unless the value is a `float` or `double`.
    #[must_use]
    pub const fn is_integer(&self) -> bool
    {
        !self.num_type().is_float()
    }

    /// Whether the tag is a signed representation
    ///
    /// Decided the way C would: `-1` cast into this tag compares below `0`.
    #[must_use]
    pub fn is_signed(&self) -> bool
    {
        NumVariant::Int(-1).cast(self.num_type()) < NumVariant::Int(0)
    }
}
