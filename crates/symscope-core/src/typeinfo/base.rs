//! Built-in base types.

use std::fmt;

use crate::num::NumType;
use crate::symbols::BasicType;

/// Closed set of primitive types a type expression may start with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType
{
    Char,
    WChar,
    Int1B,
    UInt1B,
    Int2B,
    UInt2B,
    Int4B,
    UInt4B,
    Int8B,
    UInt8B,
    Long,
    ULong,
    Float,
    Bool,
    Double,
    Void,
}

impl BaseType
{
    pub const ALL: [BaseType; 16] = [
        BaseType::Char,
        BaseType::WChar,
        BaseType::Int1B,
        BaseType::UInt1B,
        BaseType::Int2B,
        BaseType::UInt2B,
        BaseType::Int4B,
        BaseType::UInt4B,
        BaseType::Int8B,
        BaseType::UInt8B,
        BaseType::Long,
        BaseType::ULong,
        BaseType::Float,
        BaseType::Bool,
        BaseType::Double,
        BaseType::Void,
    ];

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self>
    {
        BaseType::ALL.into_iter().find(|base| base.name() == name)
    }

    pub const fn name(self) -> &'static str
    {
        match self {
            BaseType::Char => "Char",
            BaseType::WChar => "WChar",
            BaseType::Int1B => "Int1B",
            BaseType::UInt1B => "UInt1B",
            BaseType::Int2B => "Int2B",
            BaseType::UInt2B => "UInt2B",
            BaseType::Int4B => "Int4B",
            BaseType::UInt4B => "UInt4B",
            BaseType::Int8B => "Int8B",
            BaseType::UInt8B => "UInt8B",
            BaseType::Long => "Long",
            BaseType::ULong => "ULong",
            BaseType::Float => "Float",
            BaseType::Bool => "Bool",
            BaseType::Double => "Double",
            BaseType::Void => "Void",
        }
    }

    /// Size in bytes (`Void` is 0).
    pub const fn size(self) -> usize
    {
        match self {
            BaseType::Void => 0,
            BaseType::Char | BaseType::Int1B | BaseType::UInt1B | BaseType::Bool => 1,
            BaseType::WChar | BaseType::Int2B | BaseType::UInt2B => 2,
            BaseType::Int4B | BaseType::UInt4B | BaseType::Long | BaseType::ULong | BaseType::Float => 4,
            BaseType::Int8B | BaseType::UInt8B | BaseType::Double => 8,
        }
    }

    /// Representation values of this type are read as; `None` for `Void`.
    pub const fn num_type(self) -> Option<NumType>
    {
        Some(match self {
            BaseType::Char | BaseType::Int1B => NumType::Char,
            BaseType::UInt1B | BaseType::Bool => NumType::UChar,
            BaseType::Int2B => NumType::Short,
            BaseType::WChar | BaseType::UInt2B => NumType::UShort,
            BaseType::Int4B | BaseType::Long => NumType::Long,
            BaseType::UInt4B | BaseType::ULong => NumType::ULong,
            BaseType::Int8B => NumType::LongLong,
            BaseType::UInt8B => NumType::ULongLong,
            BaseType::Float => NumType::Float,
            BaseType::Double => NumType::Double,
            BaseType::Void => return None,
        })
    }

    /// Base type for a provider's basic-type family and symbol size
    ///
    /// `Int`/`UInt` pick their width from `size`; `Long`/`ULong` are always
    /// 4-byte; a `Float` of size 8 is reported as `Double`.
    pub fn from_basic(basic: BasicType, size: usize) -> Option<Self>
    {
        let name = match basic {
            BasicType::Int | BasicType::UInt => format!("{}{size}B", basic.name()),
            BasicType::Long => String::from("Int4B"),
            BasicType::ULong => String::from("UInt4B"),
            BasicType::Float if size == 8 => String::from("Double"),
            other => other.name().to_string(),
        };
        BaseType::from_name(&name)
    }
}

impl fmt::Display for BaseType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}
