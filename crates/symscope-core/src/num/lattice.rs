//! Usual arithmetic conversion table.

use super::NumType;
use super::NumType::{Char, Double, Float, Int, Long, LongLong, Short, UChar, UInt, ULong, ULongLong, UShort};

/// Winning representation for every ordered pair of operand tags
///
/// Rows and columns follow [`NumType`] declaration order. The table is
/// symmetric.
#[rustfmt::skip]
static CAST_MATRIX: [[NumType; 12]; 12] = [
    //  Char       UChar      Short      UShort     Long       ULong      LongLong   ULongLong  Int        UInt       Float   Double
    [   Int,       Int,       Int,       Int,       Long,      ULong,     LongLong,  ULongLong, Int,       UInt,      Float,  Double ], // Char
    [   Int,       Int,       Int,       Int,       Long,      ULong,     LongLong,  ULongLong, Int,       UInt,      Float,  Double ], // UChar
    [   Int,       Int,       Int,       Int,       Long,      ULong,     LongLong,  ULongLong, Int,       UInt,      Float,  Double ], // Short
    [   Int,       Int,       Int,       Int,       Long,      ULong,     LongLong,  ULongLong, Int,       UInt,      Float,  Double ], // UShort
    [   Long,      Long,      Long,      Long,      Long,      ULong,     LongLong,  ULongLong, Long,      ULong,     Float,  Double ], // Long
    [   ULong,     ULong,     ULong,     ULong,     ULong,     ULong,     LongLong,  ULongLong, ULong,     ULong,     Float,  Double ], // ULong
    [   LongLong,  LongLong,  LongLong,  LongLong,  LongLong,  LongLong,  LongLong,  ULongLong, LongLong,  LongLong,  Float,  Double ], // LongLong
    [   ULongLong, ULongLong, ULongLong, ULongLong, ULongLong, ULongLong, ULongLong, ULongLong, ULongLong, ULongLong, Float,  Double ], // ULongLong
    [   Int,       Int,       Int,       Int,       Long,      ULong,     LongLong,  ULongLong, Int,       UInt,      Float,  Double ], // Int
    [   UInt,      UInt,      UInt,      UInt,      ULong,     ULong,     LongLong,  ULongLong, UInt,      UInt,      Float,  Double ], // UInt
    [   Float,     Float,     Float,     Float,     Float,     Float,     Float,     Float,     Float,     Float,     Float,  Double ], // Float
    [   Double,    Double,    Double,    Double,    Double,    Double,    Double,    Double,    Double,    Double,    Double, Double ], // Double
];

/// Representation both operands are promoted to before a binary operation.
#[must_use]
pub(crate) fn promoted_type(lhs: NumType, rhs: NumType) -> NumType
{
    CAST_MATRIX[lhs.index()][rhs.index()]
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_matrix_is_symmetric()
    {
        for lhs in NumType::ALL {
            for rhs in NumType::ALL {
                assert_eq!(promoted_type(lhs, rhs), promoted_type(rhs, lhs), "{lhs} vs {rhs}");
            }
        }
    }

    #[test]
    fn test_small_integers_promote_to_int()
    {
        for lhs in [Char, UChar, Short, UShort] {
            for rhs in [Char, UChar, Short, UShort, Int] {
                assert_eq!(promoted_type(lhs, rhs), Int);
            }
        }
    }

    #[test]
    fn test_float_dominates_integers()
    {
        for ty in NumType::ALL {
            if ty != Double {
                assert_eq!(promoted_type(ty, Float), Float);
            }
            assert_eq!(promoted_type(ty, Double), Double);
        }
    }

    #[test]
    fn test_mixed_width_unsigned()
    {
        assert_eq!(promoted_type(Long, UInt), ULong);
        assert_eq!(promoted_type(ULong, LongLong), LongLong);
        assert_eq!(promoted_type(LongLong, UInt), LongLong);
        assert_eq!(promoted_type(Int, ULongLong), ULongLong);
    }
}
