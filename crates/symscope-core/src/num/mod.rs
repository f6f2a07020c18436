//! # Numeric Variants
//!
//! A tagged dynamic number that behaves like the C value it was read as.
//!
//! Debug information describes data in terms of native C widths (`char`,
//! `unsigned short`, `long long`, `double`, ...). When a debugger reads such
//! data it needs a value type that keeps the original width and signedness and
//! performs arithmetic the way the debuggee's compiler would. [`NumVariant`] is
//! that type.
//!
//! ## Conversion rules
//!
//! Binary operators follow C's usual arithmetic conversions: both operands are
//! promoted to a single winning [`NumType`] taken from a fixed 12x12 table, the
//! operation runs in that representation, and the result carries the winning
//! tag. Shifts are the exception: their result is narrowed back to the left
//! operand's tag.
//!
//! ```rust
//! use symscope_core::num::{NumType, NumVariant};
//!
//! let a = NumVariant::from(200u8);
//! let b = NumVariant::from(100u8);
//!
//! // unsigned char + unsigned char is computed as int
//! let sum = a + b;
//! assert_eq!(sum.num_type(), NumType::Int);
//! assert_eq!(sum.as_int(), 300);
//! ```
//!
//! ## Data model
//!
//! `long` and `unsigned long` are 32 bits wide, matching the LLP64 model used
//! by program databases.

mod format;
mod lattice;
mod ops;
mod variant;

use thiserror::Error;

pub use variant::{NumType, NumVariant};

/// Errors raised by [`NumVariant`] operations
///
/// Callers should match on the kind rather than the message; the message is
/// only meant for humans.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumVariantError
{
    /// The operation is not defined for the operand representation
    ///
    /// Bitwise operators, `%` and shifts are integer-only. Applying them to a
    /// `float` or `double` operand (or to a pair promoted to one) fails instead
    /// of silently converting to an integer.
    #[error("operator '{op}' is not supported for {ty} operands")]
    UnsupportedOperation
    {
        /// Operator symbol, e.g. `"%"`
        op: &'static str,
        /// Representation the operands were promoted to
        ty: NumType,
    },

    /// Integer division or remainder by zero
    #[error("integer division by zero")]
    DivisionByZero,
}

/// Convenience type alias for numeric operations that can fail
pub type NumResult<T> = std::result::Result<T, NumVariantError>;
