//! # Error Types
//!
//! Error handling for type resolution and data access.
//!
//! We use `thiserror` to derive the `Error` trait and the messages. Failures
//! are immediate: every operation either returns a fully built value or one of
//! the variants below, never a partially built type tree.

use thiserror::Error;

use crate::num::NumVariantError;

/// Main error type for symscope operations
///
/// ## Error Categories
///
/// 1. **Expression errors**: TypeExpression (malformed type-name text)
/// 2. **Model errors**: UnsupportedType, InvalidOperation, Index
/// 3. **Numeric errors**: NumVariant
/// 4. **Provider errors**: SymbolNotFound, ModuleNotFound, Dwarf
/// 5. **Access errors**: MemoryAccess, RegisterAccess
/// 6. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum SymscopeError
{
    /// A type expression could not be parsed
    ///
    /// Raised for an empty base name, unbalanced declarator syntax, or a data
    /// symbol used where an expression needs a type.
    #[error("Invalid type expression '{expression}': {reason}")]
    TypeExpression
    {
        /// The offending expression
        expression: String,
        /// Human readable reason
        reason: String,
    },

    /// The symbol resolved, but its kind is not modelled
    ///
    /// The string names the symbol tag (and symbol name when known).
    #[error("This type is not supported: {0}")]
    UnsupportedType(String),

    /// A numeric operation failed
    #[error("Numeric error: {0}")]
    NumVariant(#[from] NumVariantError),

    /// Element index out of range
    #[error("Index {index} out of range (count {count})")]
    Index
    {
        /// Requested index
        index: usize,
        /// Number of elements available
        count: usize,
    },

    /// No symbol (or field) with this name exists in the searched scope
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No module with this name or containing this address is registered
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Reading or writing target memory failed
    #[error("Memory access failed at 0x{address:016x} ({length} bytes): {reason}")]
    MemoryAccess
    {
        /// Start address of the access
        address: u64,
        /// Number of bytes requested
        length: usize,
        /// Why the access failed
        reason: String,
    },

    /// Reading or writing a register failed
    #[error("Register access failed for '{name}': {reason}")]
    RegisterAccess
    {
        /// Register name
        name: String,
        /// Why the access failed
        reason: String,
    },

    /// Debug information could not be parsed
    #[error("DWARF error: {0}")]
    Dwarf(String),

    /// Invalid argument passed to a function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The query does not apply to this kind of type
    ///
    /// For example `deref()` on a base type or `bit_width()` on a pointer.
    #[error("'{operation}' is not supported by type {type_name}")]
    InvalidOperation
    {
        /// Name of the type the query was made on
        type_name: String,
        /// The query that was attempted
        operation: &'static str,
    },

    /// I/O error (opening binaries and similar)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SymscopeError
{
    /// Build a [`SymscopeError::TypeExpression`].
    pub fn type_expression(expression: impl Into<String>, reason: impl Into<String>) -> Self
    {
        SymscopeError::TypeExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`SymscopeError::InvalidOperation`].
    pub fn invalid_operation(type_name: impl Into<String>, operation: &'static str) -> Self
    {
        SymscopeError::InvalidOperation {
            type_name: type_name.into(),
            operation,
        }
    }
}

/// Convenience type alias for `Result<T, SymscopeError>`
///
/// ```rust
/// use symscope_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SymscopeError>;
