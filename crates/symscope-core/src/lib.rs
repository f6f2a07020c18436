//! # symscope-core
//!
//! Type resolution for debuggers: numeric variants with C arithmetic,
//! typed data accessors, and a type model built from program-database
//! symbols.
//!
//! This crate provides:
//! - [`num::NumVariant`]: tagged C scalar with the usual arithmetic conversions
//! - [`access`]: typed reads and writes over memory, registers and buffers
//! - [`symbols`]: the symbol-provider capability, with a DWARF implementation
//! - [`typeinfo`]: the type tree and the type-name expression parser
//! - [`resolver`]: `module!symbol` name resolution over loaded modules
//!
//! ## Example
//!
//! ```rust
//! use symscope_core::prelude::*;
//!
//! let resolver = TypeResolver::new(ResolverConfig::default());
//! let ty = resolver.load_type("UInt1B(*)[4]").unwrap();
//! assert!(ty.is_pointer());
//!
//! let sum = NumVariant::from(200u8) + NumVariant::from(100u8);
//! assert_eq!(sum, NumVariant::Int(300));
//! ```

pub mod access;
pub mod error;
pub mod num;
pub mod prelude;
pub mod resolver;
pub mod symbols;
pub mod typeinfo;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SymscopeError};
pub use num::{NumType, NumVariant};
pub use resolver::TypeResolver;
pub use typeinfo::{TypeInfo, TypeInfoRef};
