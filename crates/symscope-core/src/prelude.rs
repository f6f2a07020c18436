//! Common module for library exports

pub use crate::access::{DataAccessor, DataAccessorRef, DataStorage, MemoryBackend, RegisterBackend};
pub use crate::error::{Result, SymscopeError};
pub use crate::num::{NumType, NumVariant, NumVariantError};
pub use crate::resolver::{split_symbol_name, Module, ModuleRegistry, ResolverConfig, TypeResolver};
pub use crate::symbols::dwarf::DwarfProvider;
pub use crate::symbols::{MachineType, SymTag, Symbol, SymbolProvider, SymbolRef};
pub use crate::typeinfo::{base_type_info, load_type, BaseType, TypeInfo, TypeInfoRef};
pub use crate::types::{Address, PointerSize};
