//! # Type Resolver
//!
//! Entry point that turns names into [`TypeInfo`] trees.
//!
//! Names follow one grammar everywhere:
//!
//! - a base-type expression (`"Int4B"`, `"UInt1B*[16]"`), resolved without
//!   any module;
//! - `module!symbol`, looked up in the named module;
//! - a bare `symbol`, looked up in the first registered module that has it.
//!
//! The symbol part may itself carry declarators (`"ntdll!_PEB*"`).
//!
//! The resolver owns its [`ModuleRegistry`]; there is no process-wide state.
//!
//! ## Example
//!
//! ```rust
//! use symscope_core::resolver::{ResolverConfig, TypeResolver};
//! use symscope_core::types::PointerSize;
//!
//! let resolver = TypeResolver::new(ResolverConfig::default().with_pointer_size(PointerSize::Four));
//! let ty = resolver.load_type("Int2B*[3]").unwrap();
//! assert_eq!(ty.size(), 12);
//! assert_eq!(resolver.symbol_size("Double").unwrap(), 8);
//! ```

mod module;

use std::env;

pub use module::{Module, ModuleRegistry};
use tracing::{debug, warn};

use crate::error::{Result, SymscopeError};
use crate::symbols::SymbolRef;
use crate::typeinfo::parser::{is_base_type, is_complex_type, split_complex};
use crate::typeinfo::{base_type_info, complex_type_info, load_type, TypeInfoRef};
use crate::types::{Address, PointerSize};

/// Environment variable overriding [`ResolverConfig::default_pointer_size`].
pub const POINTER_SIZE_ENV: &str = "SYMSCOPE_POINTER_SIZE";

/// Resolver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverConfig
{
    /// Pointer width for base-type expressions not bound to a module
    pub default_pointer_size: PointerSize,
}

impl ResolverConfig
{
    /// Defaults overridden by `SYMSCOPE_POINTER_SIZE` (`4` or `8`).
    pub fn from_env() -> Self
    {
        let mut config = Self::default();
        if let Ok(value) = env::var(POINTER_SIZE_ENV) {
            match value.trim().parse::<usize>().ok().and_then(PointerSize::from_bytes) {
                Some(size) => config.default_pointer_size = size,
                None => warn!(%value, "ignoring invalid {POINTER_SIZE_ENV}"),
            }
        }
        config
    }

    #[must_use]
    pub fn with_pointer_size(mut self, size: PointerSize) -> Self
    {
        self.default_pointer_size = size;
        self
    }
}

/// Split `"module!symbol"` into its parts; the module is optional.
///
/// ```rust
/// use symscope_core::resolver::split_symbol_name;
///
/// assert_eq!(split_symbol_name("kernel32!_FILETIME"), (Some("kernel32"), "_FILETIME"));
/// assert_eq!(split_symbol_name("_FILETIME"), (None, "_FILETIME"));
/// ```
pub fn split_symbol_name(full_name: &str) -> (Option<&str>, &str)
{
    match full_name.split_once('!') {
        Some((module, symbol)) if !module.is_empty() => (Some(module), symbol),
        Some((_, symbol)) => (None, symbol),
        None => (None, full_name),
    }
}

/// Name resolution over a set of loaded modules
#[derive(Debug, Default)]
pub struct TypeResolver
{
    modules: ModuleRegistry,
    config: ResolverConfig,
}

impl TypeResolver
{
    pub fn new(config: ResolverConfig) -> Self
    {
        Self {
            modules: ModuleRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig
    {
        &self.config
    }

    pub fn modules(&self) -> &ModuleRegistry
    {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut ModuleRegistry
    {
        &mut self.modules
    }

    pub fn register_module(&mut self, module: Module)
    {
        self.modules.insert(module);
    }

    /// Module named in `module_name`, or the one that defines `symbol`.
    fn module_for(&self, module_name: Option<&str>, symbol: &str) -> Result<&Module>
    {
        match module_name {
            Some(name) => self.modules.by_name(name),
            None => {
                let lookup = if is_complex_type(symbol) {
                    split_complex(symbol).map_or(symbol, |(base, _)| base)
                } else {
                    symbol
                };
                self.modules.find_by_symbol(lookup)
            }
        }
    }

    /// Resolve a full type name (see the module docs for the grammar).
    pub fn load_type(&self, full_name: &str) -> Result<TypeInfoRef>
    {
        if is_base_type(full_name)? {
            return base_type_info(full_name, self.config.default_pointer_size);
        }

        let (module_name, symbol) = split_symbol_name(full_name);
        let module = self.module_for(module_name, symbol)?;
        debug!(full_name, module = module.name(), "resolving type");
        self.load_type_in_scope(&module.global_scope()?, symbol)
    }

    /// Resolve `name` as a child of `scope`, declarators included.
    pub fn load_type_in_scope(&self, scope: &SymbolRef, name: &str) -> Result<TypeInfoRef>
    {
        if is_complex_type(name) {
            return complex_type_info(name, Some(scope), self.config.default_pointer_size);
        }
        if is_base_type(name)? {
            return base_type_info(name, scope.machine_type().pointer_size());
        }
        load_type(&scope.child_by_name(name)?)
    }

    /// Type described by a provider symbol.
    pub fn load_type_from_symbol(&self, symbol: &SymbolRef) -> Result<TypeInfoRef>
    {
        load_type(symbol)
    }

    /// Byte size of a base-type expression, type or variable.
    pub fn symbol_size(&self, full_name: &str) -> Result<usize>
    {
        if is_base_type(full_name)? || is_complex_type(full_name) {
            return Ok(self.load_type(full_name)?.size());
        }

        let (module_name, symbol) = split_symbol_name(full_name);
        self.module_for(module_name, symbol)?.symbol_size(symbol)
    }

    /// Virtual address of a global variable or function.
    pub fn symbol_offset(&self, full_name: &str) -> Result<Address>
    {
        let (module_name, symbol) = split_symbol_name(full_name);
        if symbol.is_empty() {
            return Err(SymscopeError::InvalidArgument(format!("no symbol in '{full_name}'")));
        }
        self.module_for(module_name, symbol)?.symbol_va(symbol)
    }
}
