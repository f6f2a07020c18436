//! Loaded modules and the registry that maps names and addresses to them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SymscopeError};
use crate::symbols::{SymbolProvider, SymbolRef};
use crate::types::Address;

/// One loaded image and the symbols describing it
#[derive(Clone)]
pub struct Module
{
    name: String,
    base: Address,
    size: u64,
    provider: Arc<dyn SymbolProvider>,
}

impl Module
{
    pub fn new(name: impl Into<String>, base: Address, size: u64, provider: Arc<dyn SymbolProvider>) -> Self
    {
        Self {
            name: name.into(),
            base,
            size,
            provider,
        }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn base(&self) -> Address
    {
        self.base
    }

    pub fn size(&self) -> u64
    {
        self.size
    }

    pub fn end(&self) -> Address
    {
        self.base + self.size
    }

    pub fn provider(&self) -> &Arc<dyn SymbolProvider>
    {
        &self.provider
    }

    pub fn contains(&self, address: Address) -> bool
    {
        address
            .checked_distance_from(self.base)
            .is_some_and(|distance| distance < self.size)
    }

    pub fn global_scope(&self) -> Result<SymbolRef>
    {
        self.provider.global_scope()
    }

    /// Global-scope symbol called `name`.
    pub fn symbol(&self, name: &str) -> Result<SymbolRef>
    {
        self.global_scope()?.child_by_name(name)
    }

    /// Byte size of the type or variable called `name`.
    pub fn symbol_size(&self, name: &str) -> Result<usize>
    {
        self.symbol(name)?.size()
    }

    /// Virtual address of the global called `name`.
    pub fn symbol_va(&self, name: &str) -> Result<Address>
    {
        self.symbol(name)?.va()
    }
}

impl fmt::Debug for Module
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Modules ordered by base address
#[derive(Debug, Default)]
pub struct ModuleRegistry
{
    modules: BTreeMap<Address, Module>,
}

impl ModuleRegistry
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Register a module, replacing any module at the same base.
    pub fn insert(&mut self, module: Module) -> Option<Module>
    {
        debug!(module = module.name(), base = %module.base(), size = module.size(), "registering module");
        self.modules.insert(module.base(), module)
    }

    pub fn remove(&mut self, base: Address) -> Option<Module>
    {
        self.modules.remove(&base)
    }

    pub fn clear(&mut self)
    {
        self.modules.clear();
    }

    pub fn len(&self) -> usize
    {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module>
    {
        self.modules.values()
    }

    /// Module called `name`; names compare case-insensitively.
    pub fn by_name(&self, name: &str) -> Result<&Module>
    {
        self.modules
            .values()
            .find(|module| module.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| SymscopeError::ModuleNotFound(name.to_string()))
    }

    /// Module loaded at or containing `address`.
    pub fn by_offset(&self, address: Address) -> Result<&Module>
    {
        if let Some(module) = self.modules.get(&address) {
            return Ok(module);
        }
        self.modules
            .range(..=address)
            .next_back()
            .map(|(_, module)| module)
            .filter(|module| module.contains(address))
            .ok_or_else(|| SymscopeError::ModuleNotFound(address.to_string()))
    }

    /// First module, by base address, whose global scope has `symbol`.
    pub fn find_by_symbol(&self, symbol: &str) -> Result<&Module>
    {
        for module in self.modules.values() {
            match module.symbol(symbol) {
                Ok(_) => return Ok(module),
                Err(SymscopeError::SymbolNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Err(SymscopeError::SymbolNotFound(symbol.to_string()))
    }
}
