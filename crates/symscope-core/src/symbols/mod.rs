//! # Symbols
//!
//! The symbol-provider capability the type layer resolves against.
//!
//! A program database (PDB, DWARF, a synthetic test fixture) exposes its
//! contents as a tree of [`Symbol`]s hanging off a global scope. Each symbol
//! reports a [`SymTag`] classifying it plus whatever metadata applies to that
//! tag: size, declared type, offset, bit position, constant value, children and
//! virtual-base layout. The type layer only ever consumes this trait.
//!
//! [`dwarf::DwarfProvider`] implements it over the DWARF sections of an ELF,
//! Mach-O or PE file.

pub mod dwarf;

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SymscopeError};
use crate::num::NumVariant;
use crate::types::{Address, PointerSize};

/// Shared handle to a provider symbol.
pub type SymbolRef = Arc<dyn Symbol>;

/// Classification of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymTag
{
    Null,
    /// Executable image (global scope)
    Exe,
    Compiland,
    Function,
    Block,
    /// Variable, member, or enumerator
    Data,
    Label,
    PublicSymbol,
    /// Struct, class or union
    Udt,
    Enum,
    FunctionType,
    PointerType,
    ArrayType,
    BaseType,
    Typedef,
    BaseClass,
    FunctionArgType,
    VTableShape,
    /// Virtual function table pointer inside a UDT
    VTable,
}

impl fmt::Display for SymTag
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Debug::fmt(self, f)
    }
}

/// What a data symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataKind
{
    #[default]
    Unknown,
    Local,
    StaticLocal,
    Param,
    ObjectPtr,
    FileStatic,
    Global,
    /// Instance member of a UDT
    Member,
    /// Static member of a UDT
    StaticMember,
    /// Compile-time constant (enumerator, folded constant)
    Constant,
}

/// Where a data symbol is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocationKind
{
    #[default]
    Null,
    /// Fixed virtual address
    Static,
    Tls,
    RegRel,
    ThisRel,
    Enregistered,
    /// Bit range inside a storage unit
    BitField,
    Slot,
    Constant,
}

/// Primitive type family reported by a base-type symbol
///
/// The family plus the symbol size select the concrete base type (an `Int` of
/// size 4 is `Int4B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType
{
    NoType,
    Void,
    Char,
    WChar,
    Int,
    UInt,
    Float,
    Bool,
    Long,
    ULong,
}

impl BasicType
{
    pub const fn name(self) -> &'static str
    {
        match self {
            BasicType::NoType => "NoType",
            BasicType::Void => "Void",
            BasicType::Char => "Char",
            BasicType::WChar => "WChar",
            BasicType::Int => "Int",
            BasicType::UInt => "UInt",
            BasicType::Float => "Float",
            BasicType::Bool => "Bool",
            BasicType::Long => "Long",
            BasicType::ULong => "ULong",
        }
    }
}

/// Target CPU of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MachineType
{
    #[default]
    Unknown,
    I386,
    Amd64,
    Arm,
    Arm64,
}

impl MachineType
{
    /// Pointer width on this machine; unknown machines are treated as 32-bit.
    pub const fn pointer_size(self) -> PointerSize
    {
        match self {
            MachineType::Amd64 | MachineType::Arm64 => PointerSize::Eight,
            MachineType::Unknown | MachineType::I386 | MachineType::Arm => PointerSize::Four,
        }
    }
}

/// Metadata the provider reports for one symbol
///
/// Only [`tag`](Symbol::tag), [`name`](Symbol::name), [`size`](Symbol::size),
/// [`ty`](Symbol::ty), the child accessors and
/// [`machine_type`](Symbol::machine_type) are mandatory. The rest default to
/// an error (or a neutral value) and are overridden for the tags they apply to.
pub trait Symbol: Send + Sync + fmt::Debug
{
    fn tag(&self) -> SymTag;

    fn name(&self) -> Result<String>;

    /// Size in bytes; for bit-field data symbols, the width in bits.
    fn size(&self) -> Result<usize>;

    /// Declared type of a data symbol, target of a pointer, element of an
    /// array, aliased type of a typedef, underlying type of an enum.
    fn ty(&self) -> Result<SymbolRef>;

    fn child_count(&self) -> Result<usize>;

    fn child_by_index(&self, index: usize) -> Result<SymbolRef>;

    fn child_by_name(&self, name: &str) -> Result<SymbolRef>;

    /// Machine type of the module that owns the symbol.
    fn machine_type(&self) -> MachineType;

    fn base_type(&self) -> Result<BasicType>
    {
        Err(self.missing("base_type"))
    }

    fn data_kind(&self) -> Result<DataKind>
    {
        Err(self.missing("data_kind"))
    }

    fn location_kind(&self) -> Result<LocationKind>
    {
        Ok(LocationKind::Null)
    }

    /// Byte offset relative to the parent (members, base classes, vtables).
    fn offset(&self) -> Result<u64>
    {
        Err(self.missing("offset"))
    }

    /// Virtual address (globals and static members).
    fn va(&self) -> Result<Address>
    {
        Err(self.missing("va"))
    }

    fn bit_position(&self) -> Result<u32>
    {
        Err(self.missing("bit_position"))
    }

    /// Value of a constant data symbol.
    fn value(&self) -> Result<NumVariant>
    {
        Err(self.missing("value"))
    }

    /// Element count of an array type.
    fn count(&self) -> Result<usize>
    {
        Err(self.missing("count"))
    }

    fn is_virtual_base_class(&self) -> Result<bool>
    {
        Ok(false)
    }

    /// Offset of the virtual base pointer inside the derived object.
    fn virtual_base_pointer_offset(&self) -> Result<u64>
    {
        Err(self.missing("virtual_base_pointer_offset"))
    }

    /// Slot of this base's displacement in the virtual base table.
    fn virtual_base_disp_index(&self) -> Result<i64>
    {
        Err(self.missing("virtual_base_disp_index"))
    }

    /// Width of one virtual base table entry.
    fn virtual_base_disp_size(&self) -> Result<usize>
    {
        Err(self.missing("virtual_base_disp_size"))
    }

    /// Number of direct children carrying `tag`.
    fn child_count_with_tag(&self, tag: SymTag) -> Result<usize>
    {
        let mut count = 0;
        for index in 0..self.child_count()? {
            if self.child_by_index(index)?.tag() == tag {
                count += 1;
            }
        }
        Ok(count)
    }

    /// All direct children in declaration order.
    fn children(&self) -> Result<Vec<SymbolRef>>
    {
        (0..self.child_count()?).map(|index| self.child_by_index(index)).collect()
    }

    /// Error for metadata this symbol does not carry.
    fn missing(&self, what: &'static str) -> SymscopeError
    {
        let name = self.name().unwrap_or_else(|_| String::from("<unnamed>"));
        SymscopeError::invalid_operation(format!("{name} ({})", self.tag()), what)
    }
}

/// A loaded program database
pub trait SymbolProvider: Send + Sync
{
    /// Root of the symbol tree; its children are the module's named types,
    /// globals and functions.
    fn global_scope(&self) -> Result<SymbolRef>;

    fn machine_type(&self) -> MachineType;
}
