//! Synthetic program database and target state shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use symscope_core::access::{MemoryBackend, RegisterBackend};
use symscope_core::error::{Result, SymscopeError};
use symscope_core::num::NumVariant;
use symscope_core::symbols::{BasicType, DataKind, LocationKind, MachineType, SymTag, Symbol, SymbolProvider, SymbolRef};
use symscope_core::types::Address;

/// In-memory symbol; build with the helper functions below.
#[derive(Debug, Clone)]
pub struct MockSymbol
{
    pub tag: SymTag,
    pub name: String,
    pub size: usize,
    pub ty: Option<SymbolRef>,
    pub children: Vec<SymbolRef>,
    pub basic: Option<BasicType>,
    pub data_kind: Option<DataKind>,
    pub location_kind: LocationKind,
    pub offset: Option<u64>,
    pub va: Option<u64>,
    pub bit_position: Option<u32>,
    pub value: Option<NumVariant>,
    pub count: Option<usize>,
    pub virtual_base: Option<(u64, i64, usize)>,
    pub machine: MachineType,
}

impl MockSymbol
{
    pub fn new(tag: SymTag, name: &str) -> Self
    {
        Self {
            tag,
            name: name.to_string(),
            size: 0,
            ty: None,
            children: Vec::new(),
            basic: None,
            data_kind: None,
            location_kind: LocationKind::Null,
            offset: None,
            va: None,
            bit_position: None,
            value: None,
            count: None,
            virtual_base: None,
            machine: MachineType::Amd64,
        }
    }

    pub fn build(self) -> SymbolRef
    {
        Arc::new(self)
    }
}

impl Symbol for MockSymbol
{
    fn tag(&self) -> SymTag
    {
        self.tag
    }

    fn name(&self) -> Result<String>
    {
        Ok(self.name.clone())
    }

    fn size(&self) -> Result<usize>
    {
        Ok(self.size)
    }

    fn ty(&self) -> Result<SymbolRef>
    {
        self.ty.clone().ok_or_else(|| self.missing("ty"))
    }

    fn child_count(&self) -> Result<usize>
    {
        Ok(self.children.len())
    }

    fn child_by_index(&self, index: usize) -> Result<SymbolRef>
    {
        self.children.get(index).cloned().ok_or(SymscopeError::Index {
            index,
            count: self.children.len(),
        })
    }

    fn child_by_name(&self, name: &str) -> Result<SymbolRef>
    {
        self.children
            .iter()
            .find(|child| child.name().is_ok_and(|child_name| child_name == name))
            .cloned()
            .ok_or_else(|| SymscopeError::SymbolNotFound(name.to_string()))
    }

    fn machine_type(&self) -> MachineType
    {
        self.machine
    }

    fn base_type(&self) -> Result<BasicType>
    {
        self.basic.ok_or_else(|| self.missing("base_type"))
    }

    fn data_kind(&self) -> Result<DataKind>
    {
        self.data_kind.ok_or_else(|| self.missing("data_kind"))
    }

    fn location_kind(&self) -> Result<LocationKind>
    {
        Ok(self.location_kind)
    }

    fn offset(&self) -> Result<u64>
    {
        self.offset.ok_or_else(|| self.missing("offset"))
    }

    fn va(&self) -> Result<Address>
    {
        self.va.map(Address::new).ok_or_else(|| self.missing("va"))
    }

    fn bit_position(&self) -> Result<u32>
    {
        self.bit_position.ok_or_else(|| self.missing("bit_position"))
    }

    fn value(&self) -> Result<NumVariant>
    {
        self.value.ok_or_else(|| self.missing("value"))
    }

    fn count(&self) -> Result<usize>
    {
        self.count.ok_or_else(|| self.missing("count"))
    }

    fn is_virtual_base_class(&self) -> Result<bool>
    {
        Ok(self.virtual_base.is_some())
    }

    fn virtual_base_pointer_offset(&self) -> Result<u64>
    {
        self.virtual_base.map(|(vbptr, _, _)| vbptr).ok_or_else(|| self.missing("vbptr"))
    }

    fn virtual_base_disp_index(&self) -> Result<i64>
    {
        self.virtual_base.map(|(_, index, _)| index).ok_or_else(|| self.missing("disp_index"))
    }

    fn virtual_base_disp_size(&self) -> Result<usize>
    {
        self.virtual_base.map(|(_, _, size)| size).ok_or_else(|| self.missing("disp_size"))
    }
}

pub fn base(basic: BasicType, size: usize) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::BaseType, "");
    symbol.basic = Some(basic);
    symbol.size = size;
    symbol.build()
}

pub fn int4() -> SymbolRef
{
    base(BasicType::Int, 4)
}

pub fn uint1() -> SymbolRef
{
    base(BasicType::UInt, 1)
}

pub fn double() -> SymbolRef
{
    base(BasicType::Float, 8)
}

pub fn member(name: &str, ty: &SymbolRef, offset: u64) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Data, name);
    symbol.data_kind = Some(DataKind::Member);
    symbol.location_kind = LocationKind::ThisRel;
    symbol.size = ty.size().unwrap_or(0);
    symbol.ty = Some(Arc::clone(ty));
    symbol.offset = Some(offset);
    symbol.build()
}

pub fn static_member(name: &str, ty: &SymbolRef, va: u64) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Data, name);
    symbol.data_kind = Some(DataKind::StaticMember);
    symbol.location_kind = LocationKind::Static;
    symbol.size = ty.size().unwrap_or(0);
    symbol.ty = Some(Arc::clone(ty));
    symbol.va = Some(va);
    symbol.build()
}

/// Bit-field member: `width` bits at `position` inside the unit at `offset`.
pub fn bit_member(name: &str, ty: &SymbolRef, offset: u64, width: usize, position: u32) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Data, name);
    symbol.data_kind = Some(DataKind::Member);
    symbol.location_kind = LocationKind::BitField;
    symbol.size = width;
    symbol.ty = Some(Arc::clone(ty));
    symbol.offset = Some(offset);
    symbol.bit_position = Some(position);
    symbol.build()
}

pub fn vtable(offset: u64) -> SymbolRef
{
    let mut pointer = MockSymbol::new(SymTag::PointerType, "");
    pointer.size = 8;
    pointer.ty = Some(base(BasicType::Void, 0));

    let mut symbol = MockSymbol::new(SymTag::VTable, "");
    symbol.offset = Some(offset);
    symbol.size = 8;
    symbol.ty = Some(pointer.build());
    symbol.build()
}

pub fn udt(name: &str, size: usize, children: Vec<SymbolRef>) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Udt, name);
    symbol.size = size;
    symbol.children = children;
    symbol.build()
}

pub fn base_class(name: &str, offset: u64, children: Vec<SymbolRef>) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::BaseClass, name);
    symbol.offset = Some(offset);
    symbol.children = children;
    symbol.build()
}

pub fn virtual_base_class(name: &str, vbptr_offset: u64, disp_index: i64, children: Vec<SymbolRef>) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::BaseClass, name);
    symbol.children = children;
    symbol.virtual_base = Some((vbptr_offset, disp_index, 4));
    symbol.build()
}

pub fn enumerator(name: &str, ty: &SymbolRef, value: NumVariant) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Data, name);
    symbol.data_kind = Some(DataKind::Constant);
    symbol.location_kind = LocationKind::Constant;
    symbol.ty = Some(Arc::clone(ty));
    symbol.value = Some(value);
    symbol.build()
}

pub fn enumeration(name: &str, underlying: &SymbolRef, values: &[(&str, i32)]) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Enum, name);
    symbol.size = underlying.size().unwrap_or(4);
    symbol.ty = Some(Arc::clone(underlying));
    symbol.children = values
        .iter()
        .map(|(name, value)| enumerator(name, underlying, NumVariant::from(*value)))
        .collect();
    symbol.build()
}

pub fn pointer(target: &SymbolRef, size: usize) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::PointerType, "");
    symbol.size = size;
    symbol.ty = Some(Arc::clone(target));
    symbol.build()
}

pub fn array(element: &SymbolRef, count: usize) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::ArrayType, "");
    symbol.size = element.size().unwrap_or(0).saturating_mul(count);
    symbol.ty = Some(Arc::clone(element));
    symbol.count = Some(count);
    symbol.build()
}

pub fn typedef(name: &str, target: &SymbolRef) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Typedef, name);
    symbol.size = target.size().unwrap_or(0);
    symbol.ty = Some(Arc::clone(target));
    symbol.build()
}

pub fn global(name: &str, ty: &SymbolRef, va: u64) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Data, name);
    symbol.data_kind = Some(DataKind::Global);
    symbol.location_kind = LocationKind::Static;
    symbol.size = ty.size().unwrap_or(0);
    symbol.ty = Some(Arc::clone(ty));
    symbol.va = Some(va);
    symbol.build()
}

pub fn function(name: &str, va: u64) -> SymbolRef
{
    let mut symbol = MockSymbol::new(SymTag::Function, name);
    symbol.va = Some(va);
    symbol.build()
}

/// Provider whose global scope holds `children`.
pub struct MockProvider
{
    scope: SymbolRef,
    machine: MachineType,
}

impl MockProvider
{
    pub fn new(machine: MachineType, children: Vec<SymbolRef>) -> Arc<Self>
    {
        let mut scope = MockSymbol::new(SymTag::Exe, "");
        scope.children = children;
        scope.machine = machine;
        Arc::new(Self {
            scope: scope.build(),
            machine,
        })
    }
}

impl SymbolProvider for MockProvider
{
    fn global_scope(&self) -> Result<SymbolRef>
    {
        Ok(Arc::clone(&self.scope))
    }

    fn machine_type(&self) -> MachineType
    {
        self.machine
    }
}

/// Flat target memory starting at `base`.
pub struct FakeMemory
{
    base: u64,
    bytes: Mutex<Vec<u8>>,
}

impl FakeMemory
{
    pub fn new(base: u64, bytes: Vec<u8>) -> Arc<Self>
    {
        Arc::new(Self {
            base,
            bytes: Mutex::new(bytes),
        })
    }

    pub fn zeroed(base: u64, size: usize) -> Arc<Self>
    {
        Self::new(base, vec![0; size])
    }

    pub fn poke(&self, address: u64, data: &[u8])
    {
        let start = (address - self.base) as usize;
        self.bytes.lock().unwrap()[start..start + data.len()].copy_from_slice(data);
    }

    fn range(&self, address: Address, len: usize) -> Result<std::ops::Range<usize>>
    {
        let size = self.bytes.lock().unwrap().len();
        address
            .value()
            .checked_sub(self.base)
            .map(|start| start as usize)
            .filter(|start| start + len <= size)
            .map(|start| start..start + len)
            .ok_or_else(|| SymscopeError::MemoryAccess {
                address: address.value(),
                length: len,
                reason: String::from("unmapped"),
            })
    }
}

impl MemoryBackend for FakeMemory
{
    fn read_memory(&self, address: Address, buf: &mut [u8]) -> Result<()>
    {
        let range = self.range(address, buf.len())?;
        buf.copy_from_slice(&self.bytes.lock().unwrap()[range]);
        Ok(())
    }

    fn write_memory(&self, address: Address, data: &[u8]) -> Result<()>
    {
        let range = self.range(address, data.len())?;
        self.bytes.lock().unwrap()[range].copy_from_slice(data);
        Ok(())
    }
}

/// Register file keyed by name.
#[derive(Default)]
pub struct FakeRegisters
{
    registers: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeRegisters
{
    pub fn with(registers: &[(&str, Vec<u8>)]) -> Arc<Self>
    {
        let map = registers.iter().map(|(name, value)| ((*name).to_string(), value.clone())).collect();
        Arc::new(Self {
            registers: Mutex::new(map),
        })
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>>
    {
        self.registers.lock().unwrap().get(name).cloned()
    }

    fn unknown(name: &str) -> SymscopeError
    {
        SymscopeError::RegisterAccess {
            name: name.to_string(),
            reason: String::from("unknown register"),
        }
    }
}

impl RegisterBackend for FakeRegisters
{
    fn register_size(&self, name: &str) -> Result<usize>
    {
        self.get(name).map(|value| value.len()).ok_or_else(|| Self::unknown(name))
    }

    fn read_register(&self, name: &str) -> Result<Vec<u8>>
    {
        self.get(name).ok_or_else(|| Self::unknown(name))
    }

    fn write_register(&self, name: &str, value: &[u8]) -> Result<()>
    {
        let mut registers = self.registers.lock().unwrap();
        let slot = registers.get_mut(name).ok_or_else(|| Self::unknown(name))?;
        slot.copy_from_slice(value);
        Ok(())
    }
}
