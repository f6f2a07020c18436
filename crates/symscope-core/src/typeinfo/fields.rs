//! Fields of user-defined types and enumerations.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use smallvec::SmallVec;
use tracing::trace;

use super::{load_type, TypeInfoRef};
use crate::access::MemoryBackend;
use crate::error::{Result, SymscopeError};
use crate::num::NumVariant;
use crate::symbols::{DataKind, SymTag, SymbolRef};
use crate::types::{Address, PointerSize};

/// Name given to the virtual function table pointer of a UDT.
pub const VTABLE_FIELD_NAME: &str = "__VFN_table";

/// Indirection locating a virtual base inside one particular object
///
/// The object holds a pointer to a displacement table at `vbptr_offset`. Entry
/// `disp_index` of that table (each `disp_size` bytes wide) is the signed
/// distance from the pointer's own location to the virtual base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualBase
{
    pub vbptr_offset: u64,
    pub disp_index: i64,
    pub disp_size: usize,
}

impl VirtualBase
{
    /// Runtime address of the virtual base inside the object at `object`.
    pub fn resolve(&self, object: Address, memory: &dyn MemoryBackend, pointer_size: PointerSize) -> Result<Address>
    {
        let vbptr = object + self.vbptr_offset;
        let table = Address::new(memory.read_pointer(vbptr, pointer_size.bytes())?);
        let entry = table.offset(self.disp_index.wrapping_mul(self.disp_size as i64));
        let displacement = read_signed(memory, entry, self.disp_size)?;
        trace!(%vbptr, %entry, displacement, "resolved virtual base displacement");
        Ok(vbptr.offset(displacement))
    }
}

/// Virtual bases crossed to reach a member, outermost first
///
/// Each step is relative to the subobject located by the step before it, so a
/// member of `Root` in `Top : virtual Mid`, `Mid : virtual Root` goes through
/// `Top`'s displacement table and then through `Mid`'s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VirtualPath
{
    steps: SmallVec<[VirtualBase; 2]>,
}

impl VirtualPath
{
    pub fn steps(&self) -> &[VirtualBase]
    {
        &self.steps
    }

    /// Innermost virtual base of the path.
    pub fn last(&self) -> Option<&VirtualBase>
    {
        self.steps.last()
    }

    fn then(&self, step: VirtualBase) -> Self
    {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Runtime address of the innermost virtual base inside the object at
    /// `object`.
    pub fn resolve(&self, object: Address, memory: &dyn MemoryBackend, pointer_size: PointerSize) -> Result<Address>
    {
        self.steps
            .iter()
            .try_fold(object, |subobject, step| step.resolve(subobject, memory, pointer_size))
    }
}

fn read_signed(memory: &dyn MemoryBackend, address: Address, size: usize) -> Result<i64>
{
    let mut bytes = [0u8; 8];
    let buf = bytes
        .get_mut(..size)
        .filter(|buf| !buf.is_empty())
        .ok_or_else(|| SymscopeError::InvalidArgument(format!("unsupported displacement size {size}")))?;
    memory.read_memory(address, buf)?;
    let shift = 64 - 8 * size as u32;
    Ok((i64::from_le_bytes(bytes) << shift) >> shift)
}

/// Where a field's data lives
#[derive(Debug, Clone, PartialEq)]
pub enum FieldLocation
{
    /// Instance data at `offset` from the start of the object, or from the
    /// start of the innermost virtual base when `virtual_base` is set.
    Member
    {
        offset: u64,
        virtual_base: Option<VirtualPath>,
    },
    /// Static member at a fixed address.
    Static
    {
        va: Address
    },
    /// Enumerator.
    Constant
    {
        value: NumVariant
    },
}

/// One entry of a UDT or enum field list
pub struct UdtField
{
    name: String,
    symbol: SymbolRef,
    location: FieldLocation,
    ty: OnceCell<TypeInfoRef>,
}

impl UdtField
{
    fn new(name: String, symbol: SymbolRef, location: FieldLocation) -> Self
    {
        Self {
            name,
            symbol,
            location,
            ty: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn symbol(&self) -> &SymbolRef
    {
        &self.symbol
    }

    pub fn location(&self) -> &FieldLocation
    {
        &self.location
    }

    pub fn is_static_member(&self) -> bool
    {
        matches!(self.location, FieldLocation::Static { .. })
    }

    pub fn is_virtual_member(&self) -> bool
    {
        matches!(
            self.location,
            FieldLocation::Member {
                virtual_base: Some(_),
                ..
            }
        )
    }

    /// Enumerator value; `None` for data members.
    pub fn value(&self) -> Option<NumVariant>
    {
        match self.location {
            FieldLocation::Constant { value } => Some(value),
            _ => None,
        }
    }

    /// Offset from the start of the enclosing object
    ///
    /// Members of virtual bases have no fixed offset and fail; use
    /// [`UdtField::address`] with a live object instead.
    pub fn offset(&self) -> Result<u64>
    {
        match self.location {
            FieldLocation::Member {
                offset,
                virtual_base: None,
            } => Ok(offset),
            FieldLocation::Constant { .. } => Ok(0),
            FieldLocation::Member { .. } => Err(SymscopeError::invalid_operation(&self.name, "offset of virtual base member")),
            FieldLocation::Static { .. } => Err(SymscopeError::invalid_operation(&self.name, "offset of static member")),
        }
    }

    /// Address of a static member.
    pub fn va(&self) -> Result<Address>
    {
        match self.location {
            FieldLocation::Static { va } => Ok(va),
            _ => Err(SymscopeError::invalid_operation(&self.name, "va of non-static member")),
        }
    }

    /// Address of this field inside the object at `object`.
    pub fn address(&self, object: Address, memory: &dyn MemoryBackend, pointer_size: PointerSize) -> Result<Address>
    {
        match &self.location {
            FieldLocation::Static { va } => Ok(*va),
            FieldLocation::Member {
                offset,
                virtual_base: None,
            } => Ok(object + *offset),
            FieldLocation::Member {
                offset,
                virtual_base: Some(path),
            } => Ok(path.resolve(object, memory, pointer_size)? + *offset),
            FieldLocation::Constant { .. } => Err(SymscopeError::invalid_operation(&self.name, "address of enumerator")),
        }
    }

    /// Type of the field, resolved on first use.
    pub fn type_info(&self) -> Result<TypeInfoRef>
    {
        self.ty
            .get_or_try_init(|| match (&self.location, self.symbol.tag()) {
                (FieldLocation::Constant { .. }, _) | (_, SymTag::VTable) => load_type(&self.symbol.ty()?),
                _ => load_type(&self.symbol),
            })
            .cloned()
    }
}

impl fmt::Debug for UdtField
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("UdtField")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable field collection
#[derive(Debug, Default)]
pub struct FieldList
{
    fields: Vec<Arc<UdtField>>,
}

impl FieldList
{
    pub fn len(&self) -> usize
    {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<UdtField>>
    {
        self.fields.iter()
    }

    pub fn get(&self, index: usize) -> Result<&Arc<UdtField>>
    {
        self.fields.get(index).ok_or(SymscopeError::Index {
            index,
            count: self.fields.len(),
        })
    }

    /// First field called `name`.
    pub fn lookup(&self, name: &str) -> Result<&Arc<UdtField>>
    {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| SymscopeError::SymbolNotFound(format!("field '{name}'")))
    }

    fn push(&mut self, field: UdtField)
    {
        self.fields.push(Arc::new(field));
    }
}

/// Build the fields of a struct, class or union symbol
///
/// Non-virtual members come first, in declaration order, with offsets
/// accumulated through non-virtual base classes. Members of virtual bases are
/// appended afterwards, each virtual base once, including the virtual bases
/// of virtual bases.
pub(crate) fn build_udt_fields(symbol: &SymbolRef) -> Result<FieldList>
{
    let mut fields = FieldList::default();
    collect_fields(symbol, 0, None, &mut fields)?;

    let mut seen = HashSet::new();
    collect_virtual_fields(symbol, 0, &VirtualPath::default(), &mut seen, &mut fields)?;

    trace!(count = fields.len(), "built udt field list");
    Ok(fields)
}

fn collect_fields(root: &SymbolRef, start: u64, virtual_base: Option<&VirtualPath>, out: &mut FieldList) -> Result<()>
{
    for child in root.children()? {
        match child.tag() {
            SymTag::BaseClass => {
                if !child.is_virtual_base_class()? {
                    collect_fields(&child, start + child.offset()?, virtual_base, out)?;
                }
            }
            SymTag::Data => match child.data_kind()? {
                DataKind::Member => {
                    let location = FieldLocation::Member {
                        offset: start + child.offset()?,
                        virtual_base: virtual_base.cloned(),
                    };
                    out.push(UdtField::new(child.name()?, child, location));
                }
                DataKind::StaticMember => {
                    let location = FieldLocation::Static { va: child.va()? };
                    out.push(UdtField::new(child.name()?, child, location));
                }
                _ => {}
            },
            SymTag::VTable => {
                let location = FieldLocation::Member {
                    offset: start + child.offset()?,
                    virtual_base: virtual_base.cloned(),
                };
                out.push(UdtField::new(VTABLE_FIELD_NAME.to_string(), child, location));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Second pass: virtual bases reachable from `root`
///
/// `start` is the offset of `root` inside the subobject `path` leads to.
fn collect_virtual_fields(
    root: &SymbolRef,
    start: u64,
    path: &VirtualPath,
    seen: &mut HashSet<String>,
    out: &mut FieldList,
) -> Result<()>
{
    for child in root.children()? {
        if child.tag() != SymTag::BaseClass {
            continue;
        }

        if !child.is_virtual_base_class()? {
            collect_virtual_fields(&child, start + child.offset()?, path, seen, out)?;
            continue;
        }

        if !seen.insert(child.name()?) {
            continue;
        }

        let nested = path.then(VirtualBase {
            vbptr_offset: start + child.virtual_base_pointer_offset()?,
            disp_index: child.virtual_base_disp_index()?,
            disp_size: child.virtual_base_disp_size()?,
        });
        collect_fields(&child, 0, Some(&nested), out)?;
        collect_virtual_fields(&child, 0, &nested, seen, out)?;
    }
    Ok(())
}

/// Build the enumerator list of an enum symbol.
pub(crate) fn build_enum_fields(symbol: &SymbolRef) -> Result<FieldList>
{
    let mut fields = FieldList::default();
    for child in symbol.children()? {
        let location = FieldLocation::Constant { value: child.value()? };
        fields.push(UdtField::new(child.name()?, child, location));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests
{
    use super::*;

    struct Bytes(Vec<u8>);

    impl MemoryBackend for Bytes
    {
        fn read_memory(&self, address: Address, buf: &mut [u8]) -> Result<()>
        {
            let start = address.value() as usize;
            buf.copy_from_slice(&self.0[start..start + buf.len()]);
            Ok(())
        }

        fn write_memory(&self, _address: Address, _data: &[u8]) -> Result<()>
        {
            Ok(())
        }
    }

    #[test]
    fn test_read_signed_sign_extends()
    {
        let memory = Bytes(vec![0xf0, 0xff, 0xff, 0xff, 0x10, 0, 0, 0]);
        assert_eq!(read_signed(&memory, Address::ZERO, 4).unwrap(), -16);
        assert_eq!(read_signed(&memory, Address::new(4), 4).unwrap(), 16);
        assert_eq!(read_signed(&memory, Address::ZERO, 1).unwrap(), -16);
        assert!(read_signed(&memory, Address::ZERO, 0).is_err());
    }

    #[test]
    fn test_virtual_base_resolution()
    {
        // object at 0x00: vbptr at +8 pointing to table at 0x20; entry 1 holds 0x18
        let mut image = vec![0u8; 0x30];
        image[8..16].copy_from_slice(&0x20u64.to_le_bytes());
        image[0x24..0x28].copy_from_slice(&0x18i32.to_le_bytes());
        let memory = Bytes(image);

        let virtual_base = VirtualBase {
            vbptr_offset: 8,
            disp_index: 1,
            disp_size: 4,
        };
        let base = virtual_base.resolve(Address::ZERO, &memory, PointerSize::Eight).unwrap();
        assert_eq!(base, Address::new(0x20));
    }
}
