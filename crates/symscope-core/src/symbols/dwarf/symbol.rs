//! [`Symbol`] view of DWARF debugging information entries.

use std::fmt;
use std::sync::Arc;

use gimli::{constants, AttributeValue};
use once_cell::sync::OnceCell;
use tracing::warn;

use super::location::MemberLocation;
use super::{DieRef, DwarfImage, OwnedReader};
use crate::error::{Result, SymscopeError};
use crate::num::{NumType, NumVariant};
use crate::symbols::{BasicType, DataKind, LocationKind, MachineType, SymTag, Symbol, SymbolRef};
use crate::typeinfo::BaseType;
use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node
{
    /// Name index over the whole image
    Global,
    Die(DieRef),
    /// Member, static member, base class or vtable pointer of a UDT
    Field(DieRef),
    /// Dimension `dim` of a (possibly multi-dimensional) array type
    ArrayDim
    {
        die: DieRef, dim: usize
    },
    Enumerator
    {
        die: DieRef, enumeration: DieRef
    },
    /// Type of an entry with no `DW_AT_type`
    Void,
    /// Underlying type of an enumeration that names none
    ImplicitInt
    {
        size: usize
    },
    /// `depth` levels of pointer to void, used for vtable pointers
    VoidPointer
    {
        depth: u8
    },
}

pub(crate) struct DwarfSymbol
{
    image: Arc<DwarfImage>,
    node: Node,
    tag: SymTag,
    children: OnceCell<Vec<SymbolRef>>,
}

impl fmt::Debug for DwarfSymbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("DwarfSymbol")
            .field("node", &self.node)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

fn die_tag(image: &DwarfImage, die: DieRef) -> Result<SymTag>
{
    Ok(match image.tag(die)? {
        constants::DW_TAG_base_type => SymTag::BaseType,
        constants::DW_TAG_structure_type | constants::DW_TAG_class_type | constants::DW_TAG_union_type => SymTag::Udt,
        constants::DW_TAG_inheritance => SymTag::BaseClass,
        constants::DW_TAG_member => {
            if is_vtable_pointer(image, die)? {
                SymTag::VTable
            } else {
                SymTag::Data
            }
        }
        constants::DW_TAG_variable
        | constants::DW_TAG_formal_parameter
        | constants::DW_TAG_constant
        | constants::DW_TAG_enumerator => SymTag::Data,
        constants::DW_TAG_array_type => SymTag::ArrayType,
        constants::DW_TAG_pointer_type | constants::DW_TAG_reference_type | constants::DW_TAG_rvalue_reference_type => {
            SymTag::PointerType
        }
        constants::DW_TAG_enumeration_type => SymTag::Enum,
        constants::DW_TAG_typedef
        | constants::DW_TAG_const_type
        | constants::DW_TAG_volatile_type
        | constants::DW_TAG_restrict_type
        | constants::DW_TAG_atomic_type => SymTag::Typedef,
        constants::DW_TAG_subprogram => SymTag::Function,
        constants::DW_TAG_subroutine_type => SymTag::FunctionType,
        constants::DW_TAG_compile_unit | constants::DW_TAG_partial_unit | constants::DW_TAG_type_unit => {
            SymTag::Compiland
        }
        constants::DW_TAG_lexical_block => SymTag::Block,
        constants::DW_TAG_label => SymTag::Label,
        _ => SymTag::Null,
    })
}

/// `_vptr.Foo` (GCC) or `_vptr$Foo` (Clang), always artificial.
fn is_vtable_pointer(image: &DwarfImage, die: DieRef) -> Result<bool>
{
    if !image.flag(die, constants::DW_AT_artificial)? {
        return Ok(false);
    }
    Ok(image.name(die)?.is_some_and(|name| name.starts_with("_vptr")))
}

/// Integer representation for an enumerator or constant of `size` bytes.
fn integer_num_type(size: usize, signed: bool) -> Result<NumType>
{
    Ok(match (size, signed) {
        (1, true) => NumType::Char,
        (1, false) => NumType::UChar,
        (2, true) => NumType::Short,
        (2, false) => NumType::UShort,
        (4, true) => NumType::Long,
        (4, false) => NumType::ULong,
        (8, true) => NumType::LongLong,
        (8, false) => NumType::ULongLong,
        _ => return Err(SymscopeError::UnsupportedType(format!("constant of size {size}"))),
    })
}

/// `DW_AT_const_value` as a variant of representation `num_type`
///
/// Fixed-size data forms carry no signedness; they are sign-extended when the
/// target representation is signed.
fn const_variant(value: &AttributeValue<OwnedReader>, num_type: NumType) -> Result<NumVariant>
{
    let signed = NumVariant::Char(0).cast(num_type).is_signed();
    let raw = match *value {
        AttributeValue::Sdata(v) => NumVariant::from(v),
        AttributeValue::Udata(v) => NumVariant::from(v),
        AttributeValue::Data1(v) if signed => NumVariant::from(v as i8),
        AttributeValue::Data2(v) if signed => NumVariant::from(v as i16),
        AttributeValue::Data4(v) if signed => NumVariant::from(v as i32),
        AttributeValue::Data8(v) if signed => NumVariant::from(v as i64),
        AttributeValue::Data1(v) => NumVariant::from(v),
        AttributeValue::Data2(v) => NumVariant::from(v),
        AttributeValue::Data4(v) => NumVariant::from(v),
        AttributeValue::Data8(v) => NumVariant::from(v),
        ref other => return Err(SymscopeError::Dwarf(format!("unsupported constant form {other:?}"))),
    };
    Ok(raw.cast(num_type))
}

impl DwarfSymbol
{
    fn new(image: Arc<DwarfImage>, node: Node, tag: SymTag) -> Self
    {
        Self {
            image,
            node,
            tag,
            children: OnceCell::new(),
        }
    }

    pub(crate) fn global(image: Arc<DwarfImage>) -> Self
    {
        Self::new(image, Node::Global, SymTag::Exe)
    }

    fn synthetic(&self, node: Node, tag: SymTag) -> SymbolRef
    {
        Arc::new(Self::new(Arc::clone(&self.image), node, tag))
    }

    /// Symbol for a DIE reached by reference or from the name index.
    fn from_die(image: &Arc<DwarfImage>, die: DieRef) -> Result<SymbolRef>
    {
        let die = Self::complete_type(image, die)?;
        let tag = die_tag(image, die)?;
        let node = if tag == SymTag::ArrayType {
            Node::ArrayDim { die, dim: 0 }
        } else {
            Node::Die(die)
        };
        Ok(Arc::new(Self::new(Arc::clone(image), node, tag)))
    }

    /// Symbol for a child of a UDT.
    fn field(image: &Arc<DwarfImage>, die: DieRef) -> Result<SymbolRef>
    {
        match image.tag(die)? {
            constants::DW_TAG_member | constants::DW_TAG_inheritance | constants::DW_TAG_variable => {
                let tag = die_tag(image, die)?;
                Ok(Arc::new(Self::new(Arc::clone(image), Node::Field(die), tag)))
            }
            _ => Self::from_die(image, die),
        }
    }

    /// Swap a forward declaration of a UDT or enum for its definition.
    fn complete_type(image: &DwarfImage, die: DieRef) -> Result<DieRef>
    {
        let is_type = matches!(
            image.tag(die)?,
            constants::DW_TAG_structure_type
                | constants::DW_TAG_class_type
                | constants::DW_TAG_union_type
                | constants::DW_TAG_enumeration_type
        );
        if !is_type || !image.flag(die, constants::DW_AT_declaration)? {
            return Ok(die);
        }
        let Some(name) = image.name(die)? else {
            return Ok(die);
        };
        Ok(image.lookup(&name)?.unwrap_or(die))
    }

    fn die(&self) -> Option<DieRef>
    {
        match self.node {
            Node::Die(die) | Node::Field(die) | Node::ArrayDim { die, .. } | Node::Enumerator { die, .. } => Some(die),
            Node::Global | Node::Void | Node::ImplicitInt { .. } | Node::VoidPointer { .. } => None,
        }
    }

    fn required_die(&self, what: &'static str) -> Result<DieRef>
    {
        self.die().ok_or_else(|| self.missing(what))
    }

    fn pointer_bytes(&self) -> usize
    {
        self.image.machine().pointer_size().bytes()
    }

    /// Symbol named by `DW_AT_type`, or void when absent.
    fn referenced_type(&self, die: DieRef) -> Result<SymbolRef>
    {
        match self.image.reference(die, constants::DW_AT_type)? {
            Some(target) => Self::from_die(&self.image, target),
            None => Ok(self.synthetic(Node::Void, SymTag::BaseType)),
        }
    }

    fn subranges(&self, die: DieRef) -> Result<Vec<DieRef>>
    {
        let mut out = Vec::new();
        for child in self.image.children(die)? {
            if self.image.tag(child)? == constants::DW_TAG_subrange_type {
                out.push(child);
            }
        }
        Ok(out)
    }

    fn subrange_count(&self, subrange: DieRef) -> Result<usize>
    {
        if let Some(count) = self.image.udata(subrange, constants::DW_AT_count)? {
            return Ok(count as usize);
        }
        let upper = match self.image.attr(subrange, constants::DW_AT_upper_bound)? {
            Some(AttributeValue::Sdata(value)) => value,
            Some(value) => match value.udata_value() {
                Some(value) => value as i64,
                None => return Ok(0),
            },
            None => return Ok(0),
        };
        let lower = self.image.udata(subrange, constants::DW_AT_lower_bound)?.unwrap_or(0) as i64;
        Ok(usize::try_from(upper - lower + 1).unwrap_or(0))
    }

    fn is_bit_field(&self) -> Result<bool>
    {
        match self.node {
            Node::Field(die) => Ok(self.image.attr(die, constants::DW_AT_bit_size)?.is_some()),
            _ => Ok(false),
        }
    }

    fn is_static_field(&self, die: DieRef) -> Result<bool>
    {
        Ok(match self.image.tag(die)? {
            constants::DW_TAG_variable => true,
            constants::DW_TAG_member => {
                self.image.flag(die, constants::DW_AT_declaration)?
                    || (self.image.flag(die, constants::DW_AT_external)?
                        && self.image.attr(die, constants::DW_AT_data_member_location)?.is_none())
            }
            _ => false,
        })
    }

    /// Byte offset of the storage unit and bit position inside it.
    fn bit_layout(&self, die: DieRef) -> Result<(u64, u32)>
    {
        let bit_size = self.image.udata(die, constants::DW_AT_bit_size)?.unwrap_or(0);
        let storage = match self.image.udata(die, constants::DW_AT_byte_size)? {
            Some(size) => size,
            None => self.referenced_type(die)?.size()? as u64,
        };
        if storage == 0 {
            return Err(SymscopeError::Dwarf(String::from("bit-field with zero-sized storage")));
        }

        if let Some(data_bit_offset) = self.image.udata(die, constants::DW_AT_data_bit_offset)? {
            let byte = data_bit_offset / (storage * 8) * storage;
            return Ok((byte, (data_bit_offset - byte * 8) as u32));
        }

        let byte = match self.image.member_location(die)? {
            MemberLocation::Offset(offset) => offset,
            MemberLocation::VirtualBase { .. } => {
                return Err(SymscopeError::Dwarf(String::from("bit-field located through a virtual base")));
            }
        };
        let Some(bit_offset) = self.image.udata(die, constants::DW_AT_bit_offset)? else {
            return Ok((byte, 0));
        };
        if !self.image.is_little_endian() {
            return Ok((byte, bit_offset as u32));
        }
        // DW_AT_bit_offset counts from the most significant bit of the storage unit.
        let position = (storage * 8)
            .checked_sub(bit_offset + bit_size)
            .ok_or_else(|| SymscopeError::Dwarf(String::from("bit-field exceeds its storage unit")))?;
        Ok((byte, position as u32))
    }

    fn build_children(&self) -> Result<Vec<SymbolRef>>
    {
        match (self.node, self.tag) {
            (Node::Global, _) => self
                .image
                .global_names()?
                .into_iter()
                .map(|die| Self::from_die(&self.image, die))
                .collect(),
            (Node::Die(die), SymTag::Udt) => self
                .image
                .children(die)?
                .into_iter()
                .map(|child| Self::field(&self.image, child))
                .collect(),
            (Node::Field(die), SymTag::BaseClass) => {
                let class = self
                    .image
                    .reference(die, constants::DW_AT_type)?
                    .ok_or_else(|| SymscopeError::Dwarf(String::from("base class without a type")))?;
                let class = Self::complete_type(&self.image, class)?;
                self.image
                    .children(class)?
                    .into_iter()
                    .map(|child| Self::field(&self.image, child))
                    .collect()
            }
            (Node::Die(die), SymTag::Enum) => {
                let mut out = Vec::new();
                for child in self.image.children(die)? {
                    if self.image.tag(child)? == constants::DW_TAG_enumerator {
                        out.push(self.synthetic(
                            Node::Enumerator {
                                die: child,
                                enumeration: die,
                            },
                            SymTag::Data,
                        ));
                    }
                }
                Ok(out)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn child_list(&self) -> Result<&Vec<SymbolRef>>
    {
        self.children.get_or_try_init(|| self.build_children())
    }
}

impl Symbol for DwarfSymbol
{
    fn tag(&self) -> SymTag
    {
        self.tag
    }

    fn name(&self) -> Result<String>
    {
        let name = match self.node {
            Node::Global => {
                let stem = self.image.path.file_stem();
                return Ok(stem.map_or_else(String::new, |stem| stem.to_string_lossy().into_owned()));
            }
            Node::Void => return Ok(String::from("void")),
            Node::ImplicitInt { .. } => return Ok(String::from("int")),
            Node::VoidPointer { .. } | Node::ArrayDim { .. } => return Ok(String::new()),
            Node::Die(die) | Node::Field(die) | Node::Enumerator { die, .. } => self.image.name(die)?,
        };
        Ok(match (name, self.tag) {
            (Some(name), _) => name,
            (None, SymTag::Udt | SymTag::Enum) => String::from("<anonymous>"),
            (None, _) => String::new(),
        })
    }

    fn size(&self) -> Result<usize>
    {
        let die = match self.node {
            Node::Global => return Err(self.missing("size")),
            Node::Void => return Ok(0),
            Node::ImplicitInt { size } => return Ok(size),
            Node::VoidPointer { .. } => return Ok(self.pointer_bytes()),
            Node::ArrayDim { .. } => {
                let (count, element) = (self.count()?, self.ty()?.size()?);
                return count
                    .checked_mul(element)
                    .ok_or_else(|| SymscopeError::Dwarf(format!("array of {count} x {element} bytes overflows")));
            }
            Node::Enumerator { .. } => return self.ty()?.size(),
            Node::Die(die) | Node::Field(die) => die,
        };

        if self.is_bit_field()? {
            return Ok(self.image.udata(die, constants::DW_AT_bit_size)?.unwrap_or(0) as usize);
        }
        if self.tag != SymTag::Data {
            if let Some(size) = self.image.udata(die, constants::DW_AT_byte_size)? {
                return Ok(size as usize);
            }
        }

        match self.tag {
            SymTag::Data | SymTag::Typedef | SymTag::BaseClass | SymTag::Enum => self.ty()?.size(),
            SymTag::PointerType | SymTag::VTable => Ok(usize::from(self.image.unit(die.unit)?.encoding().address_size)),
            _ => Err(self.missing("size")),
        }
    }

    fn ty(&self) -> Result<SymbolRef>
    {
        match self.node {
            Node::Global | Node::Void | Node::ImplicitInt { .. } => Err(self.missing("ty")),
            Node::VoidPointer { depth } if depth > 1 => {
                Ok(self.synthetic(Node::VoidPointer { depth: depth - 1 }, SymTag::PointerType))
            }
            Node::VoidPointer { .. } => Ok(self.synthetic(Node::Void, SymTag::BaseType)),
            Node::ArrayDim { die, dim } => {
                if dim + 1 < self.subranges(die)?.len() {
                    Ok(self.synthetic(Node::ArrayDim { die, dim: dim + 1 }, SymTag::ArrayType))
                } else {
                    self.referenced_type(die)
                }
            }
            Node::Enumerator { enumeration, .. } => Self::from_die(&self.image, enumeration)?.ty(),
            Node::Die(die) | Node::Field(die) => match self.tag {
                SymTag::VTable => Ok(self.synthetic(Node::VoidPointer { depth: 2 }, SymTag::PointerType)),
                SymTag::Enum if self.image.attr(die, constants::DW_AT_type)?.is_none() => {
                    let size = self.image.udata(die, constants::DW_AT_byte_size)?.unwrap_or(4) as usize;
                    Ok(self.synthetic(Node::ImplicitInt { size }, SymTag::BaseType))
                }
                _ => self.referenced_type(die),
            },
        }
    }

    fn child_count(&self) -> Result<usize>
    {
        Ok(self.child_list()?.len())
    }

    fn child_by_index(&self, index: usize) -> Result<SymbolRef>
    {
        let children = self.child_list()?;
        children.get(index).cloned().ok_or(SymscopeError::Index {
            index,
            count: children.len(),
        })
    }

    fn child_by_name(&self, name: &str) -> Result<SymbolRef>
    {
        if self.node == Node::Global {
            let die = self
                .image
                .lookup(name)?
                .ok_or_else(|| SymscopeError::SymbolNotFound(name.to_string()))?;
            return Self::from_die(&self.image, die);
        }
        for child in self.child_list()? {
            if child.name()? == name {
                return Ok(Arc::clone(child));
            }
        }
        Err(SymscopeError::SymbolNotFound(name.to_string()))
    }

    fn machine_type(&self) -> MachineType
    {
        self.image.machine()
    }

    fn base_type(&self) -> Result<BasicType>
    {
        let die = match self.node {
            Node::Void => return Ok(BasicType::Void),
            Node::ImplicitInt { .. } => return Ok(BasicType::Int),
            Node::Die(die) if self.tag == SymTag::BaseType => die,
            _ => return Err(self.missing("base_type")),
        };

        let encoding = match self.image.attr(die, constants::DW_AT_encoding)? {
            Some(AttributeValue::Encoding(encoding)) => encoding,
            _ => return Ok(BasicType::NoType),
        };
        let size = self.size()?;
        let is_wchar = self.image.name(die)?.as_deref() == Some("wchar_t");

        Ok(match encoding {
            constants::DW_ATE_signed | constants::DW_ATE_unsigned if is_wchar && size == 2 => BasicType::WChar,
            constants::DW_ATE_signed => BasicType::Int,
            constants::DW_ATE_unsigned | constants::DW_ATE_unsigned_char => BasicType::UInt,
            constants::DW_ATE_signed_char => BasicType::Char,
            constants::DW_ATE_boolean => BasicType::Bool,
            constants::DW_ATE_float if size == 4 || size == 8 => BasicType::Float,
            constants::DW_ATE_UTF if size == 2 => BasicType::WChar,
            constants::DW_ATE_UTF => BasicType::UInt,
            other => {
                warn!(encoding = %other, size, "unsupported base type encoding");
                BasicType::NoType
            }
        })
    }

    fn data_kind(&self) -> Result<DataKind>
    {
        match self.node {
            Node::Enumerator { .. } => Ok(DataKind::Constant),
            Node::Field(die) if self.tag == SymTag::Data => Ok(if self.is_static_field(die)? {
                DataKind::StaticMember
            } else {
                DataKind::Member
            }),
            Node::Die(die) if self.tag == SymTag::Data => {
                if self.image.attr(die, constants::DW_AT_const_value)?.is_some() {
                    return Ok(DataKind::Constant);
                }
                Ok(match self.image.tag(die)? {
                    constants::DW_TAG_formal_parameter => DataKind::Param,
                    _ if self.image.flag(die, constants::DW_AT_external)? => DataKind::Global,
                    _ => DataKind::FileStatic,
                })
            }
            _ => Err(self.missing("data_kind")),
        }
    }

    fn location_kind(&self) -> Result<LocationKind>
    {
        match self.node {
            Node::Enumerator { .. } => Ok(LocationKind::Constant),
            Node::Field(die) if self.tag == SymTag::Data => {
                if self.is_bit_field()? {
                    Ok(LocationKind::BitField)
                } else if self.is_static_field(die)? {
                    Ok(LocationKind::Static)
                } else {
                    Ok(LocationKind::ThisRel)
                }
            }
            Node::Die(die) if self.tag == SymTag::Data => {
                if self.image.attr(die, constants::DW_AT_const_value)?.is_some() {
                    Ok(LocationKind::Constant)
                } else if self.image.attr(die, constants::DW_AT_location)?.is_some() {
                    Ok(LocationKind::Static)
                } else {
                    Ok(LocationKind::Null)
                }
            }
            _ => Ok(LocationKind::Null),
        }
    }

    fn offset(&self) -> Result<u64>
    {
        let Node::Field(die) = self.node else {
            return Err(self.missing("offset"));
        };
        if self.is_bit_field()? {
            return Ok(self.bit_layout(die)?.0);
        }
        match self.image.member_location(die)? {
            MemberLocation::Offset(offset) => Ok(offset),
            MemberLocation::VirtualBase { .. } => Err(self.missing("offset")),
        }
    }

    fn va(&self) -> Result<Address>
    {
        let die = self.required_die("va")?;

        if self.tag == SymTag::Function {
            return match self.image.attr(die, constants::DW_AT_low_pc)? {
                Some(AttributeValue::Addr(address)) => Ok(self.image.relocated(address)),
                Some(AttributeValue::DebugAddrIndex(index)) => {
                    let unit = self.image.unit(die.unit)?;
                    let address = self
                        .image
                        .dwarf()
                        .address(unit, index)
                        .map_err(|err| super::map_dwarf_error("resolving DW_AT_low_pc", err))?;
                    Ok(self.image.relocated(address))
                }
                _ => Err(self.missing("va")),
            };
        }

        if let Some(address) = self.image.static_location(die)? {
            return Ok(address);
        }
        if let Some(definition) = self.image.definition_of(die)? {
            if let Some(address) = self.image.static_location(definition)? {
                return Ok(address);
            }
        }
        Err(self.missing("va"))
    }

    fn bit_position(&self) -> Result<u32>
    {
        match self.node {
            Node::Field(die) if self.is_bit_field()? => Ok(self.bit_layout(die)?.1),
            _ => Err(self.missing("bit_position")),
        }
    }

    fn value(&self) -> Result<NumVariant>
    {
        let die = self.required_die("value")?;
        let Some(value) = self.image.attr(die, constants::DW_AT_const_value)? else {
            return Err(self.missing("value"));
        };

        let mut ty = self.ty()?;
        while matches!(ty.tag(), SymTag::Typedef | SymTag::Enum) {
            ty = ty.ty()?;
        }
        let num_type = match BaseType::from_basic(ty.base_type()?, ty.size()?).and_then(BaseType::num_type) {
            Some(num_type) => num_type,
            None => integer_num_type(ty.size()?, true)?,
        };
        const_variant(&value, num_type)
    }

    fn count(&self) -> Result<usize>
    {
        let Node::ArrayDim { die, dim } = self.node else {
            return Err(self.missing("count"));
        };
        let subranges = self.subranges(die)?;
        match subranges.get(dim) {
            Some(subrange) => self.subrange_count(*subrange),
            None => Ok(0),
        }
    }

    fn is_virtual_base_class(&self) -> Result<bool>
    {
        match self.node {
            Node::Field(die) if self.tag == SymTag::BaseClass => Ok(matches!(
                self.image.attr(die, constants::DW_AT_virtuality)?,
                Some(AttributeValue::Virtuality(virtuality)) if virtuality != constants::DW_VIRTUALITY_none
            )),
            _ => Ok(false),
        }
    }

    fn virtual_base_pointer_offset(&self) -> Result<u64>
    {
        self.virtual_table_slot().map(|_| 0)
    }

    fn virtual_base_disp_index(&self) -> Result<i64>
    {
        let vtable_offset = self.virtual_table_slot()?;
        Ok(-((vtable_offset / self.pointer_bytes() as u64) as i64))
    }

    fn virtual_base_disp_size(&self) -> Result<usize>
    {
        self.virtual_table_slot()?;
        Ok(self.pointer_bytes())
    }
}

impl DwarfSymbol
{
    /// Distance below the vtable address point holding this virtual base's
    /// offset (Itanium ABI).
    fn virtual_table_slot(&self) -> Result<u64>
    {
        match self.node {
            Node::Field(die) if self.tag == SymTag::BaseClass => match self.image.member_location(die)? {
                MemberLocation::VirtualBase { vtable_offset } => Ok(vtable_offset),
                MemberLocation::Offset(_) => Err(self.missing("virtual base table slot")),
            },
            _ => Err(self.missing("virtual base table slot")),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_integer_num_type()
    {
        assert_eq!(integer_num_type(4, true).unwrap(), NumType::Long);
        assert_eq!(integer_num_type(8, false).unwrap(), NumType::ULongLong);
        assert!(integer_num_type(16, true).is_err());
    }

    #[test]
    fn test_const_variant_sign_extends_fixed_forms()
    {
        let value = const_variant(&AttributeValue::Data1(0xff), NumType::Long).unwrap();
        assert!(value.is_long());
        assert_eq!(value.as_long(), -1);

        let value = const_variant(&AttributeValue::Data1(0xff), NumType::ULong).unwrap();
        assert_eq!(value.as_ulong(), 255);

        let value = const_variant(&AttributeValue::Sdata(-7), NumType::Char).unwrap();
        assert_eq!(value.as_char(), -7);
    }

    #[test]
    fn test_const_variant_rejects_blocks()
    {
        let result = const_variant(&AttributeValue::Flag(true), NumType::Long);
        assert!(matches!(result, Err(SymscopeError::Dwarf(_))));
    }
}
