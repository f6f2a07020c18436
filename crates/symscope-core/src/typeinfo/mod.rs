//! # Type Info
//!
//! Resolved type descriptors.
//!
//! A [`TypeInfo`] is one node of a tree: pointers and arrays own the type they
//! wrap, user-defined types and enums own a lazily built [`FieldList`]. Nodes
//! are shared as [`TypeInfoRef`] and never change once built.
//!
//! Trees come from two places:
//!
//! - [`base_type_info`] builds base types and declarator expressions over them
//!   (`"Int4B*[2]"`) without any symbol provider.
//! - [`load_type`] and [`complex_type_info`] resolve provider symbols.
//!
//! ## Example
//!
//! ```rust
//! use symscope_core::typeinfo::base_type_info;
//! use symscope_core::types::PointerSize;
//!
//! let ty = base_type_info("Int4B(*)[4]", PointerSize::Eight).unwrap();
//! assert!(ty.is_pointer());
//! assert_eq!(ty.name(), "Int4B(*)[4]");
//! assert_eq!(ty.size(), 8);
//! assert_eq!(ty.deref().unwrap().size(), 16);
//! ```

pub mod base;
mod fields;
pub mod parser;

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use smallvec::SmallVec;
use tracing::{debug, trace};

pub use base::BaseType;
pub use fields::{FieldList, FieldLocation, UdtField, VirtualBase, VirtualPath, VTABLE_FIELD_NAME};
use parser::{is_base_type, is_complex_type, parse_suffix, split_complex, TypeLayer};

use crate::access::{DataAccessor, MemoryBackend};
use crate::error::{Result, SymscopeError};
use crate::num::{NumType, NumVariant};
use crate::symbols::{DataKind, LocationKind, SymTag, SymbolRef};
use crate::types::{Address, PointerSize};

/// Shared handle to a type node.
pub type TypeInfoRef = Arc<TypeInfo>;

/// A resolved type
#[derive(Debug)]
pub enum TypeInfo
{
    Base(BaseTypeInfo),
    Void(VoidTypeInfo),
    Pointer(PointerTypeInfo),
    Array(ArrayTypeInfo),
    /// Struct, class or union
    Udt(UdtTypeInfo),
    Enum(EnumTypeInfo),
    BitField(BitFieldTypeInfo),
    /// Any type carrying a compile-time value
    Constant(ConstantTypeInfo),
}

#[derive(Debug)]
pub struct BaseTypeInfo
{
    base: BaseType,
    pointer_size: PointerSize,
}

impl BaseTypeInfo
{
    pub fn base(&self) -> BaseType
    {
        self.base
    }
}

#[derive(Debug)]
pub struct VoidTypeInfo
{
    pointer_size: PointerSize,
}

#[derive(Debug)]
pub struct PointerTypeInfo
{
    target: TypeInfoRef,
    size: PointerSize,
}

#[derive(Debug)]
pub struct ArrayTypeInfo
{
    element: TypeInfoRef,
    count: usize,
}

/// Struct, class or union backed by a provider symbol
#[derive(Debug)]
pub struct UdtTypeInfo
{
    symbol: SymbolRef,
    name: String,
    size: usize,
    pointer_size: PointerSize,
    fields: OnceCell<FieldList>,
}

impl UdtTypeInfo
{
    pub fn symbol(&self) -> &SymbolRef
    {
        &self.symbol
    }
}

#[derive(Debug)]
pub struct EnumTypeInfo
{
    symbol: SymbolRef,
    name: String,
    size: usize,
    pointer_size: PointerSize,
    fields: OnceCell<FieldList>,
}

impl EnumTypeInfo
{
    pub fn symbol(&self) -> &SymbolRef
    {
        &self.symbol
    }
}

/// `bit_width` bits at `bit_position` inside a storage unit of the base type
#[derive(Debug)]
pub struct BitFieldTypeInfo
{
    storage: TypeInfoRef,
    bit_width: u32,
    bit_position: u32,
}

#[derive(Debug)]
pub struct ConstantTypeInfo
{
    inner: TypeInfoRef,
    value: NumVariant,
}

impl TypeInfo
{
    /// Base type node (`Void` yields a [`TypeInfo::Void`]).
    pub fn base(base: BaseType, pointer_size: PointerSize) -> TypeInfoRef
    {
        Arc::new(match base {
            BaseType::Void => TypeInfo::Void(VoidTypeInfo { pointer_size }),
            base => TypeInfo::Base(BaseTypeInfo { base, pointer_size }),
        })
    }

    /// Pointer to `target`, sized for the target's module.
    pub fn pointer_to(target: &TypeInfoRef) -> TypeInfoRef
    {
        Self::pointer_with_size(target, target.pointer_size())
    }

    pub fn pointer_with_size(target: &TypeInfoRef, size: PointerSize) -> TypeInfoRef
    {
        Arc::new(TypeInfo::Pointer(PointerTypeInfo {
            target: Arc::clone(target),
            size,
        }))
    }

    /// Array of `count` elements of `element`; fails when the total size
    /// does not fit in `usize`.
    pub fn array_of(element: &TypeInfoRef, count: usize) -> Result<TypeInfoRef>
    {
        if element.size().checked_mul(count).is_none() {
            return Err(SymscopeError::InvalidArgument(format!(
                "array of {count} x {} is too large",
                element.name()
            )));
        }
        Ok(Arc::new(TypeInfo::Array(ArrayTypeInfo {
            element: Arc::clone(element),
            count,
        })))
    }

    /// Attach a compile-time value to `inner`.
    pub fn constant(inner: &TypeInfoRef, value: NumVariant) -> TypeInfoRef
    {
        Arc::new(TypeInfo::Constant(ConstantTypeInfo {
            inner: Arc::clone(inner),
            value,
        }))
    }

    /// C-style type name
    ///
    /// Pointer and array chains are spelled as declarators after the terminal
    /// type: `Int4B*[2]` is an array of two pointers, `Int4B(*)[2]` a pointer
    /// to an array of two.
    pub fn name(&self) -> String
    {
        match self {
            TypeInfo::Base(base) => base.base.name().to_string(),
            TypeInfo::Void(_) => BaseType::Void.name().to_string(),
            TypeInfo::Pointer(_) | TypeInfo::Array(_) => self.declarator_name(),
            TypeInfo::Udt(udt) => udt.name.clone(),
            TypeInfo::Enum(enumeration) => enumeration.name.clone(),
            TypeInfo::BitField(bits) => format!("{}:{}", bits.storage.name(), bits.bit_width),
            TypeInfo::Constant(constant) => constant.inner.name(),
        }
    }

    fn declarator_name(&self) -> String
    {
        let mut name = String::new();
        let mut current = self;

        loop {
            match current {
                TypeInfo::Array(_) => {
                    let mut extents: SmallVec<[usize; 4]> = SmallVec::new();
                    while let TypeInfo::Array(array) = current {
                        extents.push(array.count);
                        current = &array.element;
                    }
                    if !name.is_empty() {
                        name = format!("({name})");
                    }
                    for extent in extents {
                        let _ = write!(name, "[{extent}]");
                    }
                }
                TypeInfo::Pointer(pointer) => {
                    name.insert(0, '*');
                    current = &pointer.target;
                }
                terminal => {
                    name.insert_str(0, &terminal.name());
                    return name;
                }
            }
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> usize
    {
        match self {
            TypeInfo::Base(base) => base.base.size(),
            TypeInfo::Void(_) => 0,
            TypeInfo::Pointer(pointer) => pointer.size.bytes(),
            // bounded in array_of
            TypeInfo::Array(array) => array.element.size() * array.count,
            TypeInfo::Udt(udt) => udt.size,
            TypeInfo::Enum(enumeration) => enumeration.size,
            TypeInfo::BitField(bits) => bits.storage.size(),
            TypeInfo::Constant(constant) => constant.inner.size(),
        }
    }

    /// Pointer width of the module this type belongs to.
    pub fn pointer_size(&self) -> PointerSize
    {
        match self {
            TypeInfo::Base(base) => base.pointer_size,
            TypeInfo::Void(void) => void.pointer_size,
            TypeInfo::Pointer(pointer) => pointer.size,
            TypeInfo::Array(array) => array.element.pointer_size(),
            TypeInfo::Udt(udt) => udt.pointer_size,
            TypeInfo::Enum(enumeration) => enumeration.pointer_size,
            TypeInfo::BitField(bits) => bits.storage.pointer_size(),
            TypeInfo::Constant(constant) => constant.inner.pointer_size(),
        }
    }

    /// `self` with any constant qualifiers stripped.
    fn unqualified(&self) -> &TypeInfo
    {
        let mut current = self;
        while let TypeInfo::Constant(constant) = current {
            current = &*constant.inner;
        }
        current
    }

    pub fn is_base(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::Base(_))
    }

    pub fn is_void(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::Void(_))
    }

    pub fn is_pointer(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::Pointer(_))
    }

    pub fn is_array(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::Array(_))
    }

    pub fn is_user_defined(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::Udt(_))
    }

    pub fn is_enum(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::Enum(_))
    }

    pub fn is_bit_field(&self) -> bool
    {
        matches!(self.unqualified(), TypeInfo::BitField(_))
    }

    pub fn is_constant(&self) -> bool
    {
        matches!(self, TypeInfo::Constant(_))
    }

    fn unsupported(&self, operation: &'static str) -> SymscopeError
    {
        SymscopeError::invalid_operation(self.name(), operation)
    }

    /// Value of a constant-qualified type.
    pub fn constant_value(&self) -> Result<NumVariant>
    {
        match self {
            TypeInfo::Constant(constant) => Ok(constant.value),
            _ => Err(self.unsupported("constant_value")),
        }
    }

    /// Pointer target or array element type.
    pub fn deref(&self) -> Result<TypeInfoRef>
    {
        match self {
            TypeInfo::Pointer(pointer) => Ok(Arc::clone(&pointer.target)),
            TypeInfo::Array(array) => Ok(Arc::clone(&array.element)),
            TypeInfo::Constant(constant) => constant.inner.deref(),
            _ => Err(self.unsupported("deref")),
        }
    }

    /// Field list of a UDT or enum, built on first call
    ///
    /// Concurrent first callers block until one build finishes; a failed build
    /// is not cached and is retried by the next call.
    pub fn fields(&self) -> Result<&FieldList>
    {
        match self {
            TypeInfo::Udt(udt) => udt.fields.get_or_try_init(|| {
                debug!(udt = %udt.name, "building fields");
                fields::build_udt_fields(&udt.symbol)
            }),
            TypeInfo::Enum(enumeration) => enumeration.fields.get_or_try_init(|| {
                debug!(enumeration = %enumeration.name, "building enumerators");
                fields::build_enum_fields(&enumeration.symbol)
            }),
            TypeInfo::Constant(constant) => constant.inner.fields(),
            _ => Err(self.unsupported("fields")),
        }
    }

    /// Array extent or number of fields.
    pub fn element_count(&self) -> Result<usize>
    {
        match self.unqualified() {
            TypeInfo::Array(array) => Ok(array.count),
            _ => Ok(self.fields()?.len()),
        }
    }

    fn check_index(&self, array: &ArrayTypeInfo, index: usize) -> Result<()>
    {
        if index >= array.count {
            trace!(ty = %self, index, "array index out of range");
            return Err(SymscopeError::Index {
                index,
                count: array.count,
            });
        }
        Ok(())
    }

    /// Type of element `index`: the element type of an array (bounds
    /// checked) or the type of the index-th field.
    pub fn element(&self, index: usize) -> Result<TypeInfoRef>
    {
        match self.unqualified() {
            TypeInfo::Array(array) => {
                self.check_index(array, index)?;
                Ok(Arc::clone(&array.element))
            }
            _ => self.fields()?.get(index)?.type_info(),
        }
    }

    /// Type of the field at a dotted path such as `"inner.value"`.
    pub fn element_by_name(&self, path: &str) -> Result<TypeInfoRef>
    {
        let (head, rest) = split_path(path);
        let field_type = self.fields()?.lookup(head)?.type_info()?;
        match rest {
            Some(rest) => field_type.element_by_name(rest),
            None => Ok(field_type),
        }
    }

    /// Name of the index-th field.
    pub fn element_name(&self, index: usize) -> Result<String>
    {
        Ok(self.fields()?.get(index)?.name().to_string())
    }

    /// Byte offset of element `index` from the start of the object.
    pub fn element_offset(&self, index: usize) -> Result<u64>
    {
        match self.unqualified() {
            TypeInfo::Array(array) => {
                self.check_index(array, index)?;
                Ok((index * array.element.size()) as u64)
            }
            _ => self.fields()?.get(index)?.offset(),
        }
    }

    /// Byte offset of the field at a dotted path, summed along the path.
    pub fn element_offset_by_name(&self, path: &str) -> Result<u64>
    {
        let (head, rest) = split_path(path);
        let field = self.fields()?.lookup(head)?;
        let offset = field.offset()?;
        match rest {
            Some(rest) => Ok(offset + field.type_info()?.element_offset_by_name(rest)?),
            None => Ok(offset),
        }
    }

    /// Address of the index-th field, which must be a static member.
    pub fn element_va(&self, index: usize) -> Result<Address>
    {
        self.fields()?.get(index)?.va()
    }

    /// Address of the static member at a dotted path.
    pub fn element_va_by_name(&self, path: &str) -> Result<Address>
    {
        let (head, rest) = split_path(path);
        let field = self.fields()?.lookup(head)?;
        match rest {
            Some(rest) => field.type_info()?.element_va_by_name(rest),
            None => field.va(),
        }
    }

    pub fn is_static_member(&self, index: usize) -> Result<bool>
    {
        Ok(self.fields()?.get(index)?.is_static_member())
    }

    pub fn is_static_member_by_name(&self, path: &str) -> Result<bool>
    {
        let (head, rest) = split_path(path);
        let field = self.fields()?.lookup(head)?;
        match rest {
            Some(rest) => field.type_info()?.is_static_member_by_name(rest),
            None => Ok(field.is_static_member()),
        }
    }

    pub fn is_virtual_member(&self, index: usize) -> Result<bool>
    {
        Ok(self.fields()?.get(index)?.is_virtual_member())
    }

    pub fn is_virtual_member_by_name(&self, path: &str) -> Result<bool>
    {
        let (head, rest) = split_path(path);
        let field = self.fields()?.lookup(head)?;
        match rest {
            Some(rest) => field.type_info()?.is_virtual_member_by_name(rest),
            None => Ok(field.is_virtual_member()),
        }
    }

    /// Runtime address of the field at a dotted path inside the object at
    /// `object`
    ///
    /// Members of virtual bases are located through the object's virtual base
    /// table, read from `memory`.
    pub fn element_address(&self, path: &str, object: Address, memory: &dyn MemoryBackend) -> Result<Address>
    {
        let (head, rest) = split_path(path);
        let field = self.fields()?.lookup(head)?;
        let address = field.address(object, memory, self.pointer_size())?;
        match rest {
            Some(rest) => field.type_info()?.element_address(rest, address, memory),
            None => Ok(address),
        }
    }

    pub fn bit_offset(&self) -> Result<u32>
    {
        match self {
            TypeInfo::BitField(bits) => Ok(bits.bit_position),
            _ => Err(self.unsupported("bit_offset")),
        }
    }

    pub fn bit_width(&self) -> Result<u32>
    {
        match self {
            TypeInfo::BitField(bits) => Ok(bits.bit_width),
            _ => Err(self.unsupported("bit_width")),
        }
    }

    /// Extract a bit-field value from the storage unit at `pos`
    ///
    /// The result has the representation of the underlying base type and is
    /// sign-extended for signed bases.
    pub fn read_bitfield(&self, accessor: &dyn DataAccessor, pos: usize) -> Result<NumVariant>
    {
        let TypeInfo::BitField(bits) = self else {
            return Err(self.unsupported("read_bitfield"));
        };
        let num_type = bits.storage.num_type().ok_or_else(|| self.unsupported("read_bitfield"))?;

        let storage = accessor.read_variant(pos, num_type)?;
        let total = (num_type.size() * 8) as u32;
        let width = bits.bit_width.min(total);
        let raw = storage.as_ulonglong().checked_shr(bits.bit_position).unwrap_or(0);
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        let mut value = raw & mask;

        if storage.is_signed() && width > 0 && width < 64 && value & (1 << (width - 1)) != 0 {
            value |= !mask;
        }
        Ok(NumVariant::from(value).cast(num_type))
    }

    /// Read a scalar of this type at `pos`.
    pub fn read_value(&self, accessor: &dyn DataAccessor, pos: usize) -> Result<NumVariant>
    {
        match self {
            TypeInfo::BitField(_) => self.read_bitfield(accessor, pos),
            TypeInfo::Constant(constant) => Ok(constant.value),
            _ => {
                let num_type = self.num_type().ok_or_else(|| self.unsupported("read_value"))?;
                accessor.read_variant(pos, num_type)
            }
        }
    }

    /// Representation scalar values of this type are read as.
    pub fn num_type(&self) -> Option<NumType>
    {
        match self {
            TypeInfo::Base(base) => base.base.num_type(),
            TypeInfo::Pointer(pointer) => Some(match pointer.size {
                PointerSize::Four => NumType::ULong,
                PointerSize::Eight => NumType::ULongLong,
            }),
            TypeInfo::BitField(bits) => bits.storage.num_type(),
            TypeInfo::Constant(constant) => constant.inner.num_type(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.name())
    }
}

fn split_path(path: &str) -> (&str, Option<&str>)
{
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Base type, or declarator expression over one, by name
///
/// ```rust
/// use symscope_core::typeinfo::base_type_info;
/// use symscope_core::types::PointerSize;
///
/// let ty = base_type_info("UInt2B[3]", PointerSize::Four).unwrap();
/// assert_eq!(ty.size(), 6);
/// assert!(base_type_info("Int3B", PointerSize::Four).is_err());
/// ```
pub fn base_type_info(name: &str, pointer_size: PointerSize) -> Result<TypeInfoRef>
{
    if is_complex_type(name) {
        return complex_type_info(name, None, pointer_size);
    }
    let base = BaseType::from_name(name).ok_or_else(|| SymscopeError::UnsupportedType(name.to_string()))?;
    Ok(TypeInfo::base(base, pointer_size))
}

/// Base type described by a provider base-type symbol.
pub fn base_type_from_symbol(symbol: &SymbolRef) -> Result<TypeInfoRef>
{
    let basic = symbol.base_type()?;
    let size = symbol.size()?;
    let base = BaseType::from_basic(basic, size)
        .ok_or_else(|| SymscopeError::UnsupportedType(format!("{} of size {size}", basic.name())))?;
    Ok(TypeInfo::base(base, symbol.machine_type().pointer_size()))
}

/// Resolve a declarator expression (`"MyStruct*[2]"`)
///
/// The base name is a built-in base type or a type symbol found in `scope`;
/// naming a data symbol is an error. Pointers are sized for the scope's
/// machine, or `default_pointer_size` without a scope.
pub fn complex_type_info(name: &str, scope: Option<&SymbolRef>, default_pointer_size: PointerSize) -> Result<TypeInfoRef>
{
    let (base, suffix) = split_complex(name).ok_or_else(|| SymscopeError::type_expression(name, "invalid type name"))?;
    if base.is_empty() || suffix.is_empty() {
        return Err(SymscopeError::type_expression(name, "invalid type name"));
    }

    let pointer_size = scope.map_or(default_pointer_size, |scope| scope.machine_type().pointer_size());

    let lowest = if is_base_type(base)? {
        base_type_info(base, pointer_size)?
    } else {
        let scope = scope.ok_or_else(|| SymscopeError::SymbolNotFound(base.to_string()))?;
        let symbol = scope.child_by_name(base)?;
        if symbol.tag() == SymTag::Data {
            return Err(SymscopeError::type_expression(name, "symbol name can not be an expression"));
        }
        load_type(&symbol)?
    };

    let layers = parse_suffix(name, suffix)?;
    trace!(expression = name, ?layers, "applying declarators");
    layers.iter().try_fold(lowest, |inner, layer| match *layer {
        TypeLayer::Pointer => Ok(TypeInfo::pointer_with_size(&inner, pointer_size)),
        TypeLayer::Array(count) => TypeInfo::array_of(&inner, count)
            .map_err(|_| SymscopeError::type_expression(name, "array size overflows")),
    })
}

/// Build the type a provider symbol describes
///
/// Data symbols resolve to their declared type (a bit-field node for
/// bit-field storage, a constant node for compile-time constants), typedefs
/// to the aliased type. Tags without a model fail with
/// [`SymscopeError::UnsupportedType`].
pub fn load_type(symbol: &SymbolRef) -> Result<TypeInfoRef>
{
    let tag = symbol.tag();
    trace!(%tag, "loading type from symbol");

    match tag {
        SymTag::Data => {
            if symbol.location_kind()? == LocationKind::BitField {
                return bit_field_from_symbol(symbol);
            }
            if symbol.data_kind()? == DataKind::Constant {
                let value = symbol.value()?;
                let inner = load_type(&symbol.ty()?)?;
                return Ok(TypeInfo::constant(&inner, value));
            }
            load_type(&symbol.ty()?)
        }
        SymTag::BaseType => base_type_from_symbol(symbol),
        SymTag::Udt | SymTag::BaseClass => Ok(Arc::new(TypeInfo::Udt(UdtTypeInfo {
            name: symbol.name()?,
            size: symbol.size()?,
            pointer_size: symbol.machine_type().pointer_size(),
            symbol: Arc::clone(symbol),
            fields: OnceCell::new(),
        }))),
        SymTag::ArrayType => {
            let element = load_type(&symbol.ty()?)?;
            TypeInfo::array_of(&element, symbol.count()?)
        }
        SymTag::PointerType => {
            let target = load_type(&symbol.ty()?)?;
            let size = PointerSize::from_bytes(symbol.size()?).unwrap_or_else(|| symbol.machine_type().pointer_size());
            Ok(TypeInfo::pointer_with_size(&target, size))
        }
        SymTag::Enum => Ok(Arc::new(TypeInfo::Enum(EnumTypeInfo {
            name: symbol.name()?,
            size: symbol.size()?,
            pointer_size: symbol.machine_type().pointer_size(),
            symbol: Arc::clone(symbol),
            fields: OnceCell::new(),
        }))),
        SymTag::Typedef => load_type(&symbol.ty()?),
        other => {
            let name = symbol.name().unwrap_or_default();
            Err(SymscopeError::UnsupportedType(format!("{other} '{name}'")))
        }
    }
}

fn bit_field_from_symbol(symbol: &SymbolRef) -> Result<TypeInfoRef>
{
    let bit_width = u32::try_from(symbol.size()?)
        .map_err(|_| SymscopeError::InvalidArgument(String::from("bit-field width out of range")))?;
    let bit_position = symbol.bit_position()?;

    // Storage may be declared through typedefs or as an enum.
    let mut storage = symbol.ty()?;
    loop {
        match storage.tag() {
            SymTag::Typedef | SymTag::Enum => storage = storage.ty()?,
            _ => break,
        }
    }

    Ok(Arc::new(TypeInfo::BitField(BitFieldTypeInfo {
        storage: base_type_from_symbol(&storage)?,
        bit_width,
        bit_position,
    })))
}
