//! # DWARF Provider
//!
//! [`SymbolProvider`] over the DWARF debug information of an ELF, Mach-O or
//! PE image.
//!
//! The image is read once; debug sections are copied into shared buffers and
//! parsed with `gimli`. The global scope is a name index over every
//! compilation unit, built on first use: named types, typedefs, variables and
//! functions at unit or namespace level, with `::`-qualified names. Nested
//! types are indexed under their enclosing type (`Outer::Inner`).
//!
//! Addresses (global variables, static members, functions) are relocated by
//! the slide between the image's preferred text address and the load address
//! passed to [`DwarfProvider::open_at`].

mod location;
mod symbol;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{
    constants, AttributeValue, DebugTypeSignature, DebuggingInformationEntry, Dwarf, EndianArcSlice, RunTimeEndian,
    SectionId, Unit, UnitOffset, UnitSectionOffset, UnitType,
};
use object::{Object, ObjectSection, ObjectSegment};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use self::location::{LocationOp, MemberLocation};
use self::symbol::DwarfSymbol;
use super::{MachineType, SymbolProvider, SymbolRef};
use crate::error::{Result, SymscopeError};
use crate::types::Address;

pub(crate) type OwnedReader = EndianArcSlice<RunTimeEndian>;
pub(crate) type OwnedDwarf = Dwarf<OwnedReader>;
type Entry<'abbrev, 'unit> = DebuggingInformationEntry<'abbrev, 'unit, OwnedReader>;

pub(crate) fn map_dwarf_error(context: &str, err: gimli::Error) -> SymscopeError
{
    SymscopeError::Dwarf(format!("{context}: {err}"))
}

const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offsets"]),
    (".debug_types", &[".debug_types", "__debug_types"]),
    (".debug_loc", &[".debug_loc", "__debug_loc"]),
    (".debug_loclists", &[".debug_loclists", "__debug_loclists"]),
];

fn section_key(id: SectionId) -> &'static str
{
    match id {
        SectionId::DebugAbbrev => ".debug_abbrev",
        SectionId::DebugAddr => ".debug_addr",
        SectionId::DebugInfo => ".debug_info",
        SectionId::DebugLine => ".debug_line",
        SectionId::DebugLineStr => ".debug_line_str",
        SectionId::DebugRanges => ".debug_ranges",
        SectionId::DebugRngLists => ".debug_rnglists",
        SectionId::DebugStr => ".debug_str",
        SectionId::DebugStrOffsets => ".debug_str_offsets",
        SectionId::DebugTypes => ".debug_types",
        SectionId::DebugLoc => ".debug_loc",
        SectionId::DebugLocLists => ".debug_loclists",
        _ => "",
    }
}

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> Result<Arc<[u8]>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| SymscopeError::Dwarf(format!("failed to read {name}: {err}")))?;
            return Ok(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes.to_vec()),
                Cow::Owned(vec) => vec.into(),
            });
        }
    }

    Ok(Arc::<[u8]>::from(Vec::new()))
}

/// Location of one DIE: unit index plus offset inside that unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DieRef
{
    pub unit: usize,
    pub offset: UnitOffset<usize>,
}

/// Name index backing the global scope
#[derive(Debug, Default)]
struct SymbolIndex
{
    entries: Vec<(String, DieRef)>,
    by_name: HashMap<String, usize>,
    declarations: Vec<bool>,
    /// Declaration DIE -> defining `DW_TAG_variable` (`DW_AT_specification`)
    definitions: HashMap<DieRef, DieRef>,
}

impl SymbolIndex
{
    fn insert(&mut self, name: String, die: DieRef, declaration: bool)
    {
        match self.by_name.get(&name) {
            Some(&slot) => {
                if self.declarations[slot] && !declaration {
                    self.entries[slot].1 = die;
                    self.declarations[slot] = false;
                }
            }
            None => {
                self.by_name.insert(name.clone(), self.entries.len());
                self.entries.push((name, die));
                self.declarations.push(declaration);
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<DieRef>
    {
        let name = name.strip_prefix("::").unwrap_or(name);
        self.by_name.get(name).map(|&slot| self.entries[slot].1)
    }
}

/// Parsed image shared by every symbol it hands out
pub(crate) struct DwarfImage
{
    path: PathBuf,
    machine: MachineType,
    little_endian: bool,
    slide: i64,
    runtime_range: (u64, u64),
    dwarf: OwnedDwarf,
    units: Vec<Unit<OwnedReader>>,
    index: OnceCell<SymbolIndex>,
}

impl DwarfImage
{
    fn parse(path: &Path, data: &[u8], load_address: Option<u64>) -> Result<Self>
    {
        let file = object::File::parse(data)
            .map_err(|err| SymscopeError::Dwarf(format!("failed to parse {}: {err}", path.display())))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let machine = match file.architecture() {
            object::Architecture::X86_64 => MachineType::Amd64,
            object::Architecture::I386 => MachineType::I386,
            object::Architecture::Aarch64 => MachineType::Arm64,
            object::Architecture::Arm => MachineType::Arm,
            _ => MachineType::Unknown,
        };

        // Preferred base: the text segment where it is named, else the lowest segment.
        let text_vmaddr = file
            .segments()
            .find(|segment| matches!(segment.name(), Ok(Some("__TEXT" | ".text"))))
            .map(|segment| segment.address())
            .or_else(|| file.segments().map(|segment| segment.address()).min())
            .unwrap_or(0);

        let mut max_addr = text_vmaddr;
        for segment in file.segments() {
            max_addr = max_addr.max(segment.address().saturating_add(segment.size()));
        }
        let size = max_addr.saturating_sub(text_vmaddr);

        let (slide, runtime_start) = match load_address {
            Some(load_address) => (load_address as i64 - text_vmaddr as i64, load_address),
            None => (0, text_vmaddr),
        };

        let mut sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            sections.insert(*canonical, load_section_bytes(&file, aliases)?);
        }

        let dwarf = Dwarf::load(|id| {
            let data = sections
                .get(section_key(id))
                .cloned()
                .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
            Ok::<_, gimli::Error>(EndianArcSlice::new(data, endian))
        })
        .map_err(|err| map_dwarf_error("failed to load DWARF", err))?;

        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_info unit header", err))?
        {
            units.push(
                dwarf
                    .unit(header)
                    .map_err(|err| map_dwarf_error("parsing compilation unit", err))?,
            );
        }
        let mut type_headers = dwarf.type_units();
        while let Some(header) = type_headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_types unit header", err))?
        {
            units.push(dwarf.unit(header).map_err(|err| map_dwarf_error("parsing type unit", err))?);
        }

        info!(path = %path.display(), ?machine, units = units.len(), slide, "loaded DWARF image");

        Ok(Self {
            path: path.to_path_buf(),
            machine,
            little_endian: endian == RunTimeEndian::Little,
            slide,
            runtime_range: (runtime_start, runtime_start.saturating_add(size)),
            dwarf,
            units,
            index: OnceCell::new(),
        })
    }

    pub(crate) fn machine(&self) -> MachineType
    {
        self.machine
    }

    pub(crate) fn is_little_endian(&self) -> bool
    {
        self.little_endian
    }

    pub(crate) fn relocated(&self, vmaddr: u64) -> Address
    {
        Address::new(vmaddr).offset(self.slide)
    }

    pub(crate) fn unit(&self, index: usize) -> Result<&Unit<OwnedReader>>
    {
        self.units
            .get(index)
            .ok_or_else(|| SymscopeError::Dwarf(format!("unit {index} out of range")))
    }

    pub(crate) fn dwarf(&self) -> &OwnedDwarf
    {
        &self.dwarf
    }

    /// Run `f` on the entry at `die`.
    pub(crate) fn with_entry<T>(&self, die: DieRef, f: impl FnOnce(&Unit<OwnedReader>, &Entry<'_, '_>) -> Result<T>) -> Result<T>
    {
        let unit = self.unit(die.unit)?;
        let entry = unit
            .entry(die.offset)
            .map_err(|err| map_dwarf_error("reading DIE", err))?;
        f(unit, &entry)
    }

    pub(crate) fn tag(&self, die: DieRef) -> Result<gimli::DwTag>
    {
        self.with_entry(die, |_, entry| Ok(entry.tag()))
    }

    pub(crate) fn attr(&self, die: DieRef, name: gimli::DwAt) -> Result<Option<AttributeValue<OwnedReader>>>
    {
        self.with_entry(die, |_, entry| {
            Ok(entry
                .attr(name)
                .map_err(|err| map_dwarf_error("reading attribute", err))?
                .map(|attr| attr.value()))
        })
    }

    pub(crate) fn flag(&self, die: DieRef, name: gimli::DwAt) -> Result<bool>
    {
        Ok(matches!(self.attr(die, name)?, Some(AttributeValue::Flag(true))))
    }

    pub(crate) fn udata(&self, die: DieRef, name: gimli::DwAt) -> Result<Option<u64>>
    {
        Ok(self.attr(die, name)?.and_then(|value| value.udata_value()))
    }

    pub(crate) fn name(&self, die: DieRef) -> Result<Option<String>>
    {
        self.with_entry(die, |unit, entry| entry_name(&self.dwarf, unit, entry))
    }

    /// Target of a reference attribute (`DW_AT_type`, `DW_AT_specification`).
    pub(crate) fn reference(&self, from: DieRef, name: gimli::DwAt) -> Result<Option<DieRef>>
    {
        match self.attr(from, name)? {
            Some(value) => self.resolve_reference(from, value).map(Some),
            None => Ok(None),
        }
    }

    fn resolve_reference(&self, from: DieRef, value: AttributeValue<OwnedReader>) -> Result<DieRef>
    {
        match value {
            AttributeValue::UnitRef(offset) => Ok(DieRef {
                unit: from.unit,
                offset,
            }),
            AttributeValue::DebugInfoRef(offset) => {
                let target = UnitSectionOffset::from(offset);
                self.units
                    .iter()
                    .enumerate()
                    .find_map(|(unit, header)| target.to_unit_offset(header).map(|offset| DieRef { unit, offset }))
                    .ok_or_else(|| SymscopeError::Dwarf(format!("dangling reference {offset:?}")))
            }
            AttributeValue::DebugTypesRef(signature) => self.type_unit_root(signature),
            other => Err(SymscopeError::Dwarf(format!("unsupported reference form {other:?}"))),
        }
    }

    fn type_unit_root(&self, signature: DebugTypeSignature) -> Result<DieRef>
    {
        for (index, unit) in self.units.iter().enumerate() {
            match unit.header.type_() {
                UnitType::Type {
                    type_signature,
                    type_offset,
                }
                | UnitType::SplitType {
                    type_signature,
                    type_offset,
                } if type_signature == signature => {
                    return Ok(DieRef {
                        unit: index,
                        offset: type_offset,
                    });
                }
                _ => {}
            }
        }
        Err(SymscopeError::Dwarf(format!("no type unit for signature {signature:?}")))
    }

    /// Decoded expression held by attribute `name`, if it is an expression.
    pub(crate) fn expression(&self, die: DieRef, name: gimli::DwAt) -> Result<Option<Vec<LocationOp>>>
    {
        let Some(expression) = self.attr(die, name)?.and_then(|value| value.exprloc_value()) else {
            return Ok(None);
        };
        let unit = self.unit(die.unit)?;
        let ops = location::decode_ops(expression, unit.encoding(), |index| {
            self.dwarf
                .address(unit, index)
                .map_err(|err| map_dwarf_error("resolving DW_OP_addrx", err))
        })?;
        Ok(Some(ops))
    }

    /// `DW_AT_data_member_location` of a member or base class.
    pub(crate) fn member_location(&self, die: DieRef) -> Result<MemberLocation>
    {
        match self.attr(die, constants::DW_AT_data_member_location)? {
            None => Ok(MemberLocation::Offset(0)),
            Some(value) => match value.udata_value() {
                Some(offset) => Ok(MemberLocation::Offset(offset)),
                None => {
                    let ops = self
                        .expression(die, constants::DW_AT_data_member_location)?
                        .ok_or_else(|| SymscopeError::Dwarf(format!("unsupported member location form {value:?}")))?;
                    location::member_location(&ops)
                }
            },
        }
    }

    /// Relocated static address from `DW_AT_location`.
    pub(crate) fn static_location(&self, die: DieRef) -> Result<Option<Address>>
    {
        Ok(self
            .expression(die, constants::DW_AT_location)?
            .and_then(|ops| location::static_address(&ops))
            .map(|vmaddr| self.relocated(vmaddr)))
    }

    /// Direct children of `die`, in order.
    pub(crate) fn children(&self, die: DieRef) -> Result<Vec<DieRef>>
    {
        let unit = self.unit(die.unit)?;
        let mut tree = unit
            .entries_tree(Some(die.offset))
            .map_err(|err| map_dwarf_error("building DIE tree", err))?;
        let root = tree.root().map_err(|err| map_dwarf_error("navigating DIE root", err))?;
        let mut children = root.children();
        let mut out = Vec::new();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating DIE children", err))?
        {
            out.push(DieRef {
                unit: die.unit,
                offset: child.entry().offset(),
            });
        }
        Ok(out)
    }

    fn index(&self) -> Result<&SymbolIndex>
    {
        self.index.get_or_try_init(|| {
            let mut index = SymbolIndex::default();
            for unit in 0..self.units.len() {
                let root = self.root_of(unit)?;
                self.index_scope(root, "", &mut index)?;
            }
            debug!(symbols = index.entries.len(), "built global symbol index");
            Ok(index)
        })
    }

    fn root_of(&self, unit: usize) -> Result<DieRef>
    {
        let header = self.unit(unit)?;
        let mut entries = header.entries();
        let (_, entry) = entries
            .next_dfs()
            .map_err(|err| map_dwarf_error("reading unit root", err))?
            .ok_or_else(|| SymscopeError::Dwarf(format!("unit {unit} has no root DIE")))?;
        Ok(DieRef {
            unit,
            offset: entry.offset(),
        })
    }

    fn index_scope(&self, scope: DieRef, prefix: &str, index: &mut SymbolIndex) -> Result<()>
    {
        for child in self.children(scope)? {
            let tag = self.tag(child)?;

            if tag == constants::DW_TAG_variable {
                if let Some(declaration) = self.reference(child, constants::DW_AT_specification)? {
                    index.definitions.insert(declaration, child);
                    continue;
                }
            }

            let Some(name) = self.name(child)? else {
                if tag == constants::DW_TAG_namespace {
                    self.index_scope(child, prefix, index)?;
                }
                continue;
            };
            let qualified = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}::{name}")
            };

            match tag {
                constants::DW_TAG_namespace => self.index_scope(child, &qualified, index)?,
                constants::DW_TAG_structure_type
                | constants::DW_TAG_class_type
                | constants::DW_TAG_union_type
                | constants::DW_TAG_enumeration_type => {
                    let declaration = self.flag(child, constants::DW_AT_declaration)?;
                    index.insert(qualified.clone(), child, declaration);
                    if !declaration {
                        self.index_nested(child, &qualified, index)?;
                    }
                }
                constants::DW_TAG_base_type
                | constants::DW_TAG_typedef
                | constants::DW_TAG_variable
                | constants::DW_TAG_subprogram => {
                    let declaration = self.flag(child, constants::DW_AT_declaration)?;
                    index.insert(qualified, child, declaration);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Nested types of a UDT; members are not global symbols.
    fn index_nested(&self, udt: DieRef, prefix: &str, index: &mut SymbolIndex) -> Result<()>
    {
        for child in self.children(udt)? {
            let tag = self.tag(child)?;
            if !matches!(
                tag,
                constants::DW_TAG_structure_type
                    | constants::DW_TAG_class_type
                    | constants::DW_TAG_union_type
                    | constants::DW_TAG_enumeration_type
                    | constants::DW_TAG_typedef
            ) {
                continue;
            }
            let Some(name) = self.name(child)? else {
                continue;
            };
            let qualified = format!("{prefix}::{name}");
            let declaration = self.flag(child, constants::DW_AT_declaration)?;
            index.insert(qualified.clone(), child, declaration);
            if tag != constants::DW_TAG_typedef && !declaration {
                self.index_nested(child, &qualified, index)?;
            }
        }
        Ok(())
    }

    pub(crate) fn global_names(&self) -> Result<Vec<DieRef>>
    {
        Ok(self.index()?.entries.iter().map(|(_, die)| *die).collect())
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<Option<DieRef>>
    {
        Ok(self.index()?.lookup(name))
    }

    /// Defining variable for a static member or `extern` declaration.
    pub(crate) fn definition_of(&self, declaration: DieRef) -> Result<Option<DieRef>>
    {
        Ok(self.index()?.definitions.get(&declaration).copied())
    }
}

pub(crate) fn entry_name(dwarf: &OwnedDwarf, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>) -> Result<Option<String>>
{
    let Some(attr) = entry
        .attr(constants::DW_AT_name)
        .map_err(|err| map_dwarf_error("reading DW_AT_name", err))?
    else {
        return Ok(None);
    };
    let reader = dwarf
        .attr_string(unit, attr.value())
        .map_err(|err| map_dwarf_error("resolving DWARF string", err))?;
    let owned = match gimli::Reader::to_string(&reader) {
        Ok(cow) => cow.into_owned(),
        Err(_) => gimli::Reader::to_string_lossy(&reader)
            .map_err(|err| map_dwarf_error("decoding DWARF string", err))?
            .into_owned(),
    };
    Ok(Some(owned))
}

/// Symbol provider over one image's DWARF
///
/// Cloning is cheap; clones share the parsed image.
#[derive(Clone)]
pub struct DwarfProvider
{
    image: Arc<DwarfImage>,
}

impl DwarfProvider
{
    /// Load an image using the addresses recorded in the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self>
    {
        Self::load(path.as_ref(), None)
    }

    /// Load an image mapped at `load_address`.
    pub fn open_at(path: impl AsRef<Path>, load_address: u64) -> Result<Self>
    {
        Self::load(path.as_ref(), Some(load_address))
    }

    /// Parse an image already in memory.
    pub fn from_bytes(name: impl AsRef<Path>, data: &[u8], load_address: Option<u64>) -> Result<Self>
    {
        Ok(Self {
            image: Arc::new(DwarfImage::parse(name.as_ref(), data, load_address)?),
        })
    }

    fn load(path: &Path, load_address: Option<u64>) -> Result<Self>
    {
        let bytes = fs::read(path)?;
        Self::from_bytes(path, &bytes, load_address)
    }

    pub fn path(&self) -> &Path
    {
        &self.image.path
    }

    /// Runtime address of the image's first byte.
    pub fn base(&self) -> Address
    {
        Address::new(self.image.runtime_range.0)
    }

    /// Bytes spanned by the image's segments.
    pub fn image_size(&self) -> u64
    {
        self.image.runtime_range.1 - self.image.runtime_range.0
    }

    /// Module name derived from the file name (`libfoo.so` -> `libfoo`).
    pub fn module_name(&self) -> String
    {
        self.image
            .path
            .file_stem()
            .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned())
    }
}

impl std::fmt::Debug for DwarfProvider
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("DwarfProvider")
            .field("path", &self.image.path)
            .field("machine", &self.image.machine)
            .field("slide", &self.image.slide)
            .finish_non_exhaustive()
    }
}

impl SymbolProvider for DwarfProvider
{
    fn global_scope(&self) -> Result<SymbolRef>
    {
        Ok(Arc::new(DwarfSymbol::global(Arc::clone(&self.image))))
    }

    fn machine_type(&self) -> MachineType
    {
        self.image.machine
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn die(offset: usize) -> DieRef
    {
        DieRef {
            unit: 0,
            offset: UnitOffset(offset),
        }
    }

    #[test]
    fn test_index_prefers_definitions()
    {
        let mut index = SymbolIndex::default();
        index.insert("Widget".into(), die(1), true);
        index.insert("Widget".into(), die(2), false);
        index.insert("Widget".into(), die(3), false);
        assert_eq!(index.lookup("Widget"), Some(die(2)));
        assert_eq!(index.entries.len(), 1);
    }

    #[test]
    fn test_index_lookup_accepts_root_qualifier()
    {
        let mut index = SymbolIndex::default();
        index.insert("ns::Widget".into(), die(7), false);
        assert_eq!(index.lookup("::ns::Widget"), Some(die(7)));
        assert_eq!(index.lookup("Widget"), None);
    }

    #[test]
    fn test_section_keys_cover_loaded_sections()
    {
        for (canonical, _) in DWARF_SECTIONS {
            assert!(
                [
                    SectionId::DebugAbbrev,
                    SectionId::DebugAddr,
                    SectionId::DebugInfo,
                    SectionId::DebugLine,
                    SectionId::DebugLineStr,
                    SectionId::DebugRanges,
                    SectionId::DebugRngLists,
                    SectionId::DebugStr,
                    SectionId::DebugStrOffsets,
                    SectionId::DebugTypes,
                    SectionId::DebugLoc,
                    SectionId::DebugLocLists,
                ]
                .into_iter()
                .any(|id| section_key(id) == *canonical)
            );
        }
    }

    #[test]
    fn test_rejects_non_object_data()
    {
        let result = DwarfProvider::from_bytes("garbage.bin", b"not an object file", None);
        assert!(matches!(result, Err(SymscopeError::Dwarf(_))));
    }
}
