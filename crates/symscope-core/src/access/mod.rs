//! # Data Access
//!
//! Typed reads and writes over a byte range that lives in target memory, in a
//! register, or in a local buffer.
//!
//! The type layer never talks to a process directly. It goes through a
//! [`DataAccessor`], which only has to provide raw byte access; the typed
//! helpers (`read_dword`, `read_doubles`, [`DataAccessor::read_variant`], ...)
//! are provided methods built on top of it. Values are little-endian.
//!
//! ## Backing kinds
//!
//! - [`MemoryAccessor`]: `length` bytes at an address, through a [`MemoryBackend`]
//! - [`RegisterAccessor`]: one named register, through a [`RegisterBackend`]
//! - [`CacheAccessor`]: an owned buffer, fixed or growable
//! - [`EmptyAccessor`]: zero length; every access fails
//!
//! ## Example
//!
//! ```rust
//! use symscope_core::access::{cache_accessor, DataAccessor, DataStorage};
//!
//! let data = cache_accessor(vec![0x78, 0x56, 0x34, 0x12, 0xff]);
//! assert_eq!(data.storage(), DataStorage::Cache);
//! assert_eq!(data.read_dword(0).unwrap(), 0x1234_5678);
//! assert_eq!(data.read_sign_byte(4).unwrap(), -1);
//! ```

mod cache;
mod empty;
mod memory;
mod register;

use std::fmt;
use std::sync::Arc;

pub use cache::CacheAccessor;
pub use empty::EmptyAccessor;
pub use memory::{MemoryAccessor, MemoryBackend};
pub use register::{RegisterAccessor, RegisterBackend};

use crate::error::{Result, SymscopeError};
use crate::num::{NumType, NumVariant};
use crate::types::Address;

/// Where the bytes behind an accessor live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataStorage
{
    /// Target process memory
    Memory,
    /// A CPU register of the target
    Register,
    /// A buffer owned by the debugger
    Cache,
}

impl fmt::Display for DataStorage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            DataStorage::Memory => "memory",
            DataStorage::Register => "register",
            DataStorage::Cache => "cache",
        };
        f.write_str(name)
    }
}

/// Shared handle to an accessor.
pub type DataAccessorRef = Arc<dyn DataAccessor>;

macro_rules! scalar_access {
    ($($read:ident, $write:ident, $native:ty;)*) => {
        $(
            #[doc = concat!("Read one `", stringify!($native), "` at byte `pos`.")]
            fn $read(&self, pos: usize) -> Result<$native>
            {
                let mut bytes = [0u8; std::mem::size_of::<$native>()];
                self.read_raw(pos, &mut bytes)?;
                Ok(<$native>::from_le_bytes(bytes))
            }

            #[doc = concat!("Write one `", stringify!($native), "` at byte `pos`.")]
            fn $write(&self, pos: usize, value: $native) -> Result<()>
            {
                self.write_raw(pos, &value.to_le_bytes())
            }
        )*
    };
}

macro_rules! bulk_access {
    ($($read:ident, $write:ident, $native:ty;)*) => {
        $(
            #[doc = concat!("Read `count` consecutive `", stringify!($native), "` values starting at byte `pos`.")]
            fn $read(&self, pos: usize, count: usize) -> Result<Vec<$native>>
            {
                const WIDTH: usize = std::mem::size_of::<$native>();
                let len = count.checked_mul(WIDTH).ok_or_else(|| {
                    SymscopeError::InvalidArgument(format!("read of {count} x {WIDTH} bytes overflows"))
                })?;
                check_range(self.storage(), self.length(), pos, len)?;
                let mut bytes = vec![0u8; len];
                self.read_raw(pos, &mut bytes)?;
                Ok(bytes
                    .chunks_exact(WIDTH)
                    .map(|chunk| {
                        let mut raw = [0u8; WIDTH];
                        raw.copy_from_slice(chunk);
                        <$native>::from_le_bytes(raw)
                    })
                    .collect())
            }

            #[doc = concat!("Write consecutive `", stringify!($native), "` values starting at byte `pos`.")]
            fn $write(&self, pos: usize, values: &[$native]) -> Result<()>
            {
                let bytes: Vec<u8> = values.iter().flat_map(|value| value.to_le_bytes()).collect();
                self.write_raw(pos, &bytes)
            }
        )*
    };
}

/// Typed byte-level access to one storage location
///
/// Implementors supply [`read_raw`](DataAccessor::read_raw) and
/// [`write_raw`](DataAccessor::write_raw); positions are byte offsets from the
/// start of the location and must stay within [`length`](DataAccessor::length).
pub trait DataAccessor: Send + Sync + fmt::Debug
{
    /// Total size of the location in bytes.
    fn length(&self) -> usize;

    /// Kind of storage backing this accessor.
    fn storage(&self) -> DataStorage;

    /// Fill `buf` with the bytes starting at `pos`.
    fn read_raw(&self, pos: usize, buf: &mut [u8]) -> Result<()>;

    /// Store `data` starting at `pos`.
    fn write_raw(&self, pos: usize, data: &[u8]) -> Result<()>;

    /// Target address of the first byte (memory-backed accessors only).
    fn address(&self) -> Result<Address>
    {
        Err(SymscopeError::invalid_operation(self.storage().to_string(), "address"))
    }

    /// Register name (register-backed accessors only).
    fn register_name(&self) -> Result<String>
    {
        Err(SymscopeError::invalid_operation(self.storage().to_string(), "register_name"))
    }

    scalar_access! {
        read_byte, write_byte, u8;
        read_sign_byte, write_sign_byte, i8;
        read_word, write_word, u16;
        read_sign_word, write_sign_word, i16;
        read_dword, write_dword, u32;
        read_sign_dword, write_sign_dword, i32;
        read_qword, write_qword, u64;
        read_sign_qword, write_sign_qword, i64;
        read_float, write_float, f32;
        read_double, write_double, f64;
    }

    bulk_access! {
        read_bytes, write_bytes, u8;
        read_sign_bytes, write_sign_bytes, i8;
        read_words, write_words, u16;
        read_sign_words, write_sign_words, i16;
        read_dwords, write_dwords, u32;
        read_sign_dwords, write_sign_dwords, i32;
        read_qwords, write_qwords, u64;
        read_sign_qwords, write_sign_qwords, i64;
        read_floats, write_floats, f32;
        read_doubles, write_doubles, f64;
    }

    /// Read a value of representation `ty` at `pos`.
    fn read_variant(&self, pos: usize, ty: NumType) -> Result<NumVariant>
    {
        Ok(match ty {
            NumType::Char => self.read_sign_byte(pos)?.into(),
            NumType::UChar => self.read_byte(pos)?.into(),
            NumType::Short => self.read_sign_word(pos)?.into(),
            NumType::UShort => self.read_word(pos)?.into(),
            NumType::Long => NumVariant::long(self.read_sign_dword(pos)?),
            NumType::ULong => NumVariant::ulong(self.read_dword(pos)?),
            NumType::LongLong => self.read_sign_qword(pos)?.into(),
            NumType::ULongLong => self.read_qword(pos)?.into(),
            NumType::Int => self.read_sign_dword(pos)?.into(),
            NumType::UInt => self.read_dword(pos)?.into(),
            NumType::Float => self.read_float(pos)?.into(),
            NumType::Double => self.read_double(pos)?.into(),
        })
    }

    /// Store `value` at `pos` using its own width.
    fn write_variant(&self, pos: usize, value: &NumVariant) -> Result<()>
    {
        match *value {
            NumVariant::Char(v) => self.write_sign_byte(pos, v),
            NumVariant::UChar(v) => self.write_byte(pos, v),
            NumVariant::Short(v) => self.write_sign_word(pos, v),
            NumVariant::UShort(v) => self.write_word(pos, v),
            NumVariant::Long(v) | NumVariant::Int(v) => self.write_sign_dword(pos, v),
            NumVariant::ULong(v) | NumVariant::UInt(v) => self.write_dword(pos, v),
            NumVariant::LongLong(v) => self.write_sign_qword(pos, v),
            NumVariant::ULongLong(v) => self.write_qword(pos, v),
            NumVariant::Float(v) => self.write_float(pos, v),
            NumVariant::Double(v) => self.write_double(pos, v),
        }
    }
}

/// Fail unless `len` bytes at `pos` fit in `length`.
pub(crate) fn check_range(storage: DataStorage, length: usize, pos: usize, len: usize) -> Result<()>
{
    match pos.checked_add(len) {
        Some(end) if end <= length => Ok(()),
        _ => Err(SymscopeError::InvalidArgument(format!(
            "{storage} access of {len} bytes at position {pos} exceeds length {length}"
        ))),
    }
}

/// Accessor with no storage behind it.
pub fn empty_accessor() -> DataAccessorRef
{
    Arc::new(EmptyAccessor)
}

/// Accessor over `length` bytes of target memory at `address`.
pub fn memory_accessor(backend: Arc<dyn MemoryBackend>, address: Address, length: usize) -> DataAccessorRef
{
    Arc::new(MemoryAccessor::new(backend, address, length))
}

/// Fixed-size accessor over a copy of `bytes`.
pub fn cache_accessor(bytes: Vec<u8>) -> DataAccessorRef
{
    Arc::new(CacheAccessor::from_bytes(bytes))
}

/// Growable zero-filled accessor of `size` bytes.
pub fn cache_accessor_sized(size: usize) -> DataAccessorRef
{
    Arc::new(CacheAccessor::with_capacity(size))
}

/// Accessor over the register `name`.
pub fn register_accessor(backend: Arc<dyn RegisterBackend>, name: &str) -> Result<DataAccessorRef>
{
    Ok(Arc::new(RegisterAccessor::new(backend, name)?))
}
