//! Memory-backed accessor.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::{check_range, DataAccessor, DataStorage};
use crate::error::{Result, SymscopeError};
use crate::types::Address;

/// Raw read/write of target memory
///
/// Implemented by whatever owns the debuggee (a live process, a core dump, a
/// test fixture). Failures should be reported as
/// [`SymscopeError::MemoryAccess`].
pub trait MemoryBackend: Send + Sync
{
    /// Fill `buf` with the bytes at `address`.
    fn read_memory(&self, address: Address, buf: &mut [u8]) -> Result<()>;

    /// Store `data` at `address`.
    fn write_memory(&self, address: Address, data: &[u8]) -> Result<()>;

    /// Read a little-endian pointer of `size` bytes (4 or 8).
    fn read_pointer(&self, address: Address, size: usize) -> Result<u64>
    {
        let mut bytes = [0u8; 8];
        let buf = bytes.get_mut(..size).ok_or_else(|| {
            SymscopeError::InvalidArgument(format!("unsupported pointer size {size}"))
        })?;
        self.read_memory(address, buf)?;
        Ok(u64::from_le_bytes(bytes))
    }
}

/// `length` bytes of target memory starting at `address`
pub struct MemoryAccessor
{
    backend: Arc<dyn MemoryBackend>,
    address: Address,
    length: usize,
}

impl MemoryAccessor
{
    pub fn new(backend: Arc<dyn MemoryBackend>, address: Address, length: usize) -> Self
    {
        Self {
            backend,
            address,
            length,
        }
    }
}

impl fmt::Debug for MemoryAccessor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("MemoryAccessor")
            .field("address", &self.address)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl DataAccessor for MemoryAccessor
{
    fn length(&self) -> usize
    {
        self.length
    }

    fn storage(&self) -> DataStorage
    {
        DataStorage::Memory
    }

    fn read_raw(&self, pos: usize, buf: &mut [u8]) -> Result<()>
    {
        check_range(DataStorage::Memory, self.length, pos, buf.len())?;
        let at = self.address + pos as u64;
        trace!(address = %at, len = buf.len(), "reading target memory");
        self.backend.read_memory(at, buf)
    }

    fn write_raw(&self, pos: usize, data: &[u8]) -> Result<()>
    {
        check_range(DataStorage::Memory, self.length, pos, data.len())?;
        let at = self.address + pos as u64;
        trace!(address = %at, len = data.len(), "writing target memory");
        self.backend.write_memory(at, data)
    }

    fn address(&self) -> Result<Address>
    {
        Ok(self.address)
    }
}
