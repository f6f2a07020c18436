//! Buffer-backed accessor.

use std::sync::{PoisonError, RwLock};

use super::{check_range, DataAccessor, DataStorage};
use crate::error::Result;

/// Bytes owned by the debugger
///
/// A fixed buffer (built with [`CacheAccessor::from_bytes`]) rejects access
/// past its end. A growable buffer (built with
/// [`CacheAccessor::with_capacity`]) zero-extends on a write past its end;
/// reads are always bounded by the current length.
#[derive(Debug)]
pub struct CacheAccessor
{
    buffer: RwLock<Vec<u8>>,
    growable: bool,
}

impl CacheAccessor
{
    /// Fixed-size buffer holding `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self
    {
        Self {
            buffer: RwLock::new(bytes),
            growable: false,
        }
    }

    /// Growable buffer of `size` zero bytes.
    pub fn with_capacity(size: usize) -> Self
    {
        Self {
            buffer: RwLock::new(vec![0; size]),
            growable: true,
        }
    }

    /// Copy of the current contents.
    pub fn to_vec(&self) -> Vec<u8>
    {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DataAccessor for CacheAccessor
{
    fn length(&self) -> usize
    {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn storage(&self) -> DataStorage
    {
        DataStorage::Cache
    }

    fn read_raw(&self, pos: usize, buf: &mut [u8]) -> Result<()>
    {
        let buffer = self.buffer.read().unwrap_or_else(PoisonError::into_inner);
        check_range(DataStorage::Cache, buffer.len(), pos, buf.len())?;
        buf.copy_from_slice(&buffer[pos..pos + buf.len()]);
        Ok(())
    }

    fn write_raw(&self, pos: usize, data: &[u8]) -> Result<()>
    {
        let mut buffer = self.buffer.write().unwrap_or_else(PoisonError::into_inner);
        let end = pos.saturating_add(data.len());
        if self.growable && end > buffer.len() {
            buffer.resize(end, 0);
        }
        check_range(DataStorage::Cache, buffer.len(), pos, data.len())?;
        buffer[pos..end].copy_from_slice(data);
        Ok(())
    }
}
