//! Zero-length accessor.

use super::{DataAccessor, DataStorage};
use crate::error::{Result, SymscopeError};

/// Placeholder for values with no storage; every access fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyAccessor;

impl EmptyAccessor
{
    fn no_storage(pos: usize, len: usize) -> SymscopeError
    {
        SymscopeError::InvalidArgument(format!("access of {len} bytes at position {pos} on an empty accessor"))
    }
}

impl DataAccessor for EmptyAccessor
{
    fn length(&self) -> usize
    {
        0
    }

    fn storage(&self) -> DataStorage
    {
        DataStorage::Cache
    }

    fn read_raw(&self, pos: usize, buf: &mut [u8]) -> Result<()>
    {
        Err(Self::no_storage(pos, buf.len()))
    }

    fn write_raw(&self, pos: usize, data: &[u8]) -> Result<()>
    {
        Err(Self::no_storage(pos, data.len()))
    }
}
