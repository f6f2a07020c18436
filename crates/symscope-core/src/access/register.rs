//! Register-backed accessor.

use std::fmt;
use std::sync::Arc;

use super::{check_range, DataAccessor, DataStorage};
use crate::error::Result;

/// Raw access to the registers of the current thread
///
/// Values are exchanged as little-endian byte images of the register.
pub trait RegisterBackend: Send + Sync
{
    /// Width of `name` in bytes; fails with
    /// [`SymscopeError::RegisterAccess`](crate::error::SymscopeError::RegisterAccess)
    /// for an unknown register.
    fn register_size(&self, name: &str) -> Result<usize>;

    /// Full byte image of `name`.
    fn read_register(&self, name: &str) -> Result<Vec<u8>>;

    /// Replace the byte image of `name`.
    fn write_register(&self, name: &str, value: &[u8]) -> Result<()>;
}

/// One named register
pub struct RegisterAccessor
{
    backend: Arc<dyn RegisterBackend>,
    name: String,
    size: usize,
}

impl RegisterAccessor
{
    /// Bind to `name`; fails if the backend does not know the register.
    pub fn new(backend: Arc<dyn RegisterBackend>, name: &str) -> Result<Self>
    {
        let size = backend.register_size(name)?;
        Ok(Self {
            backend,
            name: name.to_string(),
            size,
        })
    }
}

impl fmt::Debug for RegisterAccessor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("RegisterAccessor")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl DataAccessor for RegisterAccessor
{
    fn length(&self) -> usize
    {
        self.size
    }

    fn storage(&self) -> DataStorage
    {
        DataStorage::Register
    }

    fn read_raw(&self, pos: usize, buf: &mut [u8]) -> Result<()>
    {
        check_range(DataStorage::Register, self.size, pos, buf.len())?;
        let image = self.backend.read_register(&self.name)?;
        check_range(DataStorage::Register, image.len(), pos, buf.len())?;
        buf.copy_from_slice(&image[pos..pos + buf.len()]);
        Ok(())
    }

    /// Read-modify-write of the whole register image.
    fn write_raw(&self, pos: usize, data: &[u8]) -> Result<()>
    {
        check_range(DataStorage::Register, self.size, pos, data.len())?;
        let mut image = self.backend.read_register(&self.name)?;
        image.resize(self.size, 0);
        image[pos..pos + data.len()].copy_from_slice(data);
        self.backend.write_register(&self.name, &image)
    }

    fn register_name(&self) -> Result<String>
    {
        Ok(self.name.clone())
    }
}
