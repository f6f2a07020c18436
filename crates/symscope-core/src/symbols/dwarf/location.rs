//! Classification of `DW_AT_data_member_location` and `DW_AT_location`.

use gimli::{Expression, Operation};

use super::{map_dwarf_error, OwnedReader};
use crate::error::{Result, SymscopeError};

/// Subset of DWARF expression operations that locate members and globals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocationOp
{
    /// `DW_OP_addr` (or `DW_OP_addrx`, already resolved)
    Address(u64),
    /// `DW_OP_constu`, `DW_OP_litN`
    Constant(u64),
    /// `DW_OP_plus_uconst`
    PlusConstant(u64),
    /// `DW_OP_dup`
    Dup,
    Deref,
    Plus,
    Minus,
    Other,
}

/// Where a member or base class sits inside its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberLocation
{
    /// Fixed byte offset.
    Offset(u64),
    /// Base reached through the virtual table at offset 0 of the object:
    /// the displacement is stored `vtable_offset` bytes before the address
    /// point of the table.
    VirtualBase
    {
        vtable_offset: u64
    },
}

/// Decode the operations of an expression
///
/// `DW_OP_addrx` is resolved through `resolve_index`.
pub(crate) fn decode_ops(
    expression: Expression<OwnedReader>,
    encoding: gimli::Encoding,
    mut resolve_index: impl FnMut(gimli::DebugAddrIndex<usize>) -> Result<u64>,
) -> Result<Vec<LocationOp>>
{
    let mut ops = Vec::new();
    let mut iter = expression.operations(encoding);
    while let Some(op) = iter.next().map_err(|err| map_dwarf_error("decoding location expression", err))? {
        ops.push(match op {
            Operation::Address { address } => LocationOp::Address(address),
            Operation::AddressIndex { index } => LocationOp::Address(resolve_index(index)?),
            Operation::UnsignedConstant { value } => LocationOp::Constant(value),
            Operation::SignedConstant { value } => LocationOp::Constant(value as u64),
            Operation::PlusConstant { value } => LocationOp::PlusConstant(value),
            Operation::Pick { index: 0 } => LocationOp::Dup,
            Operation::Deref { .. } => LocationOp::Deref,
            Operation::Plus => LocationOp::Plus,
            Operation::Minus => LocationOp::Minus,
            _ => LocationOp::Other,
        });
    }
    Ok(ops)
}

/// Interpret a member location expression evaluated with the object address
/// on the stack.
pub(crate) fn member_location(ops: &[LocationOp]) -> Result<MemberLocation>
{
    use LocationOp::{Constant, Deref, Dup, Minus, Plus, PlusConstant};

    match ops {
        [] => Ok(MemberLocation::Offset(0)),
        [PlusConstant(offset)] | [Constant(offset), Plus] => Ok(MemberLocation::Offset(*offset)),
        [Dup, Deref, Constant(vtable_offset), Minus, Deref, Plus] => Ok(MemberLocation::VirtualBase {
            vtable_offset: *vtable_offset,
        }),
        _ => Err(SymscopeError::Dwarf(format!("unsupported member location {ops:?}"))),
    }
}

/// Static address named by a `DW_AT_location` expression.
pub(crate) fn static_address(ops: &[LocationOp]) -> Option<u64>
{
    match ops {
        [LocationOp::Address(address)] => Some(*address),
        [LocationOp::Address(address), LocationOp::PlusConstant(offset)] => Some(address.wrapping_add(*offset)),
        _ => None,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use LocationOp::*;

    #[test]
    fn test_plain_offsets()
    {
        assert_eq!(member_location(&[]).unwrap(), MemberLocation::Offset(0));
        assert_eq!(member_location(&[PlusConstant(16)]).unwrap(), MemberLocation::Offset(16));
        assert_eq!(member_location(&[Constant(8), Plus]).unwrap(), MemberLocation::Offset(8));
    }

    #[test]
    fn test_itanium_virtual_base()
    {
        let ops = [Dup, Deref, Constant(24), Minus, Deref, Plus];
        assert_eq!(
            member_location(&ops).unwrap(),
            MemberLocation::VirtualBase { vtable_offset: 24 }
        );
    }

    #[test]
    fn test_unknown_expression_fails()
    {
        assert!(member_location(&[Deref]).is_err());
        assert!(member_location(&[Other]).is_err());
    }

    #[test]
    fn test_static_address()
    {
        assert_eq!(static_address(&[Address(0x4000)]), Some(0x4000));
        assert_eq!(static_address(&[Address(0x4000), PlusConstant(8)]), Some(0x4008));
        assert_eq!(static_address(&[Constant(1)]), None);
    }
}
