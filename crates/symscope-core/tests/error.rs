//! Tests for error handling

use symscope_core::error::{Result, SymscopeError};
use symscope_core::num::{NumType, NumVariantError};

#[test]
fn test_type_expression_display()
{
    let error = SymscopeError::type_expression("Int4B[", "unterminated array extent");
    let message = format!("{}", error);
    assert!(message.contains("Int4B["));
    assert!(message.contains("unterminated"));
}

#[test]
fn test_invalid_operation_display()
{
    let error = SymscopeError::invalid_operation("Int4B", "deref");
    let message = format!("{}", error);
    assert!(message.contains("deref"));
    assert!(message.contains("Int4B"));
}

#[test]
fn test_memory_access_display()
{
    let error = SymscopeError::MemoryAccess {
        address: 0xdead_beef,
        length: 4,
        reason: String::from("unmapped"),
    };
    let message = format!("{}", error);
    assert!(message.contains("0x00000000deadbeef"));
    assert!(message.contains("4 bytes"));
}

#[test]
fn test_index_display()
{
    let message = SymscopeError::Index { index: 7, count: 3 }.to_string();
    assert!(message.contains('7'));
    assert!(message.contains("count 3"));
}

#[test]
fn test_num_variant_error_display()
{
    let error = NumVariantError::UnsupportedOperation {
        op: "%",
        ty: NumType::Double,
    };
    let message = error.to_string();
    assert!(message.contains('%'));
    assert!(message.contains(NumType::Double.name()));
    assert!(NumVariantError::DivisionByZero.to_string().contains("division by zero"));
}

#[test]
fn test_num_variant_error_converts()
{
    let error: SymscopeError = NumVariantError::DivisionByZero.into();
    match error {
        SymscopeError::NumVariant(NumVariantError::DivisionByZero) => {}
        _ => panic!("Expected NumVariant variant"),
    }
}

#[test]
fn test_io_error_converts()
{
    fn open() -> Result<()>
    {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary"))?;
        Ok(())
    }

    let error = open().unwrap_err();
    assert!(matches!(error, SymscopeError::Io(_)));
    assert!(error.to_string().contains("no such binary"));
}

#[test]
fn test_result_type()
{
    let _result: Result<()> = Ok(());
    let _error_result: Result<()> = Err(SymscopeError::SymbolNotFound(String::from("Widget")));
}
