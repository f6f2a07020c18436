//! Tests for type expressions and declarator names

use symscope_core::error::SymscopeError;
use symscope_core::typeinfo::parser::{is_base_type, is_complex_type, parse_suffix, split_complex, TypeLayer};
use symscope_core::typeinfo::{base_type_info, BaseType};
use symscope_core::types::PointerSize;

#[test]
fn test_split_complex()
{
    assert_eq!(split_complex("Int4B**"), Some(("Int4B", "**")));
    assert_eq!(split_complex("ns::Widget*[2]"), Some(("ns::Widget", "*[2]")));
    assert_eq!(split_complex("*Int4B*"), Some(("Int4B", "*")));
    assert_eq!(split_complex("Int4B"), Some(("Int4B", "")));
    assert_eq!(split_complex("Int4B[x]"), None);
}

#[test]
fn test_is_complex_type()
{
    assert!(is_complex_type("Char*"));
    assert!(is_complex_type("Char[3]"));
    assert!(!is_complex_type("Char"));
    assert!(!is_complex_type("mod!Widget"));
}

#[test]
fn test_is_base_type()
{
    assert!(is_base_type("UInt8B").unwrap());
    assert!(is_base_type("UInt8B*[2]").unwrap());
    assert!(!is_base_type("Widget").unwrap());
    assert!(!is_base_type("Widget*").unwrap());
    assert!(!is_base_type("int").unwrap());
    assert!(matches!(is_base_type("*[4]"), Err(SymscopeError::TypeExpression { .. })));
}

#[test]
fn test_pointer_layers()
{
    assert_eq!(parse_suffix("Int4B**", "**").unwrap(), vec![TypeLayer::Pointer, TypeLayer::Pointer]);
}

#[test]
fn test_array_layers_wrap_last_extent_first()
{
    assert_eq!(
        parse_suffix("Int4B[4][2]", "[4][2]").unwrap(),
        vec![TypeLayer::Array(2), TypeLayer::Array(4)]
    );
}

#[test]
fn test_parenthesised_group_wraps_last()
{
    assert_eq!(
        parse_suffix("Int4B(*)[4]", "(*)[4]").unwrap(),
        vec![TypeLayer::Array(4), TypeLayer::Pointer]
    );
    assert_eq!(
        parse_suffix("Int4B*(*[2])[3]", "*(*[2])[3]").unwrap(),
        vec![TypeLayer::Pointer, TypeLayer::Array(3), TypeLayer::Pointer, TypeLayer::Array(2)]
    );
}

#[test]
fn test_malformed_suffix()
{
    assert!(matches!(parse_suffix("Int4B[", "["), Err(SymscopeError::TypeExpression { .. })));
    assert!(matches!(parse_suffix("Int4B]*", "]*"), Err(SymscopeError::TypeExpression { .. })));
}

#[test]
fn test_pointer_to_pointer()
{
    let ty = base_type_info("Int4B**", PointerSize::Eight).unwrap();
    assert!(ty.is_pointer());
    let inner = ty.deref().unwrap();
    assert!(inner.is_pointer());
    assert_eq!(inner.deref().unwrap().name(), "Int4B");
}

#[test]
fn test_array_of_arrays()
{
    let ty = base_type_info("Int4B[4][2]", PointerSize::Eight).unwrap();
    assert_eq!(ty.element_count().unwrap(), 4);
    assert_eq!(ty.size(), 32);
    let row = ty.deref().unwrap();
    assert_eq!(row.element_count().unwrap(), 2);
    assert_eq!(row.name(), "Int4B[2]");
    assert_eq!(row.size(), 8);
}

#[test]
fn test_pointer_to_array()
{
    let ty = base_type_info("Int4B(*)[4]", PointerSize::Four).unwrap();
    assert!(ty.is_pointer());
    assert_eq!(ty.size(), 4);
    let target = ty.deref().unwrap();
    assert!(target.is_array());
    assert_eq!(target.element_count().unwrap(), 4);
    assert_eq!(target.size(), 16);
}

#[test]
fn test_array_of_pointers()
{
    let ty = base_type_info("Int4B*[4]", PointerSize::Four).unwrap();
    assert!(ty.is_array());
    assert_eq!(ty.size(), 16);
    assert!(ty.deref().unwrap().is_pointer());
}

#[test]
fn test_names_round_trip()
{
    for expression in [
        "Int4B",
        "Int4B*",
        "Char**",
        "UInt1B[16]",
        "Int4B[4][2]",
        "Int4B*[4]",
        "Int4B(*)[4]",
        "Int4B(*[3])[4]",
        "Double(**)[2][5]",
        "Void*",
        "WChar*(*)[2]",
    ] {
        let ty = base_type_info(expression, PointerSize::Eight).unwrap();
        assert_eq!(ty.name(), expression, "round trip of {expression}");
    }
}

#[test]
fn test_base_type_sizes()
{
    for base in BaseType::ALL {
        let ty = base_type_info(base.name(), PointerSize::Eight).unwrap();
        assert_eq!(ty.size(), base.size(), "{base}");
    }
    assert_eq!(base_type_info("Void", PointerSize::Eight).unwrap().size(), 0);
    assert!(base_type_info("Void", PointerSize::Eight).unwrap().is_void());
}

#[test]
fn test_pointer_width_follows_argument()
{
    assert_eq!(base_type_info("Char*", PointerSize::Four).unwrap().size(), 4);
    assert_eq!(base_type_info("Char*", PointerSize::Eight).unwrap().size(), 8);
}

#[test]
fn test_unknown_base_type()
{
    assert!(matches!(base_type_info("Int16B", PointerSize::Eight), Err(SymscopeError::UnsupportedType(_))));
}

#[test]
fn test_array_size_overflow_is_rejected()
{
    assert!(matches!(
        base_type_info("Int8B[4611686018427387904]", PointerSize::Eight),
        Err(SymscopeError::TypeExpression { .. })
    ));
    assert!(matches!(
        base_type_info("Int8B[2305843009213693951][4]", PointerSize::Eight),
        Err(SymscopeError::TypeExpression { .. })
    ));

    // large but representable
    let ty = base_type_info("UInt1B[1000000][4096]", PointerSize::Eight).unwrap();
    assert_eq!(ty.size(), 4_096_000_000);
    assert_eq!(ty.element_offset(999_999).unwrap(), 999_999 * 4096);
}
