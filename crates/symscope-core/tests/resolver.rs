//! Tests for name resolution across modules

mod common;

use std::sync::Arc;

use common::*;
use symscope_core::error::SymscopeError;
use symscope_core::resolver::{split_symbol_name, Module, ModuleRegistry, ResolverConfig, TypeResolver};
use symscope_core::symbols::{MachineType, SymbolProvider};
use symscope_core::types::{Address, PointerSize};

fn app_provider() -> Arc<dyn SymbolProvider>
{
    let int = int4();
    let widget = udt("Widget", 16, vec![member("id", &int, 0), member("scale", &double(), 8)]);
    MockProvider::new(
        MachineType::Amd64,
        vec![
            widget.clone(),
            typedef("WIDGET", &widget),
            global("g_widget", &widget, 0x40_1000),
            global("g_count", &int, 0x40_2000),
            function("main", 0x40_0100),
        ],
    )
}

fn legacy_provider() -> Arc<dyn SymbolProvider>
{
    let int = int4();
    let widget = udt("Widget", 8, vec![member("id", &int, 0)]);
    let gadget = udt("Gadget", 12, vec![member("widget", &widget, 0), member("flags", &int, 8)]);
    MockProvider::new(
        MachineType::I386,
        vec![widget, gadget, global("g_gadget", &int, 0x1_0000)],
    )
}

fn resolver() -> TypeResolver
{
    let mut resolver = TypeResolver::default();
    resolver.register_module(Module::new("app", Address::new(0x40_0000), 0x10_0000, app_provider()));
    resolver.register_module(Module::new("legacy", Address::new(0x1000_0000), 0x1_0000, legacy_provider()));
    resolver
}

#[test]
fn test_base_type_expressions_skip_modules()
{
    let resolver = resolver();
    assert_eq!(resolver.load_type("Int4B").unwrap().size(), 4);
    assert_eq!(resolver.load_type("UInt1B*[16]").unwrap().size(), 128);
    assert_eq!(resolver.symbol_size("Double[2]").unwrap(), 16);
}

#[test]
fn test_default_pointer_size_is_configurable()
{
    let resolver = TypeResolver::new(ResolverConfig::default().with_pointer_size(PointerSize::Four));
    assert_eq!(resolver.config().default_pointer_size, PointerSize::Four);
    assert_eq!(resolver.load_type("Char*").unwrap().size(), 4);
    assert_eq!(resolver.symbol_size("Char*[3]").unwrap(), 12);
}

#[test]
fn test_module_qualified_names()
{
    let resolver = resolver();
    assert_eq!(resolver.load_type("app!Widget").unwrap().size(), 16);
    assert_eq!(resolver.load_type("legacy!Widget").unwrap().size(), 8);
    assert_eq!(resolver.load_type("LEGACY!Gadget").unwrap().element_offset_by_name("flags").unwrap(), 8);
}

#[test]
fn test_bare_names_use_first_module_defining_them()
{
    let resolver = resolver();
    // both modules define Widget; app has the lower base
    assert_eq!(resolver.load_type("Widget").unwrap().size(), 16);
    // only legacy defines Gadget
    assert_eq!(resolver.load_type("Gadget").unwrap().size(), 12);
    assert_eq!(resolver.load_type("Gadget*").unwrap().size(), 4);
}

#[test]
fn test_complex_expressions_over_module_types()
{
    let resolver = resolver();

    let array = resolver.load_type("app!Widget*[2]").unwrap();
    assert_eq!(array.name(), "Widget*[2]");
    assert_eq!(array.size(), 16);

    let pointer = resolver.load_type("legacy!Widget(*)[3]").unwrap();
    assert_eq!(pointer.size(), 4);
    assert_eq!(pointer.deref().unwrap().size(), 24);

    // base types under a module use that module's pointer width
    assert_eq!(resolver.load_type("legacy!Int4B*").unwrap().size(), 4);
    assert_eq!(resolver.load_type("app!WIDGET*").unwrap().deref().unwrap().name(), "Widget");
}

#[test]
fn test_data_symbol_is_not_an_expression_base()
{
    let resolver = resolver();
    assert!(matches!(
        resolver.load_type("app!g_widget*"),
        Err(SymscopeError::TypeExpression { .. })
    ));
}

#[test]
fn test_variables_resolve_to_their_type()
{
    let resolver = resolver();
    assert_eq!(resolver.load_type("app!g_widget").unwrap().name(), "Widget");
    assert_eq!(resolver.load_type("app!WIDGET").unwrap().name(), "Widget");
}

#[test]
fn test_symbol_size()
{
    let resolver = resolver();
    assert_eq!(resolver.symbol_size("app!Widget").unwrap(), 16);
    assert_eq!(resolver.symbol_size("g_count").unwrap(), 4);
    assert_eq!(resolver.symbol_size("legacy!Gadget*").unwrap(), 4);
    assert!(matches!(resolver.symbol_size("Nothing"), Err(SymscopeError::SymbolNotFound(_))));
}

#[test]
fn test_symbol_offset()
{
    let resolver = resolver();
    assert_eq!(resolver.symbol_offset("app!g_widget").unwrap(), Address::new(0x40_1000));
    assert_eq!(resolver.symbol_offset("g_gadget").unwrap(), Address::new(0x1_0000));
    assert_eq!(resolver.symbol_offset("main").unwrap(), Address::new(0x40_0100));
    assert!(matches!(resolver.symbol_offset("app!Widget"), Err(SymscopeError::InvalidOperation { .. })));
    assert!(matches!(resolver.symbol_offset("missing!main"), Err(SymscopeError::ModuleNotFound(_))));
}

#[test]
fn test_load_type_in_scope()
{
    let resolver = resolver();
    let scope = resolver.modules().by_name("legacy").unwrap().global_scope().unwrap();

    assert_eq!(resolver.load_type_in_scope(&scope, "Widget").unwrap().size(), 8);
    assert_eq!(resolver.load_type_in_scope(&scope, "Widget*").unwrap().size(), 4);
    assert_eq!(resolver.load_type_in_scope(&scope, "UInt8B*").unwrap().size(), 4);

    let symbol = scope.child_by_name("Gadget").unwrap();
    assert_eq!(resolver.load_type_from_symbol(&symbol).unwrap().name(), "Gadget");
}

#[test]
fn test_malformed_expressions()
{
    let resolver = resolver();
    assert!(matches!(resolver.load_type("*[2]"), Err(SymscopeError::TypeExpression { .. })));
    assert!(matches!(resolver.load_type("app!Widget[x"), Err(SymscopeError::TypeExpression { .. })));
    assert!(matches!(resolver.load_type("app!Widget]["), Err(SymscopeError::TypeExpression { .. })));
}

#[test]
fn test_registry_lookup_by_address()
{
    let resolver = resolver();
    let modules = resolver.modules();

    assert_eq!(modules.len(), 2);
    assert_eq!(modules.by_offset(Address::new(0x40_0000)).unwrap().name(), "app");
    assert_eq!(modules.by_offset(Address::new(0x4f_ffff)).unwrap().name(), "app");
    assert_eq!(modules.by_offset(Address::new(0x1000_0010)).unwrap().name(), "legacy");
    assert!(matches!(modules.by_offset(Address::new(0x50_0000)), Err(SymscopeError::ModuleNotFound(_))));
    assert!(matches!(modules.by_offset(Address::new(0x10)), Err(SymscopeError::ModuleNotFound(_))));
}

#[test]
fn test_registry_replace_and_remove()
{
    let mut registry = ModuleRegistry::new();
    assert!(registry.is_empty());

    registry.insert(Module::new("a", Address::new(0x1000), 0x100, app_provider()));
    let replaced = registry.insert(Module::new("b", Address::new(0x1000), 0x100, legacy_provider()));
    assert_eq!(replaced.map(|module| module.name().to_string()), Some(String::from("a")));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.by_name("B").unwrap().end(), Address::new(0x1100));

    assert!(registry.remove(Address::new(0x1000)).is_some());
    assert!(registry.is_empty());
    assert!(matches!(registry.by_name("b"), Err(SymscopeError::ModuleNotFound(_))));
}

#[test]
fn test_resolvers_are_independent()
{
    let populated = resolver();
    let empty = TypeResolver::default();
    assert!(populated.load_type("Widget").is_ok());
    assert!(matches!(empty.load_type("Widget"), Err(SymscopeError::SymbolNotFound(_))));
}

#[test]
fn test_split_symbol_name()
{
    assert_eq!(split_symbol_name("app!Widget*"), (Some("app"), "Widget*"));
    assert_eq!(split_symbol_name("Widget"), (None, "Widget"));
}

#[test]
fn test_find_module_by_symbol()
{
    let mut resolver = resolver();
    assert_eq!(resolver.modules().find_by_symbol("Gadget").unwrap().name(), "legacy");
    assert_eq!(resolver.modules().find_by_symbol("Widget").unwrap().name(), "app");
    assert!(matches!(resolver.modules().find_by_symbol("Nothing"), Err(SymscopeError::SymbolNotFound(_))));

    resolver.modules_mut().clear();
    assert!(resolver.modules().is_empty());
    assert!(resolver.load_type("Gadget").is_err());
}
