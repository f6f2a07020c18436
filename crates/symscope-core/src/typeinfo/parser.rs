//! Type-name expression grammar
//!
//! A type expression is `<stars><name><suffix>` where the suffix interleaves
//! `*`, `[N]` and one parenthesised group per level, e.g. `Int4B(*)[4]` or
//! `MyStruct**[2]`. Leading stars before the name carry no meaning and are
//! dropped.
//!
//! Suffixes are decoded into [`TypeLayer`]s in the order they wrap the base
//! type: declarators nearest the name first, then the contents of the
//! parenthesised group.

use once_cell::sync::Lazy;
use regex::Regex;

use super::base::BaseType;
use crate::error::{Result, SymscopeError};

static COMPLEX_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\**)([^()*\[\]]*)([()*\[\]\d]*)$").expect("complex type pattern"));
static BRACKET_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^(]*)\((.*)\)([^)]*)$").expect("bracket pattern"));
static LEADING_POINTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*(.*)$").expect("pointer pattern"));
static TRAILING_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)\[(\d+)\]$").expect("array pattern"));

/// One declarator applied on top of an inner type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLayer
{
    /// `*`
    Pointer,
    /// `[N]`
    Array(usize),
}

/// `true` when the expression has pointer or array declarators.
pub fn is_complex_type(name: &str) -> bool
{
    name.contains(['*', '['])
}

/// Split an expression into its base name and declarator suffix
///
/// Returns `None` when the text does not have the `<name><suffix>` shape.
///
/// ```rust
/// use symscope_core::typeinfo::parser::split_complex;
///
/// assert_eq!(split_complex("Int4B(*)[4]"), Some(("Int4B", "(*)[4]")));
/// assert_eq!(split_complex("a*b"), None);
/// ```
pub fn split_complex(name: &str) -> Option<(&str, &str)>
{
    let captures = COMPLEX_TYPE.captures(name)?;
    let base = captures.get(2).map_or("", |m| m.as_str());
    let suffix = captures.get(3).map_or("", |m| m.as_str());
    Some((base, suffix))
}

/// Whether the expression names a built-in base type, alone or under declarators
///
/// Fails for a complex expression whose base name is empty (`"*[4]"`).
pub fn is_base_type(name: &str) -> Result<bool>
{
    let base = if is_complex_type(name) {
        match split_complex(name) {
            Some((base, _)) if !base.is_empty() => base,
            _ => return Err(SymscopeError::type_expression(name, "invalid type name")),
        }
    } else {
        name
    };
    Ok(BaseType::from_name(base).is_some())
}

/// Decode a declarator suffix into layers, innermost first
///
/// `expression` is only used for error reporting.
pub fn parse_suffix(expression: &str, suffix: &str) -> Result<Vec<TypeLayer>>
{
    let mut layers = Vec::new();
    let mut suffix = suffix.to_string();

    loop {
        let group = take_bracket_group(&mut suffix);

        while !suffix.is_empty() {
            if let Some(rest) = strip_pointer(&suffix) {
                layers.push(TypeLayer::Pointer);
                suffix = rest;
                continue;
            }
            if let Some((rest, count)) = strip_array(expression, &suffix)? {
                layers.push(TypeLayer::Array(count));
                suffix = rest;
                continue;
            }
            return Err(SymscopeError::type_expression(expression, "symbol name can not be an expression"));
        }

        match group {
            Some(inner) if !inner.is_empty() => suffix = inner,
            _ => return Ok(layers),
        }
    }
}

/// Pull out `(...)`, leaving the surrounding text concatenated in `suffix`.
fn take_bracket_group(suffix: &mut String) -> Option<String>
{
    let captures = BRACKET_GROUP.captures(suffix)?;
    let outside = format!(
        "{}{}",
        captures.get(1).map_or("", |m| m.as_str()),
        captures.get(3).map_or("", |m| m.as_str())
    );
    let inner = captures.get(2).map_or("", |m| m.as_str()).to_string();
    *suffix = outside;
    Some(inner)
}

fn strip_pointer(suffix: &str) -> Option<String>
{
    LEADING_POINTER
        .captures(suffix)
        .and_then(|captures| captures.get(1))
        .map(|rest| rest.as_str().to_string())
}

fn strip_array(expression: &str, suffix: &str) -> Result<Option<(String, usize)>>
{
    let Some(captures) = TRAILING_ARRAY.captures(suffix) else {
        return Ok(None);
    };
    let rest = captures.get(1).map_or("", |m| m.as_str()).to_string();
    let count = captures
        .get(2)
        .map_or("", |m| m.as_str())
        .parse::<usize>()
        .map_err(|err| SymscopeError::type_expression(expression, format!("bad array extent: {err}")))?;
    Ok(Some((rest, count)))
}
