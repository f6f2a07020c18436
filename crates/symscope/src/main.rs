mod calc;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use symscope_core::resolver::{Module, ResolverConfig, TypeResolver};
use symscope_core::symbols::dwarf::DwarfProvider;
use symscope_core::typeinfo::{FieldLocation, TypeInfo, TypeInfoRef};
use symscope_core::types::PointerSize;
use symscope_utils::{info, init_logging_with, LogConfig, LogFormat, LogLevel};

use crate::calc::{parse_literal, BinaryOp};

/// Inspect types from debug information and evaluate C-typed numbers.
#[derive(Parser, Debug)]
#[command(name = "symscope")]
#[command(version)]
#[command(about = "Inspect types from debug information and evaluate C-typed numbers", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides SYMSCOPE_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Pointer width in bytes for expressions not bound to a binary (4 or 8)
    #[arg(long, global = true, value_parser = parse_pointer_size)]
    pointer_size: Option<PointerSize>,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Print the name, size and field layout of a type
    Describe
    {
        /// Binary carrying DWARF debug information
        binary: PathBuf,
        /// Type expression, e.g. `Widget`, `Widget*[4]` or `app!Widget`
        expression: String,
        /// Address the binary is loaded at (hex 0x1000 or decimal)
        #[arg(long, value_parser = parse_address)]
        load_address: Option<u64>,
    },
    /// Print the byte size of a type or variable
    Sizeof
    {
        /// Binary carrying DWARF debug information
        binary: PathBuf,
        /// Type expression or variable name
        expression: String,
    },
    /// Resolve a base-type expression such as `UInt1B*[16]` without a binary
    Parse
    {
        /// Base-type expression
        expression: String,
    },
    /// Evaluate `<lhs> <op> <rhs>` with C promotion rules, e.g. `200:uchar + 100:uchar`
    Calc
    {
        /// Left operand, `value[:type]`
        #[arg(allow_hyphen_values = true)]
        lhs: String,
        /// Operator: + - * / % & | ^ << >> && || == != < <= > >=
        #[arg(allow_hyphen_values = true)]
        op: String,
        /// Right operand, `value[:type]`
        #[arg(allow_hyphen_values = true)]
        rhs: String,
    },
}

fn parse_pointer_size(value: &str) -> Result<PointerSize, String>
{
    value
        .parse::<usize>()
        .ok()
        .and_then(PointerSize::from_bytes)
        .ok_or_else(|| format!("pointer size must be 4 or 8, got '{value}'"))
}

fn parse_address(value: &str) -> Result<u64, String>
{
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| format!("invalid address '{value}'"))
}

fn main()
{
    let cli = Cli::parse();

    // Flags win over SYMSCOPE_LOG_FORMAT / RUST_LOG.
    let mut log_config = LogConfig::from_env();
    if let Some(level) = cli.log_level {
        log_config = log_config.with_level(level);
    }
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    let _guard = match init_logging_with(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn resolver_config(cli: &Cli) -> ResolverConfig
{
    let config = ResolverConfig::from_env();
    match cli.pointer_size {
        Some(size) => config.with_pointer_size(size),
        None => config,
    }
}

/// Resolver with `binary` registered as its only module.
fn open_binary(config: ResolverConfig, binary: &Path, load_address: Option<u64>) -> Result<TypeResolver, Box<dyn Error>>
{
    let provider = match load_address {
        Some(address) => DwarfProvider::open_at(binary, address)?,
        None => DwarfProvider::open(binary)?,
    };
    info!(binary = %binary.display(), base = %provider.base(), "loaded debug information");

    let module = Module::new(provider.module_name(), provider.base(), provider.image_size(), Arc::new(provider));
    let mut resolver = TypeResolver::new(config);
    resolver.register_module(module);
    Ok(resolver)
}

fn run_command(cli: Cli) -> Result<(), Box<dyn Error>>
{
    let config = resolver_config(&cli);
    match cli.command {
        Commands::Describe {
            binary,
            expression,
            load_address,
        } => {
            let resolver = open_binary(config, &binary, load_address)?;
            print_type(&resolver.load_type(&expression)?)?;
            Ok(())
        }
        Commands::Sizeof { binary, expression } => {
            let resolver = open_binary(config, &binary, None)?;
            println!("{}", resolver.symbol_size(&expression)?);
            Ok(())
        }
        Commands::Parse { expression } => {
            let resolver = TypeResolver::new(config);
            print_type(&resolver.load_type(&expression)?)?;
            Ok(())
        }
        Commands::Calc { lhs, op, rhs } => {
            let lhs = parse_literal(&lhs)?;
            let op: BinaryOp = op.parse()?;
            let rhs = parse_literal(&rhs)?;
            let result = op.apply(lhs, rhs)?;
            println!("{result} ({}, {})", result.num_type(), result.to_hex());
            Ok(())
        }
    }
}

fn kind_of(ty: &TypeInfo) -> &'static str
{
    if ty.is_user_defined() {
        "udt"
    } else if ty.is_enum() {
        "enum"
    } else if ty.is_pointer() {
        "pointer"
    } else if ty.is_array() {
        "array"
    } else if ty.is_bit_field() {
        "bitfield"
    } else if ty.is_void() {
        "void"
    } else {
        "base"
    }
}

fn print_type(ty: &TypeInfoRef) -> Result<(), Box<dyn Error>>
{
    println!("{} ({}, {} bytes)", ty.name(), kind_of(ty), ty.size());

    if ty.is_pointer() || ty.is_array() {
        let target = ty.deref()?;
        let count = if ty.is_array() { format!("[{}] ", ty.element_count()?) } else { String::new() };
        println!("  {count}-> {} ({} bytes)", target.name(), target.size());
        return Ok(());
    }
    if !ty.is_user_defined() && !ty.is_enum() {
        return Ok(());
    }

    for field in ty.fields()?.iter() {
        let field_type = field.type_info()?;
        let mut type_name = field_type.name();
        if field_type.is_bit_field() {
            type_name = format!("{type_name} :{}@{}", field_type.bit_width()?, field_type.bit_offset()?);
        }
        match field.location() {
            FieldLocation::Member {
                offset,
                virtual_base: None,
            } => println!("  +{offset:#06x}  {:<24} {}", type_name, field.name()),
            FieldLocation::Member {
                offset,
                virtual_base: Some(_),
            } => println!("  v+{offset:#05x}  {:<24} {}", type_name, field.name()),
            FieldLocation::Static { va } => println!("  static  {:<24} {} @ {va}", type_name, field.name()),
            FieldLocation::Constant { value } => println!("  {:<8} {}", value.to_string(), field.name()),
        }
    }
    Ok(())
}
