//! Build script for symscope-core
//!
//! Verifies the toolchain before compilation. The crate relies on
//! `OnceCell` and `wrapping_add_signed`, which need Rust 1.70.0 or newer.

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    let Ok(found) = rustc_version::version() else {
        // Some build environments (sandboxed cross builds) cannot run rustc -vV
        println!("cargo:warning=could not verify Rust version");
        return;
    };

    let minimum = rustc_version::Version::new(1, 70, 0);
    assert!(
        found >= minimum,
        "symscope-core requires Rust {minimum} or newer, found {found}"
    );
}
