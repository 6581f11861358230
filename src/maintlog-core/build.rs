//! Build script for maintlog-core.
//!
//! Records the target triple for `maintlog info`.

fn main() {
    println!(
        "cargo:rustc-env=TARGET={}",
        std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );
    println!("cargo:rerun-if-env-changed=TARGET");
}
