//! Build script recording the build environment.
//!
//! The tracker has no native dependencies; TLS for the HTTP client is
//! provided by rustls, so no system OpenSSL is required.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Print detected environment
    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
    println!("cargo:rustc-env=BUILD_HOST={}", env::var("HOST").unwrap_or_default());
}
