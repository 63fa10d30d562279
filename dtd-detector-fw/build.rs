//! Build script for dtd-detector-fw
//!
//! - Sets up linker search paths for memory.x
//! - Checks the optional DTD_DETECTOR_ID build-time identifier

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    setup_linker();
    validate_detector_id();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Reject an identifier the firmware would silently ignore
fn validate_detector_id() {
    println!("cargo:rerun-if-env-changed=DTD_DETECTOR_ID");

    let Ok(id) = env::var("DTD_DETECTOR_ID") else {
        return;
    };

    let valid = (1..=8).contains(&id.len())
        && id.bytes().all(|b| b.is_ascii_graphic() && b != b':');
    if !valid {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid DTD_DETECTOR_ID                                  ║\n\
            ║                                                                  ║\n\
            ║  Value: {:<56} ║\n\
            ║  Expected 1-8 printable characters, no ':'                       ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            id
        );
    }

    println!("cargo:warning=detector id fixed at build time: {}", id);
}
