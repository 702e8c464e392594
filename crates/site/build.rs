//! Build script for the site crate.
//!
//! Fingerprints `static/css/main.css` so templates can link an immutable,
//! cache-busted copy.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_css();
}

/// Copy main.css to `static/css/derived/main.<hash>.css` and expose the hash
/// as `CSS_HASH` for `env!`.
fn fingerprint_css() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let source = Path::new(&manifest_dir).join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", source.display());

    let Ok(css) = fs::read(&source) else {
        println!("cargo:warning=static/css/main.css not found, serving unhashed CSS");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&css));
    let short = digest.get(..8).unwrap_or(&digest);
    println!("cargo:rustc-env=CSS_HASH={short}");

    let derived = Path::new(&manifest_dir).join("static/css/derived");
    fs::create_dir_all(&derived).expect("failed to create static/css/derived");
    fs::write(derived.join(format!("main.{short}.css")), &css)
        .expect("failed to write fingerprinted CSS");
}
