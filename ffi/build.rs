//! Generates `include/ajax.h` from the `extern "C"` surface.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("AJAX_FFI_H".to_string()),
        ..Default::default()
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            let include = crate_dir.join("include");
            if let Err(err) = std::fs::create_dir_all(&include) {
                println!("cargo:warning=could not create {}: {err}", include.display());
                return;
            }
            bindings.write_to_file(include.join("ajax.h"));
        }
        Err(err) => println!("cargo:warning=could not generate C header: {err}"),
    }
}
